#![forbid(unsafe_code)]

//! Layout state store: the single source of truth for a mounted grid.
//!
//! Every piece of live state is an [`Observable`] so the render layer can
//! subscribe and paint without a framework re-render.
//!
//! # Ownership
//!
//! Only two parties write: the pointer router (draft layout, interaction
//! event, active panel) and the engine's host-facing methods (layout sync,
//! container size, access mode, expanded panel, row collapse). Everyone
//! else reads or subscribes.
//!
//! The layout observable carries drafts while an interaction runs. The
//! *stable* layout is a separate snapshot, updated by
//! [`LayoutStore::commit_stable_layout`] once nothing is in flight; only
//! stable changes reach the host's `on_layout_change` callback.

use std::cell::RefCell;
use std::fmt;

use panelgrid_core::geometry::{PixelRect, PointerOffsets};
use panelgrid_layout::{
    AccessMode, GridLayoutData, GridRowData, GridSettings, InteractionKind, LayoutError, PanelId,
    RuntimeGridSettings, find_panel, is_layout_equal, resolve_grid_row,
};
use tracing::{debug, info_span, warn};

use crate::observable::Observable;

/// Callback receiving every settled layout change.
pub type LayoutChangeCallback = Box<dyn FnMut(&GridLayoutData)>;

/// An in-progress drag or resize.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelInteractionEvent {
    pub kind: InteractionKind,
    pub id: PanelId,
    /// Row the panel currently lives in. Retargeted while dragging.
    pub target_row_index: usize,
    /// Panel bounding box when the interaction started.
    pub panel_rect: PixelRect,
    /// Pointer position relative to `panel_rect`'s edges at start.
    pub pointer_offsets: PointerOffsets,
}

/// Live pixel position of the panel under the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivePanel {
    pub id: PanelId,
    pub position: PixelRect,
}

/// Observable state of one grid.
pub struct LayoutStore {
    pub layout: Observable<GridLayoutData>,
    pub interaction_event: Observable<Option<PanelInteractionEvent>>,
    pub active_panel: Observable<Option<ActivePanel>>,
    pub runtime_settings: Observable<RuntimeGridSettings>,
    pub access_mode: Observable<AccessMode>,
    pub expanded_panel_id: Observable<Option<PanelId>>,
    pub is_mobile_view: Observable<bool>,
    settings: GridSettings,
    mobile_breakpoint: f64,
    stable_layout: RefCell<GridLayoutData>,
    on_layout_change: RefCell<Option<LayoutChangeCallback>>,
}

impl fmt::Debug for LayoutStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutStore")
            .field("layout_version", &self.layout.version())
            .field("interaction_event", &self.interaction_event.get())
            .field("access_mode", &self.access_mode.get())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl LayoutStore {
    /// Create a store for `layout`. The layout is normalized first, and the
    /// normalized form becomes the initial stable snapshot.
    #[must_use]
    pub fn new(
        layout: &[GridRowData],
        settings: GridSettings,
        mobile_breakpoint: f64,
        access_mode: AccessMode,
    ) -> Self {
        let normalized = normalize_layout(layout, &settings);
        Self {
            layout: Observable::named("layout", normalized.clone()),
            interaction_event: Observable::named("interaction_event", None),
            active_panel: Observable::named("active_panel", None),
            runtime_settings: Observable::named(
                "runtime_settings",
                RuntimeGridSettings::for_container(&settings, 0.0),
            ),
            access_mode: Observable::named("access_mode", access_mode),
            expanded_panel_id: Observable::named("expanded_panel_id", None),
            is_mobile_view: Observable::named("is_mobile_view", false),
            settings,
            mobile_breakpoint,
            stable_layout: RefCell::new(normalized),
            on_layout_change: RefCell::new(None),
        }
    }

    /// Install the host callback for settled layout changes.
    pub fn set_on_layout_change(&self, callback: impl FnMut(&GridLayoutData) + 'static) {
        *self.on_layout_change.borrow_mut() = Some(Box::new(callback));
    }

    #[must_use]
    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    /// Last committed layout.
    #[must_use]
    pub fn stable_layout(&self) -> GridLayoutData {
        self.stable_layout.borrow().clone()
    }

    #[must_use]
    pub fn is_interacting(&self) -> bool {
        self.interaction_event.with(Option::is_some)
    }

    /// Layout-sync effect: adopt a layout supplied by the host.
    ///
    /// The input is normalized (panels clamped into the grid, every row
    /// resolved) and becomes both the current and the stable layout. The
    /// host is not called back for its own input. Returns `true` if the
    /// current layout changed.
    pub fn sync_layout(&self, layout: &[GridRowData]) -> bool {
        let normalized = normalize_layout(layout, &self.settings);
        if self.layout.with(|current| is_layout_equal(current, &normalized)) {
            return false;
        }
        debug!(rows = normalized.len(), "layout synced from host");
        *self.stable_layout.borrow_mut() = normalized.clone();
        self.layout.set(normalized)
    }

    /// Snapshot the current layout as stable if it differs from the last
    /// stable one, and tell the host. No-op while an interaction is active.
    pub fn commit_stable_layout(&self) -> bool {
        if self.is_interacting() {
            return false;
        }
        let current = self.layout.get();
        if is_layout_equal(&self.stable_layout.borrow(), &current) {
            return false;
        }
        let _span = info_span!("panelgrid.commit", rows = current.len()).entered();
        *self.stable_layout.borrow_mut() = current.clone();
        if let Some(callback) = self.on_layout_change.borrow_mut().as_mut() {
            callback(&current);
        }
        true
    }

    /// Recompute runtime settings and the mobile flag for a new container
    /// width.
    pub fn set_container_width(&self, width: f64) {
        self.runtime_settings
            .set(RuntimeGridSettings::for_container(&self.settings, width));
        self.is_mobile_view.set(width < self.mobile_breakpoint);
    }

    pub fn set_access_mode(&self, mode: AccessMode) {
        self.access_mode.set(mode);
    }

    /// Expand one panel to fill the grid, or restore with `None`.
    pub fn set_expanded_panel(&self, id: Option<&str>) -> Result<(), LayoutError> {
        if let Some(id) = id {
            if self.layout.with(|layout| find_panel(layout, id).is_none()) {
                return Err(LayoutError::UnknownPanel { id: id.to_string() });
            }
        }
        self.expanded_panel_id.set(id.map(str::to_string));
        Ok(())
    }

    /// Collapse or expand a row and commit the result.
    pub fn toggle_row_collapsed(&self, row_index: usize) -> Result<bool, LayoutError> {
        let row_count = self.layout.with(Vec::len);
        if row_index >= row_count {
            return Err(LayoutError::UnknownRow { row_index });
        }
        let mut collapsed = false;
        self.layout.update(|layout| {
            let row = &mut layout[row_index];
            row.is_collapsed = !row.is_collapsed;
            collapsed = row.is_collapsed;
        });
        self.commit_stable_layout();
        Ok(collapsed)
    }
}

/// Clamp every panel into the grid and resolve every row.
fn normalize_layout(layout: &[GridRowData], settings: &GridSettings) -> GridLayoutData {
    layout
        .iter()
        .enumerate()
        .map(|(row_index, row)| {
            let mut clamped = row.clone();
            for panel in clamped.panels.values_mut() {
                if let Err(err) = panel.validate(settings.column_count) {
                    warn!(row_index, error = %err, "normalizing panel outside the grid");
                    *panel = panel.clamp_to_columns(settings.column_count);
                }
            }
            resolve_grid_row(&clamped, None)
        })
        .collect()
}
