#![forbid(unsafe_code)]

//! The mounted grid: store, router, autoscroll, render layer and drag
//! handles wired together behind one host-facing type.
//!
//! The host forwards its pointer events, timer ticks, container resizes
//! and layout prop changes; the engine paints through the host's
//! [`ImperativeRenderer`] and reports settled layouts through the
//! `on_layout_change` callback.
//!
//! Coordinates: the grid origin is kept in document space and converted to
//! client space with the viewport's current scroll offset, so autoscroll
//! keeps row rectangles aligned with pointer positions.

use std::fmt;
use std::hash::Hash;

use panelgrid_core::event::{PointerError, PointerEvent};
use panelgrid_core::geometry::Point;
use panelgrid_layout::{
    AccessMode, GridLayoutData, GridMetrics, GridRowData, LayoutError,
};
use tracing::{debug, warn};
use web_time::Instant;

use crate::autoscroll::{AutoscrollController, ScrollViewport};
use crate::config::{GridConfigError, GridEngineConfig};
use crate::handles::{DragHandleRegistry, DragHandleSetter, HandleTarget, PanelContents};
use crate::render::{ImperativeRenderer, RenderLayer};
use crate::router::{
    IgnoreReason, InteractionTransition, MoveContext, PointerListenerHost, PointerRouter,
};
use crate::store::LayoutStore;

/// A mounted, interactive grid.
///
/// `R` paints panel nodes, `L` installs document pointer listeners and `K`
/// identifies host elements used as drag handles.
pub struct GridLayout<R: ImperativeRenderer, L: PointerListenerHost, K = String> {
    store: LayoutStore,
    router: PointerRouter,
    render: RenderLayer<R>,
    listeners: L,
    drag_handles: DragHandleRegistry<K>,
    config: GridEngineConfig,
    origin: Point,
    last_move: Option<PointerEvent>,
    mounted: bool,
}

impl<R: ImperativeRenderer, L: PointerListenerHost, K> fmt::Debug for GridLayout<R, L, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridLayout")
            .field("store", &self.store)
            .field("phase", self.router.phase())
            .field("origin", &self.origin)
            .field("mounted", &self.mounted)
            .finish_non_exhaustive()
    }
}

impl<R, L, K> GridLayout<R, L, K>
where
    R: ImperativeRenderer + 'static,
    L: PointerListenerHost,
    K: Clone + Eq + Hash,
{
    /// Mount a grid for `layout`.
    ///
    /// # Errors
    ///
    /// Returns [`GridConfigError::Validation`] listing every invalid
    /// setting; nothing is mounted in that case.
    pub fn new(
        layout: &[GridRowData],
        config: GridEngineConfig,
        renderer: R,
        listeners: L,
    ) -> Result<Self, GridConfigError> {
        let config = config.validated()?;
        let store = LayoutStore::new(
            layout,
            config.grid,
            config.mobile_breakpoint,
            config.access_mode,
        );
        let render = RenderLayer::mount(&store, renderer, config.row_header_height);
        debug!(rows = layout.len(), columns = config.grid.column_count, "grid mounted");
        Ok(Self {
            store,
            router: PointerRouter::new(AutoscrollController::new(config.autoscroll)),
            render,
            listeners,
            drag_handles: DragHandleRegistry::new(),
            config,
            origin: Point::default(),
            last_move: None,
            mounted: true,
        })
    }
}

impl<R, L, K> GridLayout<R, L, K>
where
    R: ImperativeRenderer,
    L: PointerListenerHost,
    K: Clone + Eq + Hash,
{
    #[must_use]
    pub fn store(&self) -> &LayoutStore {
        &self.store
    }

    #[must_use]
    pub fn router(&self) -> &PointerRouter {
        &self.router
    }

    #[must_use]
    pub fn render_layer(&self) -> &RenderLayer<R> {
        &self.render
    }

    #[must_use]
    pub fn listeners(&self) -> &L {
        &self.listeners
    }

    #[must_use]
    pub fn config(&self) -> &GridEngineConfig {
        &self.config
    }

    #[must_use]
    pub fn layout(&self) -> GridLayoutData {
        self.store.layout.get()
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Install the callback that receives settled layout changes.
    pub fn set_on_layout_change(&self, callback: impl FnMut(&GridLayoutData) + 'static) {
        self.store.set_on_layout_change(callback);
    }

    /// Adopt a new layout prop from the host.
    pub fn set_layout(&self, layout: &[GridRowData]) -> bool {
        self.store.sync_layout(layout)
    }

    pub fn set_access_mode(&self, mode: AccessMode) {
        self.store.set_access_mode(mode);
    }

    /// Expand a panel to fill the grid, or restore all panels with `None`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownPanel`] if no panel has that id.
    pub fn set_expanded_panel(&self, id: Option<&str>) -> Result<(), LayoutError> {
        self.store.set_expanded_panel(id)
    }

    /// Collapse or expand a row. Returns the new collapsed state.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownRow`] for an out-of-range index.
    pub fn toggle_row_collapsed(&self, row_index: usize) -> Result<bool, LayoutError> {
        self.store.toggle_row_collapsed(row_index)
    }

    /// The container was resized or moved. `origin` is the grid's top-left
    /// corner in document coordinates.
    pub fn resize_container(&mut self, width: f64, origin: Point) {
        self.origin = origin;
        self.store.set_container_width(width);
    }

    /// Row geometry in client space for the current scroll offset.
    #[must_use]
    pub fn metrics(&self, viewport: &impl ScrollViewport) -> GridMetrics {
        let client_origin = Point::new(self.origin.x, self.origin.y - viewport.scroll_top());
        let runtime = self.store.runtime_settings.get();
        self.store.layout.with(|layout| {
            GridMetrics::compute(layout, runtime, client_origin, self.config.row_header_height)
        })
    }

    /// Let the host render a panel's contents and register its drag
    /// handles.
    pub fn render_panel_contents<C: PanelContents<K>>(
        &mut self,
        contents: &mut C,
        panel_id: &str,
    ) -> C::Output {
        let mut setter = DragHandleSetter::new(&mut self.drag_handles, panel_id);
        contents.render_panel_contents(panel_id, &mut setter)
    }

    #[must_use]
    pub fn drag_handles(&self) -> &DragHandleRegistry<K> {
        &self.drag_handles
    }

    /// Mount the node of a panel in `row_index`.
    pub fn register_panel_node(&self, row_index: usize, panel_id: &str, node: R::Handle) {
        self.render.register(row_index, panel_id, node);
    }

    /// Unmount a panel node and forget its drag handles.
    pub fn unregister_panel_node(&mut self, row_index: usize, panel_id: &str) -> Option<R::Handle> {
        self.drag_handles.remove_panel(panel_id);
        self.render.unregister(row_index, panel_id)
    }

    /// Pointer-down on a drag or resize handle.
    ///
    /// # Errors
    ///
    /// Returns the extraction error for events without a usable position.
    pub fn pointer_down(
        &mut self,
        target: &HandleTarget<K>,
        event: &PointerEvent,
        viewport: &impl ScrollViewport,
    ) -> Result<InteractionTransition, PointerError> {
        let Some((id, kind)) = self.drag_handles.resolve(target) else {
            return Ok(self.router.ignored(IgnoreReason::UnknownHandle));
        };
        let metrics = self.metrics(viewport);
        self.last_move = None;
        self.router
            .on_pointer_down(&self.store, &metrics, &id, kind, event, &mut self.listeners)
    }

    /// Document pointer-move while an interaction runs.
    ///
    /// A mouse move that no longer holds the primary button means the
    /// release happened outside the document; the panel is dropped as if
    /// the pointer-up had arrived.
    ///
    /// # Errors
    ///
    /// Returns the extraction error for events without a usable position.
    pub fn pointer_move(
        &mut self,
        event: &PointerEvent,
        viewport: &impl ScrollViewport,
        now: Instant,
    ) -> Result<InteractionTransition, PointerError> {
        if self.router.phase().is_interacting()
            && event.client_position().is_ok()
            && !event.is_primary()
        {
            debug!("primary button released outside the document");
            return Ok(self.pointer_up());
        }
        let metrics = self.metrics(viewport);
        let ctx = MoveContext {
            metrics: &metrics,
            viewport,
            now,
        };
        let transition = self.router.on_pointer_move(&self.store, &ctx, event)?;
        if self.router.phase().is_interacting() {
            self.last_move = Some(event.clone());
        }
        Ok(transition)
    }

    /// Document pointer-up or touch end: drop the panel.
    pub fn pointer_up(&mut self) -> InteractionTransition {
        self.last_move = None;
        self.router.on_pointer_end(&self.store, &mut self.listeners)
    }

    /// Timer callback: run due autoscroll steps. When the viewport moved,
    /// the last pointer position is replayed so the panel follows the
    /// scroll. Returns the distance scrolled.
    pub fn tick(&mut self, now: Instant, viewport: &mut impl ScrollViewport) -> f64 {
        let scrolled = self.router.autoscroll_mut().tick(now, viewport);
        if scrolled != 0.0 {
            if let Some(event) = self.last_move.clone() {
                if let Err(err) = self.pointer_move(&event, &*viewport, now) {
                    warn!(error = %err, "replaying pointer after autoscroll failed");
                }
            }
        }
        scrolled
    }

    /// Tear down: cancel any interaction, detach listeners and drop
    /// subscriptions. Idempotent.
    pub fn unmount(&mut self) -> Option<InteractionTransition> {
        if !self.mounted {
            return None;
        }
        let canceled = self.router.cancel(&self.store, &mut self.listeners);
        self.render.unmount();
        self.drag_handles.clear();
        self.last_move = None;
        self.mounted = false;
        debug!(canceled = canceled.is_some(), "grid unmounted");
        canceled
    }
}

impl<R: ImperativeRenderer, L: PointerListenerHost, K> Drop for GridLayout<R, L, K> {
    fn drop(&mut self) {
        if self.mounted {
            self.router.cancel(&self.store, &mut self.listeners);
            self.render.unmount();
            self.mounted = false;
        }
    }
}
