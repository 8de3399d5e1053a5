#![forbid(unsafe_code)]

//! Imperative render layer.
//!
//! Panels are painted by writing styles straight onto host nodes from store
//! subscriptions, so per-frame interaction updates never go through a
//! declarative re-render. The layer only reads the store.
//!
//! # Failure Modes
//!
//! - **Missing handle**: a panel without a registered node is skipped.
//!   Nodes may lag the layout by a frame while the host mounts them.
//! - **Re-entrant notification**: if a paint triggers another store write
//!   (a renderer calling back into the engine), the nested paint is dropped
//!   instead of double-borrowing the renderer; the outer paint already
//!   reads the latest values.

use std::cell::RefCell;
use std::rc::Rc;

use panelgrid_core::geometry::{PixelRect, Point};
use panelgrid_layout::{
    GridLayoutData, GridMetrics, GridRowData, PanelData, PanelId, RuntimeGridSettings,
};
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::height::{ContainerHeight, HeightSmoother};
use crate::observable::{Observable, Subscription};
use crate::store::{ActivePanel, LayoutStore, PanelInteractionEvent};

/// Placement of one panel node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelStyle {
    /// CSS grid placement with 1-based, end-exclusive lines.
    Grid {
        row_start: u32,
        row_end: u32,
        column_start: u32,
        column_end: u32,
    },
    /// Fixed position in client space; the panel under the pointer.
    Absolute(PixelRect),
    /// Fills the grid; every other panel is hidden.
    Expanded,
    Hidden,
    /// Single-column mobile flow, in reading order.
    Stacked { order: usize },
}

/// Host binding that writes geometry onto real nodes.
pub trait ImperativeRenderer {
    /// Opaque node reference.
    type Handle;

    fn apply_geometry(&mut self, handle: &Self::Handle, style: &PanelStyle);
    fn set_container_height(&mut self, height: ContainerHeight);
}

/// Interaction state that affects a panel's style.
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleContext<'a> {
    pub active: Option<&'a ActivePanel>,
    pub expanded: Option<&'a str>,
    pub mobile: bool,
}

/// Style for `panel` inside `row`.
#[must_use]
pub fn panel_style(panel: &PanelData, row: &GridRowData, ctx: &StyleContext<'_>) -> PanelStyle {
    if let Some(expanded) = ctx.expanded {
        return if expanded == panel.id {
            PanelStyle::Expanded
        } else {
            PanelStyle::Hidden
        };
    }
    if row.is_collapsed {
        return PanelStyle::Hidden;
    }
    if let Some(active) = ctx.active.filter(|active| active.id == panel.id) {
        return PanelStyle::Absolute(active.position);
    }
    if ctx.mobile {
        let key = (panel.row, panel.column, &panel.id);
        let order = row
            .panels
            .values()
            .filter(|other| (other.row, other.column, &other.id) < key)
            .count();
        return PanelStyle::Stacked { order };
    }
    PanelStyle::Grid {
        row_start: panel.row + 1,
        row_end: panel.bottom() + 1,
        column_start: panel.column + 1,
        column_end: panel.right() + 1,
    }
}

/// Host nodes by row index, then panel id.
#[derive(Debug, Clone)]
pub struct HandleRegistry<H> {
    rows: FxHashMap<usize, FxHashMap<PanelId, H>>,
}

impl<H> Default for HandleRegistry<H> {
    fn default() -> Self {
        Self {
            rows: FxHashMap::default(),
        }
    }
}

impl<H> HandleRegistry<H> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the node of `panel_id` in `row_index`, returning the node it
    /// replaces.
    pub fn register(&mut self, row_index: usize, panel_id: &str, handle: H) -> Option<H> {
        self.rows
            .entry(row_index)
            .or_default()
            .insert(panel_id.to_string(), handle)
    }

    pub fn unregister(&mut self, row_index: usize, panel_id: &str) -> Option<H> {
        let row = self.rows.get_mut(&row_index)?;
        let handle = row.remove(panel_id);
        if row.is_empty() {
            self.rows.remove(&row_index);
        }
        handle
    }

    #[must_use]
    pub fn get(&self, row_index: usize, panel_id: &str) -> Option<&H> {
        self.rows.get(&row_index)?.get(panel_id)
    }

    /// Node of `panel_id` in `row_index`, or in any row if the panel moved
    /// before the host re-registered it.
    #[must_use]
    pub fn lookup(&self, row_index: usize, panel_id: &str) -> Option<&H> {
        self.get(row_index, panel_id)
            .or_else(|| self.rows.values().find_map(|row| row.get(panel_id)))
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.values().map(FxHashMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Store observables the layer paints from.
#[derive(Clone)]
struct StoreView {
    layout: Observable<GridLayoutData>,
    interaction_event: Observable<Option<PanelInteractionEvent>>,
    active_panel: Observable<Option<ActivePanel>>,
    runtime_settings: Observable<RuntimeGridSettings>,
    expanded_panel_id: Observable<Option<PanelId>>,
    is_mobile_view: Observable<bool>,
}

impl StoreView {
    fn of(store: &LayoutStore) -> Self {
        Self {
            layout: store.layout.clone(),
            interaction_event: store.interaction_event.clone(),
            active_panel: store.active_panel.clone(),
            runtime_settings: store.runtime_settings.clone(),
            expanded_panel_id: store.expanded_panel_id.clone(),
            is_mobile_view: store.is_mobile_view.clone(),
        }
    }
}

struct Painter<R: ImperativeRenderer> {
    renderer: R,
    handles: HandleRegistry<R::Handle>,
    smoother: HeightSmoother,
    row_header_height: f64,
}

impl<R: ImperativeRenderer> Painter<R> {
    fn paint_all(&mut self, view: &StoreView) {
        let layout = view.layout.get();
        let active = view.active_panel.get();
        let expanded = view.expanded_panel_id.get();
        let ctx = StyleContext {
            active: active.as_ref(),
            expanded: expanded.as_deref(),
            mobile: view.is_mobile_view.get(),
        };

        let mut painted = 0usize;
        for (row_index, row) in layout.iter().enumerate() {
            for panel in row.panels.values() {
                let Some(handle) = self.handles.lookup(row_index, &panel.id) else {
                    continue;
                };
                let style = panel_style(panel, row, &ctx);
                self.renderer.apply_geometry(handle, &style);
                painted += 1;
            }
        }

        let natural = GridMetrics::compute(
            &layout,
            view.runtime_settings.get(),
            Point::new(0.0, 0.0),
            self.row_header_height,
        )
        .content_bottom()
        .unwrap_or(0.0);
        let interacting = view.interaction_event.with(Option::is_some);
        let height = self.smoother.next(natural, interacting);
        self.renderer.set_container_height(height);
        trace!(painted, natural, ?height, "repainted grid");
    }

    /// Fast path while dragging: only the panel under the pointer moves.
    fn paint_active(&mut self, view: &StoreView, active: &ActivePanel) {
        let row_index = view
            .interaction_event
            .with(|event| event.as_ref().map_or(0, |event| event.target_row_index));
        if let Some(handle) = self.handles.lookup(row_index, &active.id) {
            self.renderer
                .apply_geometry(handle, &PanelStyle::Absolute(active.position));
        }
    }
}

/// Subscribes to a [`LayoutStore`] and paints through an
/// [`ImperativeRenderer`].
pub struct RenderLayer<R: ImperativeRenderer> {
    painter: Rc<RefCell<Painter<R>>>,
    view: StoreView,
    subscriptions: Vec<Subscription>,
}

impl<R: ImperativeRenderer> std::fmt::Debug for RenderLayer<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderLayer")
            .field("subscriptions", &self.subscriptions.len())
            .finish_non_exhaustive()
    }
}

impl<R: ImperativeRenderer + 'static> RenderLayer<R> {
    /// Subscribe to `store` and paint once.
    pub fn mount(store: &LayoutStore, renderer: R, row_header_height: f64) -> Self {
        let painter = Rc::new(RefCell::new(Painter {
            renderer,
            handles: HandleRegistry::new(),
            smoother: HeightSmoother::new(),
            row_header_height,
        }));
        let view = StoreView::of(store);
        let mut layer = Self {
            painter,
            view,
            subscriptions: Vec::new(),
        };

        let full = {
            let painter = Rc::clone(&layer.painter);
            let view = layer.view.clone();
            Rc::new(move || {
                if let Ok(mut painter) = painter.try_borrow_mut() {
                    painter.paint_all(&view);
                }
            })
        };
        let v = &layer.view;
        let subs = vec![
            v.layout.subscribe({
                let full = Rc::clone(&full);
                move |_: &GridLayoutData| full()
            }),
            v.interaction_event.subscribe({
                let full = Rc::clone(&full);
                move |_: &Option<PanelInteractionEvent>| full()
            }),
            v.runtime_settings.subscribe({
                let full = Rc::clone(&full);
                move |_: &RuntimeGridSettings| full()
            }),
            v.expanded_panel_id.subscribe({
                let full = Rc::clone(&full);
                move |_: &Option<PanelId>| full()
            }),
            v.is_mobile_view.subscribe({
                let full = Rc::clone(&full);
                move |_: &bool| full()
            }),
            v.active_panel.subscribe({
                let painter = Rc::clone(&layer.painter);
                let view = layer.view.clone();
                move |active: &Option<ActivePanel>| {
                    let Ok(mut painter) = painter.try_borrow_mut() else {
                        return;
                    };
                    match active {
                        Some(active) => painter.paint_active(&view, active),
                        None => painter.paint_all(&view),
                    }
                }
            }),
        ];
        layer.subscriptions = subs;
        layer.repaint();
        layer
    }
}

impl<R: ImperativeRenderer> RenderLayer<R> {
    /// Register a node and paint it immediately.
    pub fn register(&self, row_index: usize, panel_id: &str, handle: R::Handle) {
        if let Ok(mut painter) = self.painter.try_borrow_mut() {
            painter.handles.register(row_index, panel_id, handle);
            painter.paint_all(&self.view);
        }
    }

    pub fn unregister(&self, row_index: usize, panel_id: &str) -> Option<R::Handle> {
        self.painter
            .try_borrow_mut()
            .ok()
            .and_then(|mut painter| painter.handles.unregister(row_index, panel_id))
    }

    /// Paint everything from the current store state.
    pub fn repaint(&self) {
        if let Ok(mut painter) = self.painter.try_borrow_mut() {
            painter.paint_all(&self.view);
        }
    }

    /// Borrow the renderer, e.g. to inspect a test renderer.
    pub fn with_renderer<T>(&self, f: impl FnOnce(&R) -> T) -> T {
        f(&self.painter.borrow().renderer)
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    /// Drop every subscription, newest first, and forget all nodes.
    pub fn unmount(&mut self) {
        while let Some(subscription) = self.subscriptions.pop() {
            drop(subscription);
        }
        if let Ok(mut painter) = self.painter.try_borrow_mut() {
            painter.handles.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelgrid_layout::{AccessMode, GridSettings};

    #[derive(Default)]
    struct Recorder {
        styles: FxHashMap<&'static str, PanelStyle>,
        heights: Vec<ContainerHeight>,
    }

    impl ImperativeRenderer for Recorder {
        type Handle = &'static str;

        fn apply_geometry(&mut self, handle: &Self::Handle, style: &PanelStyle) {
            self.styles.insert(*handle, *style);
        }

        fn set_container_height(&mut self, height: ContainerHeight) {
            self.heights.push(height);
        }
    }

    fn store() -> LayoutStore {
        let rows = vec![
            GridRowData::new("first").with_panels([
                PanelData::new("a", 0, 0, 2, 2),
                PanelData::new("b", 0, 2, 3, 1),
            ]),
            GridRowData::new("second").with_panels([PanelData::new("c", 0, 0, 1, 1)]),
        ];
        let settings = GridSettings::new(10.0, 40.0, 12).expect("valid settings");
        let store = LayoutStore::new(&rows, settings, 768.0, AccessMode::Edit);
        store.set_container_width(1190.0);
        store
    }

    fn style_of(layer: &RenderLayer<Recorder>, node: &'static str) -> Option<PanelStyle> {
        layer.with_renderer(|r| r.styles.get(node).copied())
    }

    #[test]
    fn grid_lines_are_one_based() {
        let row = GridRowData::new("r").with_panels([PanelData::new("a", 1, 2, 3, 4)]);
        let style = panel_style(&row.panels["a"], &row, &StyleContext::default());
        assert_eq!(
            style,
            PanelStyle::Grid {
                row_start: 2,
                row_end: 6,
                column_start: 3,
                column_end: 6
            }
        );
    }

    #[test]
    fn expanded_and_collapsed_hide_panels() {
        let row = GridRowData::new("r").with_panels([
            PanelData::new("a", 0, 0, 1, 1),
            PanelData::new("b", 0, 1, 1, 1),
        ]);
        let ctx = StyleContext {
            expanded: Some("a"),
            ..StyleContext::default()
        };
        assert_eq!(panel_style(&row.panels["a"], &row, &ctx), PanelStyle::Expanded);
        assert_eq!(panel_style(&row.panels["b"], &row, &ctx), PanelStyle::Hidden);

        let collapsed = row.clone().collapsed(true);
        assert_eq!(
            panel_style(&collapsed.panels["a"], &collapsed, &StyleContext::default()),
            PanelStyle::Hidden
        );
    }

    #[test]
    fn mobile_stacks_in_reading_order() {
        let row = GridRowData::new("r").with_panels([
            PanelData::new("late", 3, 0, 1, 1),
            PanelData::new("right", 0, 6, 1, 1),
            PanelData::new("left", 0, 0, 1, 1),
        ]);
        let ctx = StyleContext {
            mobile: true,
            ..StyleContext::default()
        };
        let order = |id: &str| panel_style(&row.panels[id], &row, &ctx);
        assert_eq!(order("left"), PanelStyle::Stacked { order: 0 });
        assert_eq!(order("right"), PanelStyle::Stacked { order: 1 });
        assert_eq!(order("late"), PanelStyle::Stacked { order: 2 });
    }

    #[test]
    fn registry_falls_back_across_rows() {
        let mut registry = HandleRegistry::new();
        registry.register(0, "a", 1);
        registry.register(1, "b", 2);
        assert_eq!(registry.get(1, "a"), None);
        assert_eq!(registry.lookup(1, "a"), Some(&1));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.unregister(0, "a"), Some(1));
        assert_eq!(registry.unregister(0, "a"), None);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn registering_paints_and_missing_nodes_are_skipped() {
        let store = store();
        let layer = RenderLayer::mount(&store, Recorder::default(), 0.0);
        layer.register(0, "a", "node-a");
        assert_eq!(
            style_of(&layer, "node-a"),
            Some(PanelStyle::Grid {
                row_start: 1,
                row_end: 3,
                column_start: 1,
                column_end: 3
            })
        );
        // "b" and "c" have no nodes; painting still succeeds.
        assert_eq!(layer.with_renderer(|r| r.styles.len()), 1);
    }

    #[test]
    fn layout_changes_repaint() {
        let store = store();
        let layer = RenderLayer::mount(&store, Recorder::default(), 0.0);
        layer.register(0, "b", "node-b");
        store.layout.update(|layout| {
            layout[0].insert(PanelData::new("b", 2, 2, 3, 1));
        });
        assert!(matches!(
            style_of(&layer, "node-b"),
            Some(PanelStyle::Grid { row_start: 3, .. })
        ));
    }

    #[test]
    fn active_panel_fast_path_and_release() {
        let store = store();
        let layer = RenderLayer::mount(&store, Recorder::default(), 0.0);
        layer.register(0, "a", "node-a");
        let rect = PixelRect::new(33.0, 44.0, 190.0, 90.0);
        store.active_panel.set(Some(ActivePanel {
            id: "a".into(),
            position: rect,
        }));
        assert_eq!(style_of(&layer, "node-a"), Some(PanelStyle::Absolute(rect)));

        store.active_panel.set(None);
        assert!(matches!(style_of(&layer, "node-a"), Some(PanelStyle::Grid { .. })));
    }

    #[test]
    fn mount_sets_auto_height_and_unmount_unsubscribes() {
        let store = store();
        let mut layer = RenderLayer::mount(&store, Recorder::default(), 0.0);
        assert_eq!(
            layer.with_renderer(|r| r.heights.last().copied()),
            Some(ContainerHeight::Auto)
        );
        assert!(layer.is_mounted());
        layer.unmount();
        assert!(!layer.is_mounted());
        let heights = layer.with_renderer(|r| r.heights.len());
        store.layout.update(|layout| layout.truncate(1));
        assert_eq!(layer.with_renderer(|r| r.heights.len()), heights);
    }
}
