#![forbid(unsafe_code)]

//! Pointer event router: the drag/resize interaction state machine.
//!
//! ```text
//! Idle --pointer down--> Interacting --pointer up--> Idle
//!                             \--------cancel--------/
//! ```
//!
//! Entering `Interacting` attaches the move and end listeners through a
//! [`PointerListenerHost`]; leaving it detaches them in reverse order of
//! attachment. Every handler returns an [`InteractionTransition`] so hosts
//! and tests can see exactly what happened, including why an event was
//! ignored.
//!
//! The router and the host's layout sync are the only writers of the
//! [`LayoutStore`].

use panelgrid_core::event::{PointerError, PointerEvent};
use panelgrid_core::geometry::{PixelRect, PointerOffsets};
use panelgrid_layout::{
    AccessMode, GridMetrics, InteractionKind, PanelData, PanelId, find_panel, is_layout_equal,
    resolve_grid_row,
};
use tracing::{debug, trace};
use web_time::Instant;

use crate::autoscroll::{AutoscrollController, ScrollViewport};
use crate::store::{ActivePanel, LayoutStore, PanelInteractionEvent};

/// Document-level listener the router needs while an interaction runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    PointerMove,
    PointerEnd,
}

/// Installs and removes the document listeners that feed the router.
pub trait PointerListenerHost {
    fn attach(&mut self, listener: ListenerKind);
    fn detach(&mut self, listener: ListenerKind);
}

/// Lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InteractionPhase {
    #[default]
    Idle,
    Interacting { kind: InteractionKind, id: PanelId },
}

impl InteractionPhase {
    #[must_use]
    pub fn is_interacting(&self) -> bool {
        matches!(self, Self::Interacting { .. })
    }
}

/// Why an event was dropped without changing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IgnoreReason {
    ViewMode,
    PanelExpanded,
    MobileView,
    MultiTouch,
    NotPrimaryButton,
    AlreadyInteracting,
    NoActiveInteraction,
    UnknownPanel,
    UnknownHandle,
    /// The row rectangles do not cover the target row.
    MissingRowMetrics,
}

/// What one transition did.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionEffect {
    Started {
        kind: InteractionKind,
        id: PanelId,
        row_index: usize,
    },
    PreviewMoved {
        target_row_index: usize,
        target_row_changed: bool,
        /// The resolver ran for this move.
        resolved: bool,
        /// A new draft layout was published.
        layout_changed: bool,
    },
    Dropped {
        /// The settled layout differed and was reported to the host.
        committed: bool,
    },
    Canceled,
    Ignored {
        reason: IgnoreReason,
    },
}

/// One state-machine step.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionTransition {
    pub sequence: u64,
    pub from: InteractionPhase,
    pub to: InteractionPhase,
    pub effect: InteractionEffect,
}

/// Per-move inputs owned by the engine.
#[derive(Debug)]
pub struct MoveContext<'a, V> {
    pub metrics: &'a GridMetrics,
    pub viewport: &'a V,
    pub now: Instant,
}

/// Translates pointer events into store mutations.
#[derive(Debug)]
pub struct PointerRouter {
    phase: InteractionPhase,
    last_requested: Option<PanelData>,
    resolve_count: u64,
    transition_counter: u64,
    attached: Vec<ListenerKind>,
    autoscroll: AutoscrollController,
}

impl PointerRouter {
    #[must_use]
    pub fn new(autoscroll: AutoscrollController) -> Self {
        Self {
            phase: InteractionPhase::Idle,
            last_requested: None,
            resolve_count: 0,
            transition_counter: 0,
            attached: Vec::new(),
            autoscroll,
        }
    }

    #[must_use]
    pub fn phase(&self) -> &InteractionPhase {
        &self.phase
    }

    /// Total resolver invocations since construction.
    #[must_use]
    pub fn resolve_count(&self) -> u64 {
        self.resolve_count
    }

    /// Listeners currently attached, in attachment order.
    #[must_use]
    pub fn attached_listeners(&self) -> &[ListenerKind] {
        &self.attached
    }

    #[must_use]
    pub fn autoscroll(&self) -> &AutoscrollController {
        &self.autoscroll
    }

    pub fn autoscroll_mut(&mut self) -> &mut AutoscrollController {
        &mut self.autoscroll
    }

    /// Start a drag or resize of panel `id`.
    ///
    /// # Errors
    ///
    /// Returns the extraction error when the event carries no usable
    /// position (an unsupported event type, or a touch without touches).
    pub fn on_pointer_down(
        &mut self,
        store: &LayoutStore,
        metrics: &GridMetrics,
        id: &str,
        kind: InteractionKind,
        event: &PointerEvent,
        host: &mut impl PointerListenerHost,
    ) -> Result<InteractionTransition, PointerError> {
        if self.phase.is_interacting() {
            return Ok(self.ignored(IgnoreReason::AlreadyInteracting));
        }
        if store.access_mode.get() == AccessMode::View {
            return Ok(self.ignored(IgnoreReason::ViewMode));
        }
        if store.expanded_panel_id.with(Option::is_some) {
            return Ok(self.ignored(IgnoreReason::PanelExpanded));
        }
        if store.is_mobile_view.get() {
            return Ok(self.ignored(IgnoreReason::MobileView));
        }
        if event.is_multi_touch() {
            return Ok(self.ignored(IgnoreReason::MultiTouch));
        }
        let pointer = event.client_position()?;
        if !event.is_primary() {
            return Ok(self.ignored(IgnoreReason::NotPrimaryButton));
        }

        let located = store.layout.with(|layout| {
            find_panel(layout, id).map(|(row_index, panel)| (row_index, panel.clone()))
        });
        let Some((row_index, panel)) = located else {
            return Ok(self.ignored(IgnoreReason::UnknownPanel));
        };
        let Some(panel_rect) = metrics.panel_rect(row_index, &panel) else {
            return Ok(self.ignored(IgnoreReason::MissingRowMetrics));
        };

        store.interaction_event.set(Some(PanelInteractionEvent {
            kind,
            id: panel.id.clone(),
            target_row_index: row_index,
            panel_rect,
            pointer_offsets: PointerOffsets::between(pointer, &panel_rect),
        }));
        self.last_requested = None;
        for listener in [ListenerKind::PointerMove, ListenerKind::PointerEnd] {
            host.attach(listener);
            self.attached.push(listener);
        }

        let to = InteractionPhase::Interacting {
            kind,
            id: panel.id.clone(),
        };
        Ok(self.transition(
            to,
            InteractionEffect::Started {
                kind,
                id: panel.id,
                row_index,
            },
        ))
    }

    /// Follow the pointer: publish the preview, retarget the row, and
    /// resolve the draft layout when the requested cell changed.
    ///
    /// # Errors
    ///
    /// Returns the extraction error for events without a usable position.
    pub fn on_pointer_move<V: ScrollViewport>(
        &mut self,
        store: &LayoutStore,
        ctx: &MoveContext<'_, V>,
        event: &PointerEvent,
    ) -> Result<InteractionTransition, PointerError> {
        let Some(interaction) = store.interaction_event.get() else {
            self.autoscroll.stop();
            return Ok(self.ignored(IgnoreReason::NoActiveInteraction));
        };
        let pointer = event.client_position()?;
        let metrics = ctx.metrics;
        let origin_row = interaction.target_row_index;

        let current = store.layout.with(|layout| {
            layout
                .get(origin_row)
                .and_then(|row| row.get(&interaction.id))
                .cloned()
        });
        let Some(current) = current else {
            return Ok(self.ignored(IgnoreReason::UnknownPanel));
        };

        let offsets = interaction.pointer_offsets;
        let preview = match interaction.kind {
            InteractionKind::Drag => PixelRect::from_edges(
                pointer.x - offsets.left,
                pointer.y - offsets.top,
                pointer.x - offsets.right,
                pointer.y - offsets.bottom,
            ),
            InteractionKind::Resize => {
                let Some(live) = metrics.panel_rect(origin_row, &current) else {
                    return Ok(self.ignored(IgnoreReason::MissingRowMetrics));
                };
                let grid_right = metrics
                    .row_rect(origin_row)
                    .map_or(f64::INFINITY, |row| row.right());
                PixelRect::from_edges(
                    live.left,
                    live.top,
                    (pointer.x - offsets.right).min(grid_right),
                    pointer.y - offsets.bottom,
                )
            }
        };

        store.active_panel.set(Some(ActivePanel {
            id: interaction.id.clone(),
            position: preview,
        }));

        let target_row = match interaction.kind {
            InteractionKind::Drag => metrics.target_row(&preview).unwrap_or(origin_row),
            InteractionKind::Resize => origin_row,
        };
        let Some(requested) = metrics.grid_cell(interaction.kind, &preview, target_row, &current)
        else {
            return Ok(self.ignored(IgnoreReason::MissingRowMetrics));
        };

        let target_row_changed = target_row != origin_row;
        if target_row_changed {
            store.interaction_event.set(Some(PanelInteractionEvent {
                target_row_index: target_row,
                ..interaction.clone()
            }));
        }

        let unchanged = !target_row_changed && self.last_requested.as_ref() == Some(&requested);
        let (resolved, layout_changed) = if unchanged {
            trace!(id = %requested.id, "requested cell unchanged; skipping resolve");
            (false, false)
        } else {
            self.last_requested = Some(requested.clone());
            let changed = self.resolve_draft(store, &requested, origin_row, target_row);
            (true, changed)
        };

        self.autoscroll
            .update(pointer.y, interaction.kind, ctx.viewport, ctx.now);

        let to = self.phase.clone();
        Ok(self.transition(
            to,
            InteractionEffect::PreviewMoved {
                target_row_index: target_row,
                target_row_changed,
                resolved,
                layout_changed,
            },
        ))
    }

    /// Finish the interaction and commit the settled layout.
    pub fn on_pointer_end(
        &mut self,
        store: &LayoutStore,
        host: &mut impl PointerListenerHost,
    ) -> InteractionTransition {
        if !self.phase.is_interacting() {
            return self.ignored(IgnoreReason::NoActiveInteraction);
        }
        self.clear_interaction(store, host);
        let committed = store.commit_stable_layout();
        self.transition(InteractionPhase::Idle, InteractionEffect::Dropped { committed })
    }

    /// Abandon the interaction and restore the last stable layout. Used on
    /// teardown. `None` when idle.
    pub fn cancel(
        &mut self,
        store: &LayoutStore,
        host: &mut impl PointerListenerHost,
    ) -> Option<InteractionTransition> {
        if !self.phase.is_interacting() {
            return None;
        }
        self.clear_interaction(store, host);
        store.layout.set(store.stable_layout());
        Some(self.transition(InteractionPhase::Idle, InteractionEffect::Canceled))
    }

    /// Record an ignored event without touching state.
    pub fn ignored(&mut self, reason: IgnoreReason) -> InteractionTransition {
        let to = self.phase.clone();
        self.transition(to, InteractionEffect::Ignored { reason })
    }

    /// Move the requested panel into `target_row`, re-resolving the origin
    /// row when the panel left it. Returns whether the layout changed.
    fn resolve_draft(
        &mut self,
        store: &LayoutStore,
        requested: &PanelData,
        origin_row: usize,
        target_row: usize,
    ) -> bool {
        let mut next = store.layout.get();
        if target_row >= next.len() {
            return false;
        }
        for row in &mut next {
            row.remove(&requested.id);
        }
        next[target_row] = resolve_grid_row(&next[target_row], Some(requested));
        self.resolve_count += 1;
        if target_row != origin_row && origin_row < next.len() {
            next[origin_row] = resolve_grid_row(&next[origin_row], None);
            self.resolve_count += 1;
        }

        if store.layout.with(|current| is_layout_equal(current, &next)) {
            return false;
        }
        store.layout.set(next)
    }

    fn clear_interaction(&mut self, store: &LayoutStore, host: &mut impl PointerListenerHost) {
        self.autoscroll.stop();
        store.interaction_event.set(None);
        store.active_panel.set(None);
        while let Some(listener) = self.attached.pop() {
            host.detach(listener);
        }
        self.last_requested = None;
    }

    fn transition(&mut self, to: InteractionPhase, effect: InteractionEffect) -> InteractionTransition {
        self.transition_counter = self.transition_counter.saturating_add(1);
        let from = std::mem::replace(&mut self.phase, to.clone());
        debug!(
            sequence = self.transition_counter,
            from = ?from,
            to = ?to,
            effect = ?effect,
            "interaction transition"
        );
        InteractionTransition {
            sequence: self.transition_counter,
            from,
            to,
            effect,
        }
    }
}

impl Default for PointerRouter {
    fn default() -> Self {
        Self::new(AutoscrollController::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelgrid_core::event::{MouseButton, MouseEvent, MousePhase, TouchEvent, TouchPhase};
    use panelgrid_core::geometry::Point;
    use panelgrid_layout::{GridRowData, GridSettings, RuntimeGridSettings};

    #[derive(Default)]
    struct Listeners {
        log: Vec<(bool, ListenerKind)>,
    }

    impl PointerListenerHost for Listeners {
        fn attach(&mut self, listener: ListenerKind) {
            self.log.push((true, listener));
        }
        fn detach(&mut self, listener: ListenerKind) {
            self.log.push((false, listener));
        }
    }

    struct StillViewport;

    impl ScrollViewport for StillViewport {
        fn viewport_height(&self) -> f64 {
            10_000.0
        }
        fn scroll_top(&self) -> f64 {
            0.0
        }
        fn scroll_height(&self) -> f64 {
            10_000.0
        }
        fn scroll_by(&mut self, _dy: f64) {}
    }

    fn settings() -> GridSettings {
        GridSettings::new(10.0, 40.0, 12).expect("valid settings")
    }

    /// Pitch 100px horizontally, 50px vertically; rows are computed from
    /// the layout with no row headers.
    fn metrics(store: &LayoutStore) -> GridMetrics {
        let runtime = RuntimeGridSettings::for_container(&settings(), 1190.0);
        store
            .layout
            .with(|layout| GridMetrics::compute(layout, runtime, Point::new(0.0, 0.0), 0.0))
    }

    fn store(rows: Vec<GridRowData>) -> LayoutStore {
        let store = LayoutStore::new(&rows, settings(), 768.0, AccessMode::Edit);
        store.set_container_width(1190.0);
        store
    }

    fn one_panel() -> LayoutStore {
        store(vec![
            GridRowData::new("r").with_panels([PanelData::new("a", 0, 0, 2, 2)]),
        ])
    }

    fn down(x: f64, y: f64) -> PointerEvent {
        PointerEvent::mouse(MousePhase::Down, x, y)
    }

    fn mv(x: f64, y: f64) -> PointerEvent {
        PointerEvent::mouse(MousePhase::Move, x, y)
    }

    fn start(
        router: &mut PointerRouter,
        store: &LayoutStore,
        host: &mut Listeners,
        kind: InteractionKind,
        event: &PointerEvent,
    ) -> Result<InteractionTransition, PointerError> {
        router.on_pointer_down(store, &metrics(store), "a", kind, event, host)
    }

    fn move_to(
        router: &mut PointerRouter,
        store: &LayoutStore,
        x: f64,
        y: f64,
    ) -> InteractionTransition {
        let metrics = metrics(store);
        let ctx = MoveContext {
            metrics: &metrics,
            viewport: &StillViewport,
            now: Instant::now(),
        };
        router
            .on_pointer_move(store, &ctx, &mv(x, y))
            .expect("mouse events have a position")
    }

    #[test]
    fn start_attaches_and_drop_detaches_in_reverse() {
        let store = one_panel();
        let mut router = PointerRouter::default();
        let mut host = Listeners::default();

        let started = start(&mut router, &store, &mut host, InteractionKind::Drag, &down(20.0, 20.0))
            .expect("valid event");
        assert_eq!(started.from, InteractionPhase::Idle);
        assert!(matches!(started.effect, InteractionEffect::Started { row_index: 0, .. }));
        assert_eq!(
            router.attached_listeners(),
            &[ListenerKind::PointerMove, ListenerKind::PointerEnd]
        );
        let event = store.interaction_event.get().expect("interaction published");
        assert_eq!(event.panel_rect, PixelRect::new(0.0, 0.0, 190.0, 90.0));
        assert_eq!(event.pointer_offsets.left, 20.0);

        let dropped = router.on_pointer_end(&store, &mut host);
        assert_eq!(dropped.to, InteractionPhase::Idle);
        assert_eq!(dropped.effect, InteractionEffect::Dropped { committed: false });
        assert_eq!(
            host.log,
            vec![
                (true, ListenerKind::PointerMove),
                (true, ListenerKind::PointerEnd),
                (false, ListenerKind::PointerEnd),
                (false, ListenerKind::PointerMove),
            ]
        );
        assert!(store.interaction_event.get().is_none());
        assert!(store.active_panel.get().is_none());
    }

    #[test]
    fn refusals_do_not_start() {
        let store = one_panel();
        let mut router = PointerRouter::default();
        let mut host = Listeners::default();
        let m = metrics(&store);

        store.set_access_mode(AccessMode::View);
        let t = start(&mut router, &store, &mut host, InteractionKind::Drag, &down(5.0, 5.0))
            .expect("valid event");
        assert_eq!(t.effect, InteractionEffect::Ignored { reason: IgnoreReason::ViewMode });
        store.set_access_mode(AccessMode::Edit);

        store.set_expanded_panel(Some("a")).expect("panel exists");
        let t = start(&mut router, &store, &mut host, InteractionKind::Drag, &down(5.0, 5.0))
            .expect("valid event");
        assert_eq!(t.effect, InteractionEffect::Ignored { reason: IgnoreReason::PanelExpanded });
        store.set_expanded_panel(None).expect("clearing always works");

        let two_fingers = PointerEvent::Touch(TouchEvent {
            phase: TouchPhase::Start,
            touches: vec![Point::new(5.0, 5.0), Point::new(50.0, 5.0)],
        });
        let t = start(&mut router, &store, &mut host, InteractionKind::Drag, &two_fingers)
            .expect("multi-touch is not an error");
        assert_eq!(t.effect, InteractionEffect::Ignored { reason: IgnoreReason::MultiTouch });

        let right_click = PointerEvent::Mouse(
            MouseEvent::new(MousePhase::Down, 5.0, 5.0).with_button(MouseButton::Secondary),
        );
        let t = start(&mut router, &store, &mut host, InteractionKind::Drag, &right_click)
            .expect("valid event");
        assert_eq!(t.effect, InteractionEffect::Ignored { reason: IgnoreReason::NotPrimaryButton });

        let t = router
            .on_pointer_down(&store, &m, "zzz", InteractionKind::Drag, &down(5.0, 5.0), &mut host)
            .expect("valid event");
        assert_eq!(t.effect, InteractionEffect::Ignored { reason: IgnoreReason::UnknownPanel });

        assert!(host.log.is_empty());
        assert!(store.interaction_event.get().is_none());
        assert_eq!(router.phase(), &InteractionPhase::Idle);
    }

    #[test]
    fn unsupported_event_fails_loudly() {
        let store = one_panel();
        let mut router = PointerRouter::default();
        let mut host = Listeners::default();
        let event = PointerEvent::Unsupported { kind: "wheel".into() };
        let err = start(&mut router, &store, &mut host, InteractionKind::Drag, &event)
            .expect_err("unsupported events are a wiring bug");
        assert_eq!(err, PointerError::UnsupportedEvent { kind: "wheel".into() });
        assert!(!router.phase().is_interacting());
    }

    #[test]
    fn second_down_while_active_is_ignored() {
        let store = one_panel();
        let mut router = PointerRouter::default();
        let mut host = Listeners::default();
        start(&mut router, &store, &mut host, InteractionKind::Drag, &down(5.0, 5.0))
            .expect("valid event");
        let t = start(&mut router, &store, &mut host, InteractionKind::Resize, &down(5.0, 5.0))
            .expect("valid event");
        assert_eq!(t.effect, InteractionEffect::Ignored { reason: IgnoreReason::AlreadyInteracting });
        assert_eq!(router.attached_listeners().len(), 2);
    }

    #[test]
    fn move_without_interaction_is_ignored() {
        let store = one_panel();
        let mut router = PointerRouter::default();
        let t = move_to(&mut router, &store, 100.0, 100.0);
        assert_eq!(
            t.effect,
            InteractionEffect::Ignored { reason: IgnoreReason::NoActiveInteraction }
        );
        assert_eq!(router.resolve_count(), 0);
    }

    #[test]
    fn drag_moves_panel_and_skips_duplicate_cells() {
        let store = one_panel();
        let mut router = PointerRouter::default();
        let mut host = Listeners::default();
        start(&mut router, &store, &mut host, InteractionKind::Drag, &down(20.0, 20.0))
            .expect("valid event");

        // Preview left = 320 - 20 = 300 -> column 3.
        let t = move_to(&mut router, &store, 320.0, 20.0);
        assert!(matches!(
            t.effect,
            InteractionEffect::PreviewMoved { resolved: true, layout_changed: true, .. }
        ));
        assert_eq!(store.layout.with(|l| l[0].get("a").map(|p| p.column)), Some(3));
        assert_eq!(router.resolve_count(), 1);
        let active = store.active_panel.get().expect("active panel published");
        assert_eq!(active.position.left, 300.0);

        // Same cell: no resolve, but the preview still follows the pointer.
        let t = move_to(&mut router, &store, 335.0, 22.0);
        assert!(matches!(
            t.effect,
            InteractionEffect::PreviewMoved { resolved: false, layout_changed: false, .. }
        ));
        assert_eq!(router.resolve_count(), 1);
        assert_eq!(store.active_panel.get().map(|a| a.position.left), Some(315.0));

        let dropped = router.on_pointer_end(&store, &mut host);
        assert_eq!(dropped.effect, InteractionEffect::Dropped { committed: true });
        assert_eq!(store.stable_layout()[0].get("a").map(|p| p.column), Some(3));
    }

    #[test]
    fn resize_widens_by_column_delta() {
        let store = one_panel();
        let mut router = PointerRouter::default();
        let mut host = Listeners::default();
        // Grab the corner at (185, 85): right offset -5, bottom offset -5.
        start(&mut router, &store, &mut host, InteractionKind::Resize, &down(185.0, 85.0))
            .expect("valid event");
        // Right edge at 490 -> grid line 5.
        move_to(&mut router, &store, 485.0, 85.0);
        assert_eq!(
            store.layout.with(|l| l[0].get("a").cloned()),
            Some(PanelData::new("a", 0, 0, 5, 2))
        );
        // Far left: never below one column.
        move_to(&mut router, &store, -500.0, 85.0);
        assert_eq!(store.layout.with(|l| l[0].get("a").map(|p| p.width)), Some(1));
    }

    #[test]
    fn cancel_detaches_without_committing() {
        let store = one_panel();
        let mut router = PointerRouter::default();
        let mut host = Listeners::default();
        start(&mut router, &store, &mut host, InteractionKind::Drag, &down(20.0, 20.0))
            .expect("valid event");
        move_to(&mut router, &store, 520.0, 20.0);

        let canceled = router.cancel(&store, &mut host).expect("was interacting");
        assert_eq!(canceled.effect, InteractionEffect::Canceled);
        assert!(router.attached_listeners().is_empty());
        assert_eq!(store.stable_layout()[0].get("a").map(|p| p.column), Some(0));
        assert_eq!(store.layout.get(), store.stable_layout(), "draft discarded");
        assert!(router.cancel(&store, &mut host).is_none());
    }

    #[test]
    fn sequence_increases_on_every_transition() {
        let store = one_panel();
        let mut router = PointerRouter::default();
        let mut host = Listeners::default();
        let a = router.ignored(IgnoreReason::UnknownHandle);
        let b = router.on_pointer_end(&store, &mut host);
        assert_eq!((a.sequence, b.sequence), (1, 2));
    }
}
