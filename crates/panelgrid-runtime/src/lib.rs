#![forbid(unsafe_code)]

//! panelgrid runtime
//!
//! This crate holds all mutable state of a mounted grid and the machinery
//! that changes it in response to pointer input.
//!
//! # Key Components
//!
//! - [`Observable`] - current-value container with change subscriptions
//! - [`LayoutStore`] - observable layout, interaction and view state
//! - [`PointerRouter`] - `Idle -> Interacting -> Idle` drag/resize machine
//! - [`AutoscrollController`] - scrolls the viewport near its edges
//! - [`RenderLayer`] - paints panel nodes imperatively from the store
//! - [`HeightSmoother`] - keeps the container from shrinking mid-drag
//! - [`DragHandleRegistry`] - host elements that start drags
//! - [`GridLayout`] - the engine wiring all of the above together
//!
//! # Role in panelgrid
//! `panelgrid-runtime` is the orchestrator. It consumes pointer events from
//! `panelgrid-core`, calls the pure resolver and metrics of
//! `panelgrid-layout`, and paints through a host-supplied renderer.
//!
//! # Threading
//! Everything runs on the UI thread. The store relies on a single-writer
//! discipline (router and host layout sync) instead of locks, and none of
//! the types here are `Send`.

pub mod autoscroll;
pub mod config;
pub mod engine;
pub mod handles;
pub mod height;
pub mod observable;
pub mod render;
pub mod router;
pub mod store;

pub use autoscroll::{AutoscrollConfig, AutoscrollController, ScrollDirection, ScrollViewport};
pub use config::{GridConfigError, GridEngineConfig};
pub use engine::GridLayout;
pub use handles::{DragHandleRegistry, DragHandleSetter, HandleTarget, PanelContents};
pub use height::{ContainerHeight, HeightSmoother};
pub use observable::{Observable, Subscription};
pub use render::{
    HandleRegistry, ImperativeRenderer, PanelStyle, RenderLayer, StyleContext, panel_style,
};
pub use router::{
    IgnoreReason, InteractionEffect, InteractionPhase, InteractionTransition, ListenerKind,
    MoveContext, PointerListenerHost, PointerRouter,
};
pub use store::{ActivePanel, LayoutChangeCallback, LayoutStore, PanelInteractionEvent};
