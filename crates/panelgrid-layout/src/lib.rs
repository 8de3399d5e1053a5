#![forbid(unsafe_code)]

//! Panel grid model and solvers.
//!
//! # Role in panelgrid
//! `panelgrid-layout` is pure: it owns the row/panel data model, the
//! collision resolver that keeps every row overlap-free, the grid settings,
//! and the geometry that maps pixel previews onto grid cells. Nothing here
//! holds state between calls; the runtime crate owns all mutable state.
//!
//! # Invariants
//!
//! 1. Every panel has `width >= 1` and `height >= 1`.
//! 2. After [`resolve_grid_row`], no two panels of a row share a cell.
//! 3. [`resolve_grid_row`] is a fixed point on its own output.

pub mod error;
pub mod metrics;
pub mod panel;
pub mod resolve;
pub mod settings;

pub use error::LayoutError;
pub use metrics::{GridMetrics, InteractionKind};
pub use panel::{
    GridLayoutData, GridRowData, PanelData, PanelId, find_panel, is_grid_data_equal,
    is_layout_equal, is_overlapping,
};
pub use panelgrid_core::geometry::{PixelRect, Point, PointerOffsets};
pub use resolve::{compact_grid_row, resolve_grid_row, resolve_layout};
pub use settings::{
    AccessMode, DEFAULT_MOBILE_BREAKPOINT, GridSettings, RuntimeGridSettings, SettingsError,
};
