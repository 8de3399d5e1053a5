#![forbid(unsafe_code)]

//! panelgrid public facade crate.
//!
//! A row-based dashboard grid: panels sit on a fixed column grid inside
//! collapsible rows, and users drag and resize them with mouse or touch
//! while the engine keeps every row free of overlaps.
//!
//! This crate re-exports the stable surface of the internal crates and
//! offers a prelude for day-to-day usage.
//!
//! ```
//! use panelgrid::prelude::*;
//!
//! let row = GridRowData::new("Overview").with_panels([
//!     PanelData::new("cpu", 0, 0, 4, 2),
//!     PanelData::new("mem", 0, 2, 4, 2),
//! ]);
//! let resolved = resolve_grid_row(&row, None);
//! assert_eq!(resolved.get("mem").map(|p| p.row), Some(2));
//! ```

pub mod error;

pub use error::{DegradationAction, Error, Result};

// --- Core re-exports -------------------------------------------------------

pub use panelgrid_core::{
    Buttons, MouseButton, MouseEvent, MousePhase, PixelRect, Point, PointerError, PointerEvent,
    PointerOffsets, TouchEvent, TouchPhase,
};

// --- Layout re-exports -----------------------------------------------------

pub use panelgrid_layout::{
    AccessMode, GridLayoutData, GridMetrics, GridRowData, GridSettings, InteractionKind,
    LayoutError, PanelData, PanelId, RuntimeGridSettings, SettingsError, find_panel,
    is_layout_equal, resolve_grid_row, resolve_layout,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use panelgrid_runtime::{
    AutoscrollConfig, ContainerHeight, DragHandleSetter, GridConfigError, GridEngineConfig,
    GridLayout, HandleTarget, IgnoreReason, ImperativeRenderer, InteractionEffect,
    InteractionTransition, ListenerKind, PanelContents, PanelStyle, PointerListenerHost,
    ScrollViewport,
};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        AccessMode, Error, GridLayoutData, GridRowData, GridSettings, MousePhase, PanelData,
        Point, PointerEvent, Result, TouchPhase, resolve_grid_row,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{
        ContainerHeight, GridEngineConfig, GridLayout, HandleTarget, ImperativeRenderer,
        PanelContents, PanelStyle, PointerListenerHost, ScrollViewport,
    };

    pub use crate::{core, layout};

    #[cfg(feature = "runtime")]
    pub use crate::runtime;
}

pub use panelgrid_core as core;
pub use panelgrid_layout as layout;
#[cfg(feature = "runtime")]
pub use panelgrid_runtime as runtime;
