#![forbid(unsafe_code)]

//! Layout model errors.

use std::fmt;

use crate::panel::PanelId;

/// A panel or row violates the grid model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// Panel width is zero.
    ZeroWidth { id: PanelId },
    /// Panel height is zero.
    ZeroHeight { id: PanelId },
    /// `column + width` runs past the last grid column.
    ExceedsColumns {
        id: PanelId,
        column: u32,
        width: u32,
        column_count: u32,
    },
    /// Two panels in the same row share at least one cell.
    Overlap {
        row_index: usize,
        first: PanelId,
        second: PanelId,
    },
    /// A row index outside the layout.
    UnknownRow { row_index: usize },
    /// No panel with this id exists in the layout.
    UnknownPanel { id: PanelId },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroWidth { id } => write!(f, "panel `{id}` has zero width"),
            Self::ZeroHeight { id } => write!(f, "panel `{id}` has zero height"),
            Self::ExceedsColumns {
                id,
                column,
                width,
                column_count,
            } => write!(
                f,
                "panel `{id}` spans columns {column}..{} but the grid has {column_count}",
                column.saturating_add(*width)
            ),
            Self::Overlap {
                row_index,
                first,
                second,
            } => write!(f, "panels `{first}` and `{second}` overlap in row {row_index}"),
            Self::UnknownRow { row_index } => write!(f, "row {row_index} does not exist"),
            Self::UnknownPanel { id } => write!(f, "panel `{id}` does not exist"),
        }
    }
}

impl std::error::Error for LayoutError {}
