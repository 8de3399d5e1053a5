#![forbid(unsafe_code)]

//! Row/panel data model.
//!
//! A [`GridLayoutData`] is an ordered list of rows, top to bottom. Each
//! [`GridRowData`] maps panel ids to [`PanelData`] in integer grid cells; all
//! panels of a row share the same set of columns.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;

/// Stable identifier of a panel.
pub type PanelId = String;

/// Full layout: rows in display order.
pub type GridLayoutData = Vec<GridRowData>;

/// A panel's placement in grid cells.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PanelData {
    pub id: PanelId,
    /// First occupied grid row (0-based, within the panel's row band).
    pub row: u32,
    /// First occupied column (0-based).
    pub column: u32,
    /// Columns spanned. Always at least 1 in a valid layout.
    pub width: u32,
    /// Grid rows spanned. Always at least 1 in a valid layout.
    pub height: u32,
}

impl PanelData {
    /// Create a panel placement.
    #[must_use]
    pub fn new(id: impl Into<PanelId>, row: u32, column: u32, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            row,
            column,
            width,
            height,
        }
    }

    /// One past the last occupied column.
    #[inline]
    #[must_use]
    pub fn right(&self) -> u32 {
        self.column.saturating_add(self.width)
    }

    /// One past the last occupied grid row.
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> u32 {
        self.row.saturating_add(self.height)
    }

    /// Check the panel against the model invariants for a grid of
    /// `column_count` columns.
    pub fn validate(&self, column_count: u32) -> Result<(), LayoutError> {
        if self.width == 0 {
            return Err(LayoutError::ZeroWidth {
                id: self.id.clone(),
            });
        }
        if self.height == 0 {
            return Err(LayoutError::ZeroHeight {
                id: self.id.clone(),
            });
        }
        if self.right() > column_count {
            return Err(LayoutError::ExceedsColumns {
                id: self.id.clone(),
                column: self.column,
                width: self.width,
                column_count,
            });
        }
        Ok(())
    }

    /// Coerce the panel into the model invariants: extents of at least one
    /// cell, width no wider than the grid, and the right edge inside the grid
    /// (shifting the column left when needed).
    #[must_use]
    pub fn clamp_to_columns(&self, column_count: u32) -> Self {
        let column_count = column_count.max(1);
        let width = self.width.clamp(1, column_count);
        let column = self.column.min(column_count - width);
        Self {
            id: self.id.clone(),
            row: self.row,
            column,
            width,
            height: self.height.max(1),
        }
    }
}

/// Two placements cover at least one common cell.
#[must_use]
pub fn is_overlapping(a: &PanelData, b: &PanelData) -> bool {
    a.column < b.right() && b.column < a.right() && a.row < b.bottom() && b.row < a.bottom()
}

/// Same id and same cells.
#[must_use]
pub fn is_grid_data_equal(a: &PanelData, b: &PanelData) -> bool {
    a == b
}

/// A horizontal band of the grid holding non-overlapping panels.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRowData {
    pub title: String,
    #[serde(default)]
    pub is_collapsed: bool,
    #[serde(default)]
    pub panels: BTreeMap<PanelId, PanelData>,
}

impl GridRowData {
    /// Empty, expanded row.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            is_collapsed: false,
            panels: BTreeMap::new(),
        }
    }

    /// Builder: add panels, keyed by their ids.
    #[must_use]
    pub fn with_panels(mut self, panels: impl IntoIterator<Item = PanelData>) -> Self {
        for panel in panels {
            self.insert(panel);
        }
        self
    }

    /// Builder: collapsed flag.
    #[must_use]
    pub fn collapsed(mut self, is_collapsed: bool) -> Self {
        self.is_collapsed = is_collapsed;
        self
    }

    /// Insert or replace a panel, returning the previous placement.
    pub fn insert(&mut self, panel: PanelData) -> Option<PanelData> {
        self.panels.insert(panel.id.clone(), panel)
    }

    /// Remove a panel by id.
    pub fn remove(&mut self, id: &str) -> Option<PanelData> {
        self.panels.remove(id)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&PanelData> {
        self.panels.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.panels.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.panels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    /// Number of grid rows the panels occupy (lowest panel bottom).
    #[must_use]
    pub fn panel_rows(&self) -> u32 {
        self.panels.values().map(PanelData::bottom).max().unwrap_or(0)
    }

    /// First pair of overlapping panels, in id order.
    #[must_use]
    pub fn first_overlap(&self) -> Option<(&PanelData, &PanelData)> {
        let panels: Vec<&PanelData> = self.panels.values().collect();
        for (i, a) in panels.iter().enumerate() {
            for b in &panels[i + 1..] {
                if is_overlapping(a, b) {
                    return Some((*a, *b));
                }
            }
        }
        None
    }

    /// Validate every panel and the no-overlap invariant.
    pub fn validate(&self, row_index: usize, column_count: u32) -> Result<(), LayoutError> {
        for panel in self.panels.values() {
            panel.validate(column_count)?;
        }
        if let Some((first, second)) = self.first_overlap() {
            return Err(LayoutError::Overlap {
                row_index,
                first: first.id.clone(),
                second: second.id.clone(),
            });
        }
        Ok(())
    }
}

/// Locate a panel anywhere in the layout.
#[must_use]
pub fn find_panel<'a>(layout: &'a [GridRowData], id: &str) -> Option<(usize, &'a PanelData)> {
    layout
        .iter()
        .enumerate()
        .find_map(|(row_index, row)| row.get(id).map(|panel| (row_index, panel)))
}

/// Row-by-row structural equality: titles, collapsed flags, panel ids and
/// their cells.
#[must_use]
pub fn is_layout_equal(a: &[GridRowData], b: &[GridRowData]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(row_a, row_b)| {
            row_a.title == row_b.title
                && row_a.is_collapsed == row_b.is_collapsed
                && row_a.panels.len() == row_b.panels.len()
                && row_a.panels.iter().all(|(id, panel)| {
                    row_b
                        .panels
                        .get(id)
                        .is_some_and(|other| is_grid_data_equal(panel, other))
                })
        })
}
