#![forbid(unsafe_code)]

//! Row resolver: collision pushing followed by upward compaction.
//!
//! # Algorithm
//!
//! 1. **Placement.** The moved panel (if any) is placed first, exactly at its
//!    requested cell. Every other panel is then visited in canonical order
//!    (row, then column, then id) and pushed straight down until it no
//!    longer collides with anything already placed.
//! 2. **Gravity.** Panels are visited again in canonical order (the moved
//!    panel first among equal rows) and each floats up until the row above
//!    it is blocked by a panel sharing a column, or it reaches row 0.
//!
//! # Invariants
//!
//! 1. The output never contains two overlapping panels.
//! 2. Columns and extents are never changed; only `row` moves.
//! 3. `resolve_grid_row(&resolve_grid_row(r, m), None) == resolve_grid_row(r, m)`.
//! 4. The result depends only on the panel set, not on map iteration or call
//!    history.
//!
//! Gravity only ever moves a panel up to the bottom of the nearest blocker,
//! so a panel never hops over another panel into a gap above it.

use std::cmp::Ordering;

use crate::panel::{GridRowData, PanelData, is_overlapping};

/// Canonical visiting order: row, moved panel first among equal rows, then
/// column, then id.
fn canonical_order(a: &PanelData, b: &PanelData, moved_id: Option<&str>) -> Ordering {
    let a_moved = moved_id == Some(a.id.as_str());
    let b_moved = moved_id == Some(b.id.as_str());
    a.row
        .cmp(&b.row)
        .then_with(|| b_moved.cmp(&a_moved))
        .then_with(|| a.column.cmp(&b.column))
        .then_with(|| a.id.cmp(&b.id))
}

fn columns_intersect(a: &PanelData, b: &PanelData) -> bool {
    a.column < b.right() && b.column < a.right()
}

/// Push `panel` down until it clears every panel in `placed`.
fn push_below(panel: &mut PanelData, placed: &[PanelData]) {
    while let Some(lowest_blocker) = placed
        .iter()
        .filter(|other| is_overlapping(panel, other))
        .map(PanelData::bottom)
        .max()
    {
        panel.row = lowest_blocker;
    }
}

fn place(panels: Vec<PanelData>, moved_id: Option<&str>) -> Vec<PanelData> {
    let mut placed: Vec<PanelData> = Vec::with_capacity(panels.len());
    let (moved, mut rest): (Vec<PanelData>, Vec<PanelData>) = panels
        .into_iter()
        .partition(|panel| moved_id == Some(panel.id.as_str()));
    placed.extend(moved);
    rest.sort_by(|a, b| canonical_order(a, b, None));
    for mut panel in rest {
        push_below(&mut panel, &placed);
        placed.push(panel);
    }
    placed
}

fn compact(panels: &mut [PanelData], moved_id: Option<&str>) {
    panels.sort_by(|a, b| canonical_order(a, b, moved_id));
    for index in 0..panels.len() {
        let panel = &panels[index];
        let floor = panels
            .iter()
            .enumerate()
            .filter(|(other_index, other)| {
                *other_index != index
                    && columns_intersect(panel, other)
                    && other.bottom() <= panel.row
            })
            .map(|(_, other)| other.bottom())
            .max()
            .unwrap_or(0);
        panels[index].row = floor;
    }
}

fn rebuild(row: &GridRowData, panels: Vec<PanelData>) -> GridRowData {
    GridRowData {
        title: row.title.clone(),
        is_collapsed: row.is_collapsed,
        panels: panels
            .into_iter()
            .map(|panel| (panel.id.clone(), panel))
            .collect(),
    }
}

/// Resolve a row into a non-overlapping, gravity-packed arrangement.
///
/// `moved` is a panel with a requested (possibly overlapping) placement. It
/// is inserted into the row, replacing any panel with the same id, and keeps
/// its column and extents; every other panel makes room for it.
#[must_use]
pub fn resolve_grid_row(row: &GridRowData, moved: Option<&PanelData>) -> GridRowData {
    let moved_id = moved.map(|panel| panel.id.as_str());
    let mut panels: Vec<PanelData> = row
        .panels
        .values()
        .filter(|panel| moved_id != Some(panel.id.as_str()))
        .cloned()
        .collect();
    if let Some(moved) = moved {
        panels.push(moved.clone());
    }

    let mut placed = place(panels, moved_id);
    compact(&mut placed, moved_id);
    rebuild(row, placed)
}

/// Gravity pass only. The row must already be free of overlaps.
#[must_use]
pub fn compact_grid_row(row: &GridRowData) -> GridRowData {
    let mut panels: Vec<PanelData> = row.panels.values().cloned().collect();
    compact(&mut panels, None);
    rebuild(row, panels)
}

/// Resolve every row of a layout. Used to normalize layouts that arrive from
/// outside (floating or overlapping panels are repaired, not rejected).
#[must_use]
pub fn resolve_layout(layout: &[GridRowData]) -> Vec<GridRowData> {
    layout.iter().map(|row| resolve_grid_row(row, None)).collect()
}
