#![forbid(unsafe_code)]

//! Pixel geometry of a rendered layout.
//!
//! [`GridMetrics`] holds the client-space rectangle of every row's panel
//! area plus the runtime settings, and answers the two questions the pointer
//! router asks on every move: which row is the preview over, and which grid
//! cell does the preview snap to.
//!
//! Hosts that measure their own DOM can build metrics from measured row
//! rectangles with [`GridMetrics::new`]; [`GridMetrics::compute`] derives
//! them from the layout for hosts that render rows back to back.

use crate::panel::{GridRowData, PanelData};
use crate::settings::RuntimeGridSettings;
use panelgrid_core::geometry::{PixelRect, Point};

/// Kind of pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    /// Move the panel; extents are fixed.
    Drag,
    /// Move the bottom-right corner; origin is fixed.
    Resize,
}

/// Row rectangles and runtime settings for one rendered frame.
#[derive(Debug, Clone, PartialEq)]
pub struct GridMetrics {
    row_rects: Vec<PixelRect>,
    runtime: RuntimeGridSettings,
}

impl GridMetrics {
    /// Metrics from measured row panel-area rectangles (client space).
    #[must_use]
    pub fn new(row_rects: Vec<PixelRect>, runtime: RuntimeGridSettings) -> Self {
        Self { row_rects, runtime }
    }

    /// Metrics for rows stacked top to bottom starting at `origin`.
    ///
    /// Every row after the first is preceded by a header of
    /// `row_header_height` pixels. A collapsed row has an empty panel area;
    /// an expanded row is at least one grid row tall so it can receive
    /// drops. Row areas are separated by one gutter.
    #[must_use]
    pub fn compute(
        layout: &[GridRowData],
        runtime: RuntimeGridSettings,
        origin: Point,
        row_header_height: f64,
    ) -> Self {
        let width = runtime.grid_pixel_width();
        let mut top = origin.y;
        let mut row_rects = Vec::with_capacity(layout.len());
        for (index, row) in layout.iter().enumerate() {
            if index > 0 {
                top += row_header_height;
            }
            let height = if row.is_collapsed {
                0.0
            } else {
                runtime.rows_pixel_height(row.panel_rows().max(1))
            };
            row_rects.push(PixelRect::new(origin.x, top, width, height));
            top += height + runtime.gutter_size;
        }
        Self { row_rects, runtime }
    }

    #[must_use]
    pub fn runtime(&self) -> &RuntimeGridSettings {
        &self.runtime
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_rects.len()
    }

    #[must_use]
    pub fn row_rect(&self, row_index: usize) -> Option<PixelRect> {
        self.row_rects.get(row_index).copied()
    }

    /// Bottom edge of the last row (or `None` for an empty layout).
    #[must_use]
    pub fn content_bottom(&self) -> Option<f64> {
        self.row_rects.last().map(PixelRect::bottom)
    }

    /// Client rectangle of `panel` inside row `row_index`.
    #[must_use]
    pub fn panel_rect(&self, row_index: usize, panel: &PanelData) -> Option<PixelRect> {
        let row = self.row_rects.get(row_index)?;
        let rt = &self.runtime;
        let width = rt.column_pixel_width * f64::from(panel.width)
            + rt.gutter_size * f64::from(panel.width.saturating_sub(1));
        Some(PixelRect::new(
            row.left + f64::from(panel.column) * rt.column_pitch(),
            row.top + f64::from(panel.row) * rt.row_pitch(),
            width,
            rt.rows_pixel_height(panel.height),
        ))
    }

    /// Row whose vertical span overlaps the preview's leading grid row the
    /// most.
    ///
    /// The preview is projected to `[top, top + row_height)`; overlap with a
    /// row is `min(bottom, row.bottom) - max(top, row.top)`. On a tie the
    /// lowest row index wins. Rows with an empty panel area (collapsed) never
    /// receive drops. `None` when no row can.
    #[must_use]
    pub fn target_row(&self, preview: &PixelRect) -> Option<usize> {
        let preview_bottom = preview.top + self.runtime.row_height;
        let mut best: Option<(usize, f64)> = None;
        for (index, row) in self.row_rects.iter().enumerate() {
            if row.is_empty() {
                continue;
            }
            let overlap = row.vertical_overlap(preview.top, preview_bottom);
            match best {
                Some((_, highest)) if overlap <= highest => {}
                _ => best = Some((index, overlap)),
            }
        }
        best.map(|(index, _)| index)
    }

    /// Snap a preview rectangle to grid cells inside row `row_index`.
    ///
    /// Drag moves `current`'s origin to the cell nearest the preview's
    /// top-left corner, with the column clamped to
    /// `[0, column_count - width]`. Resize keeps the origin and moves the
    /// bottom-right corner to the nearest grid line, with extents of at
    /// least one cell. Rows are clamped to `>= 0`.
    #[must_use]
    pub fn grid_cell(
        &self,
        kind: InteractionKind,
        preview: &PixelRect,
        row_index: usize,
        current: &PanelData,
    ) -> Option<PanelData> {
        let row = self.row_rects.get(row_index)?;
        let rt = &self.runtime;
        let (local_x, local_y) = match kind {
            InteractionKind::Drag => (preview.left - row.left, preview.top - row.top),
            InteractionKind::Resize => (preview.right() - row.left, preview.bottom() - row.top),
        };
        let column_limit = match kind {
            InteractionKind::Drag => rt.column_count.saturating_sub(current.width),
            InteractionKind::Resize => rt.column_count,
        };
        let target_column = snap(local_x, rt.column_pitch()).min(i64::from(column_limit));
        let target_row = snap(local_y, rt.row_pitch());

        let mut requested = current.clone();
        match kind {
            InteractionKind::Drag => {
                requested.column = to_u32(target_column);
                requested.row = to_u32(target_row);
            }
            InteractionKind::Resize => {
                requested.width = to_u32(target_column - i64::from(current.column)).max(1);
                requested.height = to_u32(target_row - i64::from(current.row)).max(1);
            }
        }
        Some(requested)
    }
}

/// Nearest grid line for a pixel offset, never negative.
fn snap(offset: f64, pitch: f64) -> i64 {
    if !(pitch > 0.0) || !offset.is_finite() {
        return 0;
    }
    let cells = (offset / pitch).round();
    if cells <= 0.0 {
        0
    } else if cells >= f64::from(u32::MAX) {
        i64::from(u32::MAX)
    } else {
        cells as i64
    }
}

fn to_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GridSettings;

    /// 12 columns of 90px with 10px gutters (pitch 100), rows 40px + 10px.
    fn runtime() -> RuntimeGridSettings {
        let settings = GridSettings::new(10.0, 40.0, 12).expect("valid settings");
        RuntimeGridSettings::for_container(&settings, 1190.0)
    }

    fn two_row_metrics() -> GridMetrics {
        GridMetrics::new(
            vec![
                PixelRect::new(0.0, 0.0, 1190.0, 190.0),
                PixelRect::new(0.0, 250.0, 1190.0, 90.0),
            ],
            runtime(),
        )
    }

    #[test]
    fn panel_rect_uses_pitch() {
        let metrics = two_row_metrics();
        let rect = metrics
            .panel_rect(1, &PanelData::new("p", 1, 2, 3, 2))
            .expect("row exists");
        assert_eq!(rect, PixelRect::new(200.0, 300.0, 290.0, 90.0));
        assert!(metrics.panel_rect(5, &PanelData::new("p", 0, 0, 1, 1)).is_none());
    }

    #[test]
    fn target_row_picks_max_overlap() {
        let metrics = two_row_metrics();
        let over_second = PixelRect::new(0.0, 260.0, 100.0, 40.0);
        assert_eq!(metrics.target_row(&over_second), Some(1));
        let over_first = PixelRect::new(0.0, 120.0, 100.0, 400.0);
        assert_eq!(metrics.target_row(&over_first), Some(0));
    }

    #[test]
    fn target_row_tie_goes_to_lowest_index() {
        // Two identical row spans: equal overlap, the first one wins.
        let metrics = GridMetrics::new(
            vec![
                PixelRect::new(0.0, 0.0, 100.0, 100.0),
                PixelRect::new(0.0, 0.0, 100.0, 100.0),
            ],
            runtime(),
        );
        assert_eq!(metrics.target_row(&PixelRect::new(0.0, 10.0, 10.0, 10.0)), Some(0));
    }

    #[test]
    fn target_row_far_away_still_resolves() {
        let metrics = two_row_metrics();
        // Far above everything: least negative overlap is the first row.
        assert_eq!(
            metrics.target_row(&PixelRect::new(0.0, -1000.0, 10.0, 10.0)),
            Some(0)
        );
        // Far below: the last row is closest.
        assert_eq!(
            metrics.target_row(&PixelRect::new(0.0, 5000.0, 10.0, 10.0)),
            Some(1)
        );
        let empty = GridMetrics::new(Vec::new(), runtime());
        assert_eq!(empty.target_row(&PixelRect::default()), None);
    }

    #[test]
    fn collapsed_rows_never_receive_drops() {
        let rows = vec![
            GridRowData::new("top").with_panels([PanelData::new("p1", 0, 0, 2, 2)]),
            GridRowData::new("hidden")
                .collapsed(true)
                .with_panels([PanelData::new("p2", 0, 0, 2, 2)]),
        ];
        let metrics = GridMetrics::compute(&rows, runtime(), Point::new(0.0, 0.0), 30.0);
        // Far below the collapsed row, which sits at y 130 with no height.
        let below = PixelRect::new(0.0, 400.0, 190.0, 90.0);
        assert_eq!(metrics.target_row(&below), Some(0));

        let all_collapsed = GridMetrics::compute(
            &[GridRowData::new("only").collapsed(true)],
            runtime(),
            Point::new(0.0, 0.0),
            0.0,
        );
        assert_eq!(all_collapsed.target_row(&below), None);
    }

    #[test]
    fn drag_snaps_and_clamps_column() {
        let metrics = two_row_metrics();
        let panel = PanelData::new("p", 0, 0, 4, 2);
        let preview = PixelRect::new(1140.0, 170.0, 390.0, 90.0);
        let cell = metrics
            .grid_cell(InteractionKind::Drag, &preview, 0, &panel)
            .expect("row exists");
        assert_eq!(cell.column, 8, "clamped to column_count - width");
        assert_eq!(cell.row, 3);
        assert_eq!((cell.width, cell.height), (4, 2));

        let left_of_grid = PixelRect::new(-300.0, -80.0, 390.0, 90.0);
        let cell = metrics
            .grid_cell(InteractionKind::Drag, &left_of_grid, 0, &panel)
            .expect("row exists");
        assert_eq!((cell.row, cell.column), (0, 0));
    }

    #[test]
    fn resize_grows_by_column_delta() {
        let metrics = two_row_metrics();
        let panel = PanelData::new("p", 0, 0, 2, 2);
        // Original right edge at 190px; drag it three columns to 490px.
        let preview = PixelRect::from_edges(0.0, 0.0, 490.0, 90.0);
        let cell = metrics
            .grid_cell(InteractionKind::Resize, &preview, 0, &panel)
            .expect("row exists");
        assert_eq!((cell.column, cell.width), (0, 5));
        assert_eq!((cell.row, cell.height), (0, 2));
    }

    #[test]
    fn resize_never_below_one_cell() {
        let metrics = two_row_metrics();
        let panel = PanelData::new("p", 1, 3, 2, 2);
        let inverted = PixelRect::from_edges(300.0, 50.0, 0.0, 0.0);
        let cell = metrics
            .grid_cell(InteractionKind::Resize, &inverted, 0, &panel)
            .expect("row exists");
        assert_eq!((cell.width, cell.height), (1, 1));
    }

    #[test]
    fn resize_clamps_to_grid_edge() {
        let metrics = two_row_metrics();
        let panel = PanelData::new("p", 0, 10, 2, 1);
        let wide = PixelRect::from_edges(1000.0, 0.0, 3000.0, 40.0);
        let cell = metrics
            .grid_cell(InteractionKind::Resize, &wide, 0, &panel)
            .expect("row exists");
        assert_eq!(cell.width, 2);
    }

    #[test]
    fn compute_stacks_rows_with_headers() {
        let rows = vec![
            GridRowData::new("a").with_panels([PanelData::new("x", 0, 0, 1, 3)]),
            GridRowData::new("b").collapsed(true),
            GridRowData::new("c"),
        ];
        let metrics = GridMetrics::compute(&rows, runtime(), Point::new(5.0, 100.0), 30.0);
        assert_eq!(metrics.row_count(), 3);
        assert_eq!(
            metrics.row_rect(0),
            Some(PixelRect::new(5.0, 100.0, 1190.0, 140.0))
        );
        // 100 + 140 + gutter 10 + header 30.
        assert_eq!(metrics.row_rect(1).map(|r| (r.top, r.height)), Some((280.0, 0.0)));
        // 280 + 0 + 10 + 30, empty row is one grid row tall.
        assert_eq!(metrics.row_rect(2).map(|r| (r.top, r.height)), Some((320.0, 40.0)));
        assert_eq!(metrics.content_bottom(), Some(360.0));
    }

    #[test]
    fn snap_handles_degenerate_pitch() {
        assert_eq!(snap(100.0, 0.0), 0);
        assert_eq!(snap(f64::NAN, 10.0), 0);
        assert_eq!(snap(-20.0, 10.0), 0);
        assert_eq!(snap(14.0, 10.0), 1);
        assert_eq!(snap(15.0, 10.0), 2);
    }
}
