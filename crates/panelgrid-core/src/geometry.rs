#![forbid(unsafe_code)]

//! Pixel-space geometric primitives.
//!
//! All values are CSS pixels in client (viewport) coordinates, origin at the
//! top-left of the viewport. Grid-cell coordinates live in `panelgrid-layout`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in client pixels.
///
/// Width and height are allowed to be negative while a resize preview is
/// being dragged past the panel origin; consumers clamp when snapping to the
/// grid.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PixelRect {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl PixelRect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Create a rectangle from its four edges.
    #[inline]
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            width: right - left,
            height: bottom - top,
        }
    }

    /// Right edge.
    #[inline]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge.
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Check if the rectangle has no area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Signed vertical overlap between `[top, bottom)` and this rectangle's
    /// vertical span. Negative when the spans are disjoint.
    #[inline]
    pub fn vertical_overlap(&self, top: f64, bottom: f64) -> f64 {
        bottom.min(self.bottom()) - top.max(self.top)
    }
}

/// Distance from the pointer to each edge of a panel's bounding box,
/// captured when an interaction starts.
///
/// `left`/`top` are positive when the pointer is inside the box, `right`/
/// `bottom` negative. Subtracting an offset from a later pointer position
/// yields where that edge should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointerOffsets {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl PointerOffsets {
    /// Offsets of `pointer` relative to the edges of `rect`.
    #[must_use]
    pub fn between(pointer: Point, rect: &PixelRect) -> Self {
        Self {
            left: pointer.x - rect.left,
            top: pointer.y - rect.top,
            right: pointer.x - rect.right(),
            bottom: pointer.y - rect.bottom(),
        }
    }
}
