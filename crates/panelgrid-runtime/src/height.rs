#![forbid(unsafe_code)]

//! Container height smoothing.
//!
//! While a panel is dragged or resized the natural content height jumps
//! around as the draft layout changes. Letting the container shrink under
//! the pointer would move the scroll position, so the height may grow
//! immediately but never shrinks until the interaction ends.

/// Height applied to the grid container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ContainerHeight {
    /// Size to content.
    #[default]
    Auto,
    /// Pinned height in pixels.
    Pixels(f64),
}

/// Tracks the rendered container height across interactions.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeightSmoother {
    rendered: f64,
}

impl HeightSmoother {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last height handed to the renderer, in pixels.
    #[must_use]
    pub fn rendered(&self) -> f64 {
        self.rendered
    }

    /// Height to apply for a content height of `natural`.
    pub fn next(&mut self, natural: f64, interacting: bool) -> ContainerHeight {
        let natural = natural.max(0.0);
        if interacting {
            self.rendered = self.rendered.max(natural);
            ContainerHeight::Pixels(self.rendered)
        } else {
            self.rendered = natural;
            ContainerHeight::Auto
        }
    }
}
