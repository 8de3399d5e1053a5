#![forbid(unsafe_code)]

//! Edge autoscroll while a panel is dragged near the top or bottom of the
//! viewport.
//!
//! The controller does not own a timer. The host calls
//! [`AutoscrollController::tick`] from its frame or interval callback; each
//! tick applies one fixed scroll step per full interval elapsed since the
//! previous step.
//!
//! # Invariants
//!
//! 1. At most one scroll interval is active.
//! 2. Starting while already scrolling is a no-op, even in the other
//!    direction; the interval must be stopped first.
//! 3. No scrolling past the top or bottom of the scroll container.

use std::time::Duration;

use panelgrid_layout::InteractionKind;
use tracing::debug;
use web_time::Instant;

/// The scroll container the grid lives in.
pub trait ScrollViewport {
    /// Visible height in pixels.
    fn viewport_height(&self) -> f64;
    /// Current scroll offset from the top.
    fn scroll_top(&self) -> f64;
    /// Total scrollable content height.
    fn scroll_height(&self) -> f64;
    /// Scroll by `dy` pixels (negative scrolls up).
    fn scroll_by(&mut self, dy: f64);
}

/// Autoscroll tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default, rename_all = "camelCase"))]
pub struct AutoscrollConfig {
    /// Height of the trigger band at each edge, as a percentage of the
    /// viewport height.
    pub edge_band_percent: f64,
    /// Time between scroll steps.
    pub interval_ms: u64,
    /// Pixels scrolled per step.
    pub step_px: f64,
}

impl Default for AutoscrollConfig {
    fn default() -> Self {
        Self {
            edge_band_percent: 5.0,
            interval_ms: 100,
            step_px: 50.0,
        }
    }
}

impl AutoscrollConfig {
    /// Problems with these settings; empty when valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !(self.edge_band_percent > 0.0 && self.edge_band_percent < 50.0) {
            errors.push(format!(
                "autoscroll.edgeBandPercent must be in (0, 50), got {}",
                self.edge_band_percent
            ));
        }
        if self.interval_ms == 0 {
            errors.push("autoscroll.intervalMs must be at least 1".to_string());
        }
        if !(self.step_px.is_finite() && self.step_px > 0.0) {
            errors.push(format!(
                "autoscroll.stepPx must be positive, got {}",
                self.step_px
            ));
        }
        errors
    }
}

/// Scroll direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ScrollInterval {
    direction: ScrollDirection,
    last_step: Instant,
}

/// Drives viewport scrolling from the pointer's vertical position.
#[derive(Debug, Clone)]
pub struct AutoscrollController {
    config: AutoscrollConfig,
    active: Option<ScrollInterval>,
}

impl AutoscrollController {
    #[must_use]
    pub fn new(config: AutoscrollConfig) -> Self {
        Self {
            config,
            active: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AutoscrollConfig {
        &self.config
    }

    /// Direction of the running interval, if any.
    #[must_use]
    pub fn direction(&self) -> Option<ScrollDirection> {
        self.active.map(|interval| interval.direction)
    }

    #[must_use]
    pub fn is_scrolling(&self) -> bool {
        self.active.is_some()
    }

    /// React to a pointer move at `client_y`: start scrolling inside an edge
    /// band, stop outside of it. Resize interactions never scroll up.
    pub fn update(
        &mut self,
        client_y: f64,
        kind: InteractionKind,
        viewport: &impl ScrollViewport,
        now: Instant,
    ) {
        let height = viewport.viewport_height();
        if !(height > 0.0) {
            self.stop();
            return;
        }
        let percentage = 100.0 * client_y / height;
        let at_top = viewport.scroll_top() <= 0.0;
        let at_bottom = height + viewport.scroll_top() >= viewport.scroll_height();
        let band = self.config.edge_band_percent;

        let direction = if kind != InteractionKind::Resize && percentage < band && !at_top {
            Some(ScrollDirection::Up)
        } else if percentage > 100.0 - band && !at_bottom {
            Some(ScrollDirection::Down)
        } else {
            None
        };

        match direction {
            Some(direction) => self.start(direction, now),
            None => self.stop(),
        }
    }

    /// Begin scrolling. No-op when an interval is already running.
    pub fn start(&mut self, direction: ScrollDirection, now: Instant) {
        if self.active.is_some() {
            return;
        }
        debug!(?direction, "autoscroll started");
        self.active = Some(ScrollInterval {
            direction,
            last_step: now,
        });
    }

    /// Stop scrolling. No-op when idle.
    pub fn stop(&mut self) {
        if let Some(interval) = self.active.take() {
            debug!(direction = ?interval.direction, "autoscroll stopped");
        }
    }

    /// Apply the steps due at `now`. Returns the signed distance scrolled.
    ///
    /// Steps that would run past the top or bottom are clipped, and
    /// reaching an edge stops the interval.
    pub fn tick(&mut self, now: Instant, viewport: &mut impl ScrollViewport) -> f64 {
        let Some(mut interval) = self.active else {
            return 0.0;
        };
        let period = Duration::from_millis(self.config.interval_ms.max(1));
        let mut scrolled = 0.0;
        while now.saturating_duration_since(interval.last_step) >= period {
            interval.last_step += period;
            let room = match interval.direction {
                ScrollDirection::Up => viewport.scroll_top().max(0.0),
                ScrollDirection::Down => (viewport.scroll_height()
                    - viewport.viewport_height()
                    - viewport.scroll_top())
                .max(0.0),
            };
            let step = self.config.step_px.min(room);
            if step <= 0.0 {
                self.active = None;
                return scrolled;
            }
            let delta = match interval.direction {
                ScrollDirection::Up => -step,
                ScrollDirection::Down => step,
            };
            viewport.scroll_by(delta);
            scrolled += delta;
        }
        self.active = Some(interval);
        scrolled
    }
}

impl Default for AutoscrollController {
    fn default() -> Self {
        Self::new(AutoscrollConfig::default())
    }
}
