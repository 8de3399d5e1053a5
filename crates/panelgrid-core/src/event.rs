#![forbid(unsafe_code)]

//! Canonical pointer event types.
//!
//! Hosts translate their native mouse and touch events into [`PointerEvent`]
//! before handing them to the runtime. All events derive `Clone` and
//! `PartialEq` for use in tests and recorded traces.
//!
//! # Design Notes
//!
//! - Coordinates are client (viewport) pixels, matching `clientX`/`clientY`.
//! - A touch event carries every active touch point; only the first one is
//!   used for positioning, and more than one at interaction start means the
//!   gesture is not a drag.
//! - Events the host could not classify are kept as
//!   [`PointerEvent::Unsupported`] so that a wiring bug surfaces as an error
//!   at position extraction instead of being silently dropped.

use bitflags::bitflags;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Canonical pointer event.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PointerEvent {
    /// A mouse event.
    Mouse(MouseEvent),

    /// A touch event.
    Touch(TouchEvent),

    /// An event of a type the engine does not understand.
    Unsupported {
        /// The host's name for the event type, for diagnostics.
        kind: String,
    },
}

/// A mouse event.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MouseEvent {
    /// Down, move or up.
    pub phase: MousePhase,

    /// Pointer position in client coordinates.
    pub client: Point,

    /// The button that changed state (meaningful for down/up).
    pub button: MouseButton,

    /// Buttons held while the event fired.
    pub buttons: Buttons,
}

impl MouseEvent {
    /// Create a primary-button mouse event at `(x, y)`.
    #[must_use]
    pub const fn new(phase: MousePhase, x: f64, y: f64) -> Self {
        Self {
            phase,
            client: Point::new(x, y),
            button: MouseButton::Primary,
            buttons: Buttons::PRIMARY,
        }
    }

    /// Set the button that changed state.
    #[must_use]
    pub const fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }

    /// Set the held-buttons mask.
    #[must_use]
    pub const fn with_buttons(mut self, buttons: Buttons) -> Self {
        self.buttons = buttons;
        self
    }
}

/// Phase of a mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MousePhase {
    Down,
    Move,
    Up,
}

/// Mouse button identifiers, following the DOM `button` numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MouseButton {
    /// Usually the left button.
    Primary,
    /// Usually the wheel button.
    Auxiliary,
    /// Usually the right button.
    Secondary,
}

bitflags! {
    /// Buttons held during a mouse event, following the DOM `buttons` mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct Buttons: u8 {
        const NONE      = 0b000;
        const PRIMARY   = 0b001;
        const SECONDARY = 0b010;
        const AUXILIARY = 0b100;
    }
}

impl Default for Buttons {
    fn default() -> Self {
        Self::NONE
    }
}

/// A touch event.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TouchEvent {
    /// Start, move, end or cancel.
    pub phase: TouchPhase,

    /// Active touch points in client coordinates. Empty on the final
    /// `End` of a gesture.
    pub touches: Vec<Point>,
}

impl TouchEvent {
    /// Create a single-finger touch event at `(x, y)`.
    #[must_use]
    pub fn single(phase: TouchPhase, x: f64, y: f64) -> Self {
        Self {
            phase,
            touches: vec![Point::new(x, y)],
        }
    }
}

/// Phase of a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

impl PointerEvent {
    /// Shorthand for a primary-button mouse event.
    #[must_use]
    pub const fn mouse(phase: MousePhase, x: f64, y: f64) -> Self {
        Self::Mouse(MouseEvent::new(phase, x, y))
    }

    /// Shorthand for a single-finger touch event.
    #[must_use]
    pub fn touch(phase: TouchPhase, x: f64, y: f64) -> Self {
        Self::Touch(TouchEvent::single(phase, x, y))
    }

    /// Client position of the pointer.
    ///
    /// Mouse events report their own position; touch events report the
    /// first active touch.
    ///
    /// # Errors
    ///
    /// [`PointerError::UnsupportedEvent`] for events that are neither mouse
    /// nor touch, and [`PointerError::NoActiveTouch`] for touch events
    /// without any touch point.
    pub fn client_position(&self) -> Result<Point, PointerError> {
        match self {
            Self::Mouse(mouse) => Ok(mouse.client),
            Self::Touch(touch) => touch
                .touches
                .first()
                .copied()
                .ok_or(PointerError::NoActiveTouch),
            Self::Unsupported { kind } => Err(PointerError::UnsupportedEvent { kind: kind.clone() }),
        }
    }

    /// More than one simultaneous touch point.
    #[must_use]
    pub fn is_multi_touch(&self) -> bool {
        matches!(self, Self::Touch(touch) if touch.touches.len() > 1)
    }

    /// Whether the primary button drives this event: any touch, the
    /// changed button for mouse down and up, and the held-buttons mask for
    /// mouse moves.
    #[must_use]
    pub fn is_primary(&self) -> bool {
        match self {
            Self::Mouse(mouse) => match mouse.phase {
                MousePhase::Move => mouse.buttons.contains(Buttons::PRIMARY),
                MousePhase::Down | MousePhase::Up => mouse.button == MouseButton::Primary,
            },
            Self::Touch(_) => true,
            Self::Unsupported { .. } => false,
        }
    }
}

/// Pointer extraction errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerError {
    /// The event is neither a mouse nor a touch event.
    UnsupportedEvent { kind: String },
    /// A touch event arrived without any touch point.
    NoActiveTouch,
}

impl fmt::Display for PointerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedEvent { kind } => {
                write!(f, "unsupported pointer event type `{kind}`")
            }
            Self::NoActiveTouch => write!(f, "touch event has no active touch point"),
        }
    }
}

impl std::error::Error for PointerError {}
