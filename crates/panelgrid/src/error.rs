#![forbid(unsafe_code)]

//! panelgrid error model and graceful degradation.
//!
//! Each crate reports its own typed error; [`Error`] unifies them for hosts
//! that prefer one `?`-friendly type. Every variant maps to a
//! [`DegradationAction`] describing how the engine keeps the grid usable
//! when that error occurs.

use std::fmt;

pub use panelgrid_core::PointerError;
pub use panelgrid_layout::{LayoutError, SettingsError};
#[cfg(feature = "runtime")]
pub use panelgrid_runtime::GridConfigError;

// ── Unified Error ───────────────────────────────────────────────────────

/// Top-level error type for panelgrid hosts.
#[derive(Debug)]
pub enum Error {
    /// A pointer event without a usable client position.
    Pointer(PointerError),
    /// A panel or row violates the grid model.
    Layout(LayoutError),
    /// Grid settings that cannot produce a grid.
    Settings(SettingsError),
    /// Engine configuration could not be loaded or is invalid.
    #[cfg(feature = "runtime")]
    Config(GridConfigError),
}

/// Standard result type for panelgrid APIs.
pub type Result<T> = std::result::Result<T, Error>;

// ── Graceful Degradation ────────────────────────────────────────────────

/// What the engine does when an error occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradationAction {
    /// Drop the event; an active interaction stays alive.
    DropEvent,
    /// Clamp and resolve the layout instead of rejecting it.
    NormalizeLayout,
    /// Ignore the request; nothing changes.
    IgnoreRequest,
    /// Mount with the default configuration.
    UseDefaultConfig,
    /// The grid cannot be mounted.
    RefuseMount,
}

impl Error {
    /// Determine the graceful degradation action for this error.
    #[must_use]
    pub fn degradation(&self) -> DegradationAction {
        match self {
            Self::Pointer(
                PointerError::UnsupportedEvent { .. } | PointerError::NoActiveTouch,
            ) => DegradationAction::DropEvent,

            Self::Layout(
                LayoutError::ZeroWidth { .. }
                | LayoutError::ZeroHeight { .. }
                | LayoutError::ExceedsColumns { .. }
                | LayoutError::Overlap { .. },
            ) => DegradationAction::NormalizeLayout,
            Self::Layout(LayoutError::UnknownRow { .. } | LayoutError::UnknownPanel { .. }) => {
                DegradationAction::IgnoreRequest
            }

            Self::Settings(_) => DegradationAction::RefuseMount,

            #[cfg(feature = "runtime")]
            Self::Config(_) => DegradationAction::UseDefaultConfig,
        }
    }

    /// Error type label for metrics and tracing.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Pointer(_) => "pointer",
            Self::Layout(_) => "layout",
            Self::Settings(_) => "settings",
            #[cfg(feature = "runtime")]
            Self::Config(_) => "config",
        }
    }

    /// Whether the grid stays usable after this error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.degradation(), DegradationAction::RefuseMount)
    }
}

// ── Display ─────────────────────────────────────────────────────────────

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pointer(err) => write!(f, "pointer: {err}"),
            Self::Layout(err) => write!(f, "layout: {err}"),
            Self::Settings(err) => write!(f, "settings: {err}"),
            #[cfg(feature = "runtime")]
            Self::Config(err) => write!(f, "config: {err}"),
        }
    }
}

impl fmt::Display for DegradationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DropEvent => write!(f, "drop_event"),
            Self::NormalizeLayout => write!(f, "normalize_layout"),
            Self::IgnoreRequest => write!(f, "ignore_request"),
            Self::UseDefaultConfig => write!(f, "use_default_config"),
            Self::RefuseMount => write!(f, "refuse_mount"),
        }
    }
}

// ── std::error::Error ───────────────────────────────────────────────────

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Pointer(err) => Some(err),
            Self::Layout(err) => Some(err),
            Self::Settings(err) => Some(err),
            #[cfg(feature = "runtime")]
            Self::Config(err) => Some(err),
        }
    }
}

// ── From conversions ────────────────────────────────────────────────────

impl From<PointerError> for Error {
    fn from(err: PointerError) -> Self {
        Self::Pointer(err)
    }
}

impl From<LayoutError> for Error {
    fn from(err: LayoutError) -> Self {
        Self::Layout(err)
    }
}

impl From<SettingsError> for Error {
    fn from(err: SettingsError) -> Self {
        Self::Settings(err)
    }
}

#[cfg(feature = "runtime")]
impl From<GridConfigError> for Error {
    fn from(err: GridConfigError) -> Self {
        Self::Config(err)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────
