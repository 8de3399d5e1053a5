#![forbid(unsafe_code)]

//! Grid settings supplied by the host and the runtime geometry derived from
//! them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Container width (px) below which the grid switches to mobile view.
pub const DEFAULT_MOBILE_BREAKPOINT: f64 = 768.0;

/// Whether interactions are permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessMode {
    /// Panels can be dragged and resized.
    #[default]
    Edit,
    /// Read-only: interactions are refused.
    View,
}

/// Static grid geometry supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridSettings {
    /// Gap between columns and between grid rows, in pixels.
    pub gutter_size: f64,
    /// Height of one grid row, in pixels.
    pub row_height: f64,
    /// Number of columns.
    pub column_count: u32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            gutter_size: 8.0,
            row_height: 26.0,
            column_count: 48,
        }
    }
}

impl GridSettings {
    /// Create validated settings.
    pub fn new(gutter_size: f64, row_height: f64, column_count: u32) -> Result<Self, SettingsError> {
        let settings = Self {
            gutter_size,
            row_height,
            column_count,
        };
        settings.check()?;
        Ok(settings)
    }

    /// First violated constraint, if any.
    pub fn check(&self) -> Result<(), SettingsError> {
        if self.column_count == 0 {
            return Err(SettingsError::ZeroColumns);
        }
        if !(self.row_height.is_finite() && self.row_height > 0.0) {
            return Err(SettingsError::InvalidRowHeight {
                row_height: self.row_height,
            });
        }
        if !(self.gutter_size.is_finite() && self.gutter_size >= 0.0) {
            return Err(SettingsError::InvalidGutter {
                gutter_size: self.gutter_size,
            });
        }
        Ok(())
    }

    /// Validate all fields.
    ///
    /// Returns a list of problems. An empty list means the settings are
    /// valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.column_count == 0 {
            errors.push("grid.columnCount must be at least 1".to_string());
        }
        if !(self.row_height.is_finite() && self.row_height > 0.0) {
            errors.push(format!(
                "grid.rowHeight must be a positive number, got {}",
                self.row_height
            ));
        }
        if !(self.gutter_size.is_finite() && self.gutter_size >= 0.0) {
            errors.push(format!(
                "grid.gutterSize must be non-negative, got {}",
                self.gutter_size
            ));
        }
        errors
    }

    /// Vertical pitch of one grid row including its gutter.
    #[inline]
    #[must_use]
    pub fn row_pitch(&self) -> f64 {
        self.row_height + self.gutter_size
    }
}

/// Settings plus the column width derived from the current container
/// width. Recomputed whenever the container resizes; read-only otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuntimeGridSettings {
    pub gutter_size: f64,
    pub row_height: f64,
    pub column_count: u32,
    /// Width of one column in pixels (never negative).
    pub column_pixel_width: f64,
}

impl RuntimeGridSettings {
    /// Derive runtime geometry for a container `container_width` pixels
    /// wide.
    #[must_use]
    pub fn for_container(settings: &GridSettings, container_width: f64) -> Self {
        let columns = settings.column_count.max(1);
        let gutters = settings.gutter_size * f64::from(columns - 1);
        let column_pixel_width = ((container_width - gutters) / f64::from(columns)).max(0.0);
        Self {
            gutter_size: settings.gutter_size,
            row_height: settings.row_height,
            column_count: columns,
            column_pixel_width,
        }
    }

    /// Horizontal pitch of one column including its gutter.
    #[inline]
    #[must_use]
    pub fn column_pitch(&self) -> f64 {
        self.column_pixel_width + self.gutter_size
    }

    /// Vertical pitch of one grid row including its gutter.
    #[inline]
    #[must_use]
    pub fn row_pitch(&self) -> f64 {
        self.row_height + self.gutter_size
    }

    /// Total pixel width of the grid.
    #[must_use]
    pub fn grid_pixel_width(&self) -> f64 {
        self.column_pixel_width * f64::from(self.column_count)
            + self.gutter_size * f64::from(self.column_count.saturating_sub(1))
    }

    /// Pixel height of `rows` grid rows (gutters only between rows).
    #[must_use]
    pub fn rows_pixel_height(&self, rows: u32) -> f64 {
        if rows == 0 {
            return 0.0;
        }
        self.row_height * f64::from(rows) + self.gutter_size * f64::from(rows - 1)
    }
}

/// Invalid grid settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingsError {
    /// `column_count` is zero.
    ZeroColumns,
    /// `row_height` is zero, negative or not finite.
    InvalidRowHeight { row_height: f64 },
    /// `gutter_size` is negative or not finite.
    InvalidGutter { gutter_size: f64 },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroColumns => write!(f, "grid must have at least one column"),
            Self::InvalidRowHeight { row_height } => {
                write!(f, "row height must be positive, got {row_height}")
            }
            Self::InvalidGutter { gutter_size } => {
                write!(f, "gutter size must be non-negative, got {gutter_size}")
            }
        }
    }
}

impl std::error::Error for SettingsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_width_accounts_for_gutters() {
        let settings = GridSettings::new(10.0, 20.0, 12).expect("valid settings");
        let runtime = RuntimeGridSettings::for_container(&settings, 1220.0);
        assert_eq!(runtime.column_pixel_width, 92.5);
        assert_eq!(runtime.column_pitch(), 102.5);
        assert_eq!(runtime.grid_pixel_width(), 1220.0);
    }

    #[test]
    fn narrow_container_never_goes_negative() {
        let runtime = RuntimeGridSettings::for_container(&GridSettings::default(), 10.0);
        assert_eq!(runtime.column_pixel_width, 0.0);
    }

    #[test]
    fn rows_height_has_inner_gutters_only() {
        let settings = GridSettings::new(8.0, 26.0, 12).expect("valid settings");
        let runtime = RuntimeGridSettings::for_container(&settings, 500.0);
        assert_eq!(runtime.rows_pixel_height(0), 0.0);
        assert_eq!(runtime.rows_pixel_height(1), 26.0);
        assert_eq!(runtime.rows_pixel_height(3), 26.0 * 3.0 + 16.0);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        assert_eq!(GridSettings::new(8.0, 20.0, 0), Err(SettingsError::ZeroColumns));
        assert!(matches!(
            GridSettings::new(8.0, 0.0, 12),
            Err(SettingsError::InvalidRowHeight { .. })
        ));
        assert!(matches!(
            GridSettings::new(-1.0, 20.0, 12),
            Err(SettingsError::InvalidGutter { .. })
        ));
    }

    #[test]
    fn validate_collects_every_problem() {
        let settings = GridSettings {
            gutter_size: f64::NAN,
            row_height: -3.0,
            column_count: 0,
        };
        assert_eq!(settings.validate().len(), 3);
        assert!(GridSettings::default().validate().is_empty());
    }

    #[test]
    fn settings_deserialize_with_defaults() {
        let settings: GridSettings =
            serde_json::from_str(r#"{"columnCount": 12}"#).expect("parse settings");
        assert_eq!(settings.column_count, 12);
        assert_eq!(settings.gutter_size, GridSettings::default().gutter_size);
    }

    #[test]
    fn access_mode_wire_names() {
        assert_eq!(
            serde_json::to_string(&AccessMode::View).expect("serialize"),
            "\"VIEW\""
        );
        assert_eq!(AccessMode::default(), AccessMode::Edit);
    }
}
