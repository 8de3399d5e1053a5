#![forbid(unsafe_code)]

//! Engine configuration as data.
//!
//! [`GridEngineConfig`] gathers everything a host tunes when mounting a
//! grid: the grid settings, autoscroll tuning, the mobile breakpoint, the
//! row header height and the initial access mode. With the `config`
//! feature it loads from TOML or JSON.
//!
//! ```toml
//! mobileBreakpoint = 640.0
//! rowHeaderHeight = 32.0
//!
//! [grid]
//! gutterSize = 8.0
//! rowHeight = 26.0
//! columnCount = 48
//!
//! [autoscroll]
//! stepPx = 40.0
//! ```
//!
//! Every field has a default, so partial files only override what they
//! name.

#[cfg(feature = "config")]
use std::path::Path;

use panelgrid_layout::{AccessMode, DEFAULT_MOBILE_BREAKPOINT, GridSettings};

use crate::autoscroll::AutoscrollConfig;

/// Everything needed to mount a grid.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default, rename_all = "camelCase"))]
pub struct GridEngineConfig {
    pub grid: GridSettings,
    pub autoscroll: AutoscrollConfig,
    /// Container width below which the grid renders as a single column and
    /// refuses interactions.
    pub mobile_breakpoint: f64,
    /// Height of the header drawn above every row except the first.
    pub row_header_height: f64,
    pub access_mode: AccessMode,
}

impl Default for GridEngineConfig {
    fn default() -> Self {
        Self {
            grid: GridSettings::default(),
            autoscroll: AutoscrollConfig::default(),
            mobile_breakpoint: DEFAULT_MOBILE_BREAKPOINT,
            row_header_height: 0.0,
            access_mode: AccessMode::Edit,
        }
    }
}

impl GridEngineConfig {
    /// Defaults with the given grid settings.
    #[must_use]
    pub fn with_grid(grid: GridSettings) -> Self {
        Self {
            grid,
            ..Self::default()
        }
    }

    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, GridConfigError> {
        toml::from_str(s).map_err(GridConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, GridConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(GridConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, GridConfigError> {
        serde_json::from_str(s).map_err(GridConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, GridConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(GridConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters.
    ///
    /// Returns a list of problems. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.grid.validate();
        errors.extend(self.autoscroll.validate());
        if !(self.mobile_breakpoint.is_finite() && self.mobile_breakpoint >= 0.0) {
            errors.push(format!(
                "mobileBreakpoint must be non-negative, got {}",
                self.mobile_breakpoint
            ));
        }
        if !(self.row_header_height.is_finite() && self.row_header_height >= 0.0) {
            errors.push(format!(
                "rowHeaderHeight must be non-negative, got {}",
                self.row_header_height
            ));
        }
        errors
    }

    /// `self` if valid, otherwise every problem found.
    pub fn validated(self) -> Result<Self, GridConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(GridConfigError::Validation(errors))
        }
    }
}

/// Errors that can occur when loading an engine configuration.
#[derive(Debug)]
pub enum GridConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for GridConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for GridConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = GridEngineConfig::default();
        assert!(config.validate().is_empty());
        assert_eq!(config.mobile_breakpoint, 768.0);
        assert_eq!(config.autoscroll.interval_ms, 100);
    }

    #[test]
    fn multiple_validation_errors_collected() {
        let mut config = GridEngineConfig::default();
        config.grid.column_count = 0;
        config.autoscroll.step_px = 0.0;
        config.row_header_height = -1.0;
        let errors = config.validate();
        assert_eq!(errors.len(), 3, "{errors:?}");

        let err = config.validated().expect_err("invalid config");
        assert!(err.to_string().starts_with("validation errors: "));
    }

    #[cfg(feature = "config")]
    #[test]
    fn partial_toml_preserves_defaults() {
        let config = GridEngineConfig::from_toml_str(
            r#"
            rowHeaderHeight = 32.0
            accessMode = "VIEW"

            [grid]
            columnCount = 12

            [autoscroll]
            stepPx = 40.0
            "#,
        )
        .expect("valid toml");
        assert_eq!(config.grid.column_count, 12);
        assert_eq!(config.grid.row_height, 26.0);
        assert_eq!(config.autoscroll.step_px, 40.0);
        assert_eq!(config.autoscroll.interval_ms, 100);
        assert_eq!(config.row_header_height, 32.0);
        assert_eq!(config.access_mode, AccessMode::View);
    }

    #[cfg(feature = "config")]
    #[test]
    fn json_round_trips() {
        let config = GridEngineConfig {
            mobile_breakpoint: 500.0,
            ..GridEngineConfig::default()
        };
        let json = serde_json::to_string(&config).expect("serializable");
        assert!(json.contains("\"mobileBreakpoint\":500.0"));
        assert_eq!(GridEngineConfig::from_json_str(&json).expect("valid json"), config);
    }

    #[cfg(feature = "config")]
    #[test]
    fn loads_from_files() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[grid]\ngutterSize = 4.0").expect("write");
        let config = GridEngineConfig::from_toml_file(file.path()).expect("valid file");
        assert_eq!(config.grid.gutter_size, 4.0);

        let missing = GridEngineConfig::from_json_file("/definitely/not/here.json");
        assert!(matches!(missing, Err(GridConfigError::Io(_))));
    }

    #[cfg(feature = "config")]
    #[test]
    fn parse_errors_are_typed() {
        assert!(matches!(
            GridEngineConfig::from_toml_str("grid = 3"),
            Err(GridConfigError::Toml(_))
        ));
        assert!(matches!(
            GridEngineConfig::from_json_str("{"),
            Err(GridConfigError::Json(_))
        ));
    }
}
