//! Editor configuration: snapping, grid display, and page size.
//!
//! Hosts either deserialize an [`EditorConfig`] from JSON or build one from
//! environment variables via [`EditorConfig::from_env`]. Every field has a
//! default, so a partial configuration is always usable.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geom::Size;

pub const DEFAULT_GRID_SIZE: f64 = 20.0;
pub const DEFAULT_CANVAS_WIDTH: f64 = 800.0;
pub const DEFAULT_CANVAS_HEIGHT: f64 = 1200.0;

/// Error returned when configuration input cannot be parsed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid snap sensitivity: {0} (expected weak, medium, or strong)")]
    InvalidSensitivity(String),
    #[error("invalid grid mode: {0} (expected always, never, or edit)")]
    InvalidGridMode(String),
    #[error("invalid boolean for {var}: {value}")]
    InvalidBool { var: String, value: String },
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
}

/// How close an edge must be before it snaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapSensitivity {
    Weak,
    #[default]
    Medium,
    Strong,
}

impl SnapSensitivity {
    /// Snap distance in canvas pixels.
    #[must_use]
    pub fn threshold_px(self) -> f64 {
        match self {
            Self::Weak => 6.0,
            Self::Medium => 12.0,
            Self::Strong => 20.0,
        }
    }
}

impl FromStr for SnapSensitivity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weak" => Ok(Self::Weak),
            "medium" => Ok(Self::Medium),
            "strong" => Ok(Self::Strong),
            _ => Err(ConfigError::InvalidSensitivity(s.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapSettings {
    pub enabled: bool,
    pub sensitivity: SnapSensitivity,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self { enabled: true, sensitivity: SnapSensitivity::Medium }
    }
}

/// When the background grid is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridMode {
    Always,
    Never,
    #[default]
    PanelEditOnly,
}

impl FromStr for GridMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" | "show" => Ok(Self::Always),
            "never" | "hide" => Ok(Self::Never),
            "edit" | "panel_edit_only" => Ok(Self::PanelEditOnly),
            _ => Err(ConfigError::InvalidGridMode(s.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub snap: SnapSettings,
    pub grid: GridMode,
    pub grid_size: f64,
    pub canvas: Size,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap: SnapSettings::default(),
            grid: GridMode::default(),
            grid_size: DEFAULT_GRID_SIZE,
            canvas: Size::new(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT),
        }
    }
}

impl EditorConfig {
    /// Parse host-supplied JSON; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed input or unknown enum values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `PANELBOARD_SNAP_ENABLED`: `true` (default) or `false`
    /// - `PANELBOARD_SNAP_SENSITIVITY`: `weak`, `medium` (default), or `strong`
    /// - `PANELBOARD_GRID`: `always`, `never`, or `edit` (default)
    /// - `PANELBOARD_GRID_SIZE`: default 20
    /// - `PANELBOARD_CANVAS_WIDTH` / `PANELBOARD_CANVAS_HEIGHT`: default 800×1200
    ///
    /// # Errors
    ///
    /// Returns an error when an enum or boolean variable holds an unknown value.
    /// Unparsable numbers fall back to their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        // An unset or non-UTF-8 variable means "use the default".
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from any key lookup; `from_env` with an injectable source.
    ///
    /// # Errors
    ///
    /// See [`EditorConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let enabled = match lookup("PANELBOARD_SNAP_ENABLED") {
            Some(raw) => parse_bool("PANELBOARD_SNAP_ENABLED", &raw)?,
            None => defaults.snap.enabled,
        };
        let sensitivity = match lookup("PANELBOARD_SNAP_SENSITIVITY") {
            Some(raw) => raw.parse()?,
            None => defaults.snap.sensitivity,
        };
        let grid = match lookup("PANELBOARD_GRID") {
            Some(raw) => raw.parse()?,
            None => defaults.grid,
        };

        let number = |key: &str, default: f64| {
            lookup(key).map_or(default, |raw| raw.trim().parse::<f64>().unwrap_or(default))
        };

        Ok(Self {
            snap: SnapSettings { enabled, sensitivity },
            grid,
            grid_size: number("PANELBOARD_GRID_SIZE", defaults.grid_size),
            canvas: Size::new(
                number("PANELBOARD_CANVAS_WIDTH", defaults.canvas.width),
                number("PANELBOARD_CANVAS_HEIGHT", defaults.canvas.height),
            ),
        })
    }
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool { var: var.to_owned(), value: raw.to_owned() }),
    }
}
