//! Tunable constants for band assessment.

use serde::{Deserialize, Serialize};
use std::path::Path;

pub const REQUIRED_STUDY_KIND: &str = "Band Assessment";
const LOCATOR_WINDOW_WIDTH: f64 = 100.0;
const LOCATOR_WINDOW_CENTER: f64 = 0.0;
const MAX_CENTER_DEVIATION_PX: usize = 20;
const DIAMETER_THRESHOLD: f64 = 250.0;
const SMALL_PHANTOM_RADIUS_PX: usize = 233;
const LARGE_PHANTOM_RADIUS_PX: usize = 220;
const FALLBACK_RADIUS_PX: usize = 50;
const SMOOTHING_FACTOR: f64 = 3.0;
const PLOT_X_MAX: f64 = 250.0;
const PLOT_Y_RANGE: (f64, f64) = (-5.0, 20.0);

/// Configuration parameters for phantom analysis.
///
/// Controls the study-kind marker, the locator's pre-processing window and
/// sanity bounds, the two standard phantom sizes, and the plot ranges used
/// when rendering the diagnostic curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandConfig {
    pub required_study_kind: String,
    pub locator_window_width: f64,
    pub locator_window_center: f64,
    pub max_center_deviation_px: usize,
    /// Measured diameters below this classify as the small phantom.
    pub diameter_threshold: f64,
    pub small_phantom_radius_px: usize,
    pub large_phantom_radius_px: usize,
    pub fallback_radius_px: usize,
    pub smoothing_factor: f64,
    pub plot_x_max: f64,
    pub plot_y_range: (f64, f64),
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            required_study_kind: REQUIRED_STUDY_KIND.to_string(),
            locator_window_width: LOCATOR_WINDOW_WIDTH,
            locator_window_center: LOCATOR_WINDOW_CENTER,
            max_center_deviation_px: MAX_CENTER_DEVIATION_PX,
            diameter_threshold: DIAMETER_THRESHOLD,
            small_phantom_radius_px: SMALL_PHANTOM_RADIUS_PX,
            large_phantom_radius_px: LARGE_PHANTOM_RADIUS_PX,
            fallback_radius_px: FALLBACK_RADIUS_PX,
            smoothing_factor: SMOOTHING_FACTOR,
            plot_x_max: PLOT_X_MAX,
            plot_y_range: PLOT_Y_RANGE,
        }
    }
}

/// Errors that can occur while loading a [`BandConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("radius {0} must be positive")]
    ZeroRadius(&'static str),
}

impl BandConfig {
    /// Loads a config from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.small_phantom_radius_px == 0 {
            return Err(ConfigError::ZeroRadius("small_phantom_radius_px"));
        }
        if self.large_phantom_radius_px == 0 {
            return Err(ConfigError::ZeroRadius("large_phantom_radius_px"));
        }
        if self.fallback_radius_px == 0 {
            return Err(ConfigError::ZeroRadius("fallback_radius_px"));
        }
        Ok(())
    }
}
