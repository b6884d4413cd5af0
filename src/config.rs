//! Configuration for the tracking pipeline.
//!
//! Loaded from a TOML file; every field has a default so an empty file (or
//! no file at all) yields a working configuration for the standard bench
//! setup. Defaults mirror the values the rig has run with.

use crate::error::{Result, TrackError};
use crate::types::Polarity;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct TrackConfig {
    /// Camera / frame source settings
    #[serde(default)]
    pub camera: CameraConfig,

    /// Region-of-interest geometry
    #[serde(default)]
    pub roi: RoiConfig,

    /// Feature locator settings
    #[serde(default)]
    pub locator: LocatorConfig,

    /// Proportional controller settings
    #[serde(default)]
    pub controller: ControllerConfig,

    /// Display window settings
    #[serde(default)]
    pub display: DisplayConfig,

    /// Operator interaction settings
    #[serde(default)]
    pub ui: UiConfig,

    /// Output file settings
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_camera_width() -> u32 {
    640
}

fn default_camera_height() -> u32 {
    480
}

/// Frame source settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CameraConfig {
    /// Frame width in pixels
    #[serde(default = "default_camera_width")]
    pub width: u32,

    /// Frame height in pixels
    #[serde(default = "default_camera_height")]
    pub height: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: default_camera_width(),
            height: default_camera_height(),
        }
    }
}

fn default_roi_size() -> u32 {
    100
}

/// Region-of-interest geometry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoiConfig {
    /// ROI width in pixels
    #[serde(default = "default_roi_size")]
    pub width: u32,

    /// ROI height in pixels
    #[serde(default = "default_roi_size")]
    pub height: u32,
}

impl Default for RoiConfig {
    fn default() -> Self {
        Self {
            width: default_roi_size(),
            height: default_roi_size(),
        }
    }
}

fn default_blur_sigma() -> f32 {
    9.0
}

/// Feature locator settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocatorConfig {
    /// Gaussian smoothing sigma applied before the extremum scan
    #[serde(default = "default_blur_sigma")]
    pub blur_sigma: f32,

    /// Which intensity extremum marks the feature
    #[serde(default)]
    pub polarity: Polarity,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            blur_sigma: default_blur_sigma(),
            polarity: Polarity::default(),
        }
    }
}

fn default_limit_radius() -> f64 {
    50.0
}

fn default_max_volts() -> f64 {
    0.01
}

fn default_emit_every() -> u32 {
    2
}

/// Proportional controller settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControllerConfig {
    /// Pixel offset at which the command reaches full scale
    #[serde(default = "default_limit_radius")]
    pub limit_radius: f64,

    /// Voltage magnitude at full-scale offset
    #[serde(default = "default_max_volts")]
    pub max_volts: f64,

    /// Emit one command every this many processing cycles
    #[serde(default = "default_emit_every")]
    pub emit_every: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            limit_radius: default_limit_radius(),
            max_volts: default_max_volts(),
            emit_every: default_emit_every(),
        }
    }
}

fn default_display_width() -> u32 {
    640
}

fn default_display_height() -> u32 {
    480
}

fn default_poll_ms() -> u64 {
    25
}

/// Display window settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DisplayConfig {
    /// Window width in pixels
    #[serde(default = "default_display_width")]
    pub width: u32,

    /// Window height in pixels
    #[serde(default = "default_display_height")]
    pub height: u32,

    /// UI loop period in milliseconds (render and key poll cadence)
    #[serde(default = "default_poll_ms")]
    pub poll_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: default_display_width(),
            height: default_display_height(),
            poll_ms: default_poll_ms(),
        }
    }
}

fn default_nudge_step() -> i32 {
    10
}

/// Operator interaction settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UiConfig {
    /// ROI anchor displacement per nudge key press, in pixels
    #[serde(default = "default_nudge_step")]
    pub nudge_step: i32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            nudge_step: default_nudge_step(),
        }
    }
}

fn default_trajectory_path() -> PathBuf {
    PathBuf::from("trajectory.txt")
}

fn default_capture_path() -> PathBuf {
    PathBuf::from("capture.y4m")
}

fn default_capture_fps() -> u32 {
    24
}

/// Output file settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Trajectory record path
    #[serde(default = "default_trajectory_path")]
    pub trajectory_path: PathBuf,

    /// Annotated capture clip path
    #[serde(default = "default_capture_path")]
    pub capture_path: PathBuf,

    /// Nominal frame rate stamped on the capture clip
    #[serde(default = "default_capture_fps")]
    pub capture_fps: u32,

    /// Stop after this many frames (0 = unlimited)
    #[serde(default)]
    pub max_frames: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            trajectory_path: default_trajectory_path(),
            capture_path: default_capture_path(),
            capture_fps: default_capture_fps(),
            max_frames: 0,
        }
    }
}

impl TrackConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| TrackError::InvalidConfig {
            message: format!("{}: {e}", path.display()),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| TrackError::InvalidConfig {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints the type system cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(TrackError::InvalidConfig {
                message: "camera resolution must be non-zero".into(),
            });
        }
        if self.roi.width == 0 || self.roi.height == 0 {
            return Err(TrackError::InvalidConfig {
                message: "roi dimensions must be non-zero".into(),
            });
        }
        if self.locator.blur_sigma <= 0.0 {
            return Err(TrackError::InvalidConfig {
                message: format!("blur_sigma must be positive, got {}", self.locator.blur_sigma),
            });
        }
        if self.controller.limit_radius <= 0.0 {
            return Err(TrackError::InvalidConfig {
                message: format!(
                    "limit_radius must be positive, got {}",
                    self.controller.limit_radius
                ),
            });
        }
        if self.controller.max_volts < 0.0 {
            return Err(TrackError::InvalidConfig {
                message: format!(
                    "max_volts must be non-negative, got {}",
                    self.controller.max_volts
                ),
            });
        }
        if self.controller.emit_every == 0 {
            return Err(TrackError::InvalidConfig {
                message: "emit_every must be at least 1".into(),
            });
        }
        if self.display.width == 0 || self.display.height == 0 {
            return Err(TrackError::InvalidConfig {
                message: "display resolution must be non-zero".into(),
            });
        }
        if self.output.capture_fps == 0 {
            return Err(TrackError::InvalidConfig {
                message: "capture_fps must be at least 1".into(),
            });
        }
        Ok(())
    }
}
