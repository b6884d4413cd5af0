//! Core value types shared across the pipeline.

use serde::Deserialize;

/// The frame coordinate of the located feature, in full-frame space.
///
/// Recomputed every processing cycle; never persisted across cycles except
/// implicitly through the ROI anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedPosition {
    /// X coordinate in full-frame pixels
    pub x: u32,
    /// Y coordinate in full-frame pixels
    pub y: u32,
    /// Intensity of the extremum (after smoothing)
    pub value: u8,
}

impl TrackedPosition {
    /// Signed offset of this position from an image center, per axis.
    ///
    /// Positive x means the feature is right of center, positive y below.
    pub fn offset_from(&self, center: (u32, u32)) -> (i32, i32) {
        (
            self.x as i32 - center.0 as i32,
            self.y as i32 - center.1 as i32,
        )
    }
}

/// A pair of bounded voltages, one per steering axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlCommand {
    /// Horizontal-axis voltage (channel 1; positive steers right)
    pub x_volts: f64,
    /// Vertical-axis voltage (channel 0; positive steers down)
    pub y_volts: f64,
}

impl ControlCommand {
    /// The neutral command written whenever the actuator is disabled.
    pub const ZERO: Self = Self {
        x_volts: 0.0,
        y_volts: 0.0,
    };
}

/// Which intensity extremum marks the tracked feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// Track the darkest pixel (e.g. absorbing particle on bright field)
    #[default]
    Dark,
    /// Track the brightest pixel (e.g. fluorescent particle on dark field)
    Bright,
}

/// How the pipeline is run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum RunMode {
    /// Full closed-loop tracking with actuator output
    #[default]
    Live,
    /// Pass-through annotation and video capture only, no locate/control
    Capture,
    /// Threadless sequential analysis of a recorded clip
    Offline,
}

/// A per-cycle snapshot of the operator mode flags.
///
/// Sampled once at the top of each processing cycle so a toggle mid-cycle
/// cannot produce a half-applied state.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModeSnapshot {
    /// ROI anchor follows the located feature
    pub tracking: bool,
    /// Controller commands are actually written to the actuator
    pub actuator: bool,
    /// Located positions are appended to the trajectory record
    pub logging: bool,
    /// Annotated frames are appended to the capture clip
    pub capture: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_signs() {
        let pos = TrackedPosition {
            x: 110,
            y: 90,
            value: 0,
        };
        assert_eq!(pos.offset_from((100, 100)), (10, -10));
    }

    #[test]
    fn test_zero_command() {
        assert_eq!(ControlCommand::ZERO.x_volts, 0.0);
        assert_eq!(ControlCommand::ZERO.y_volts, 0.0);
    }
}
