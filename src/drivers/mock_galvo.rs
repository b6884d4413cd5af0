//! Mock galvo analog output with voltage range validation.

use crate::capabilities::{ActuatorSink, Axis};
use crate::error::{Result, TrackError};

/// Voltage range for an analog output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoltageRange {
    /// -10V to +10V
    Bipolar10V,
    /// -5V to +5V
    Bipolar5V,
    /// 0V to +10V
    Unipolar10V,
    /// 0V to +5V
    Unipolar5V,
}

impl VoltageRange {
    /// Minimum voltage for this range.
    pub fn min(&self) -> f64 {
        match self {
            Self::Bipolar10V => -10.0,
            Self::Bipolar5V => -5.0,
            Self::Unipolar10V | Self::Unipolar5V => 0.0,
        }
    }

    /// Maximum voltage for this range.
    pub fn max(&self) -> f64 {
        match self {
            Self::Bipolar10V | Self::Unipolar10V => 10.0,
            Self::Bipolar5V | Self::Unipolar5V => 5.0,
        }
    }

    /// Whether a voltage lies within this range.
    pub fn contains(&self, voltage: f64) -> bool {
        voltage >= self.min() && voltage <= self.max()
    }

    /// Human-readable description of this range.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Bipolar10V => "±10V",
            Self::Bipolar5V => "±5V",
            Self::Unipolar10V => "0-10V",
            Self::Unipolar5V => "0-5V",
        }
    }
}

/// Simulated two-channel galvo driver.
///
/// Validates every write against the configured range and keeps the full
/// write history per axis so tests can assert on the command stream.
pub struct MockGalvo {
    range: VoltageRange,
    vertical: Vec<f64>,
    horizontal: Vec<f64>,
}

impl MockGalvo {
    /// Create a galvo with the standard bipolar 10 V range.
    pub fn new() -> Self {
        Self::with_range(VoltageRange::Bipolar10V)
    }

    /// Create a galvo with a specific output range.
    pub fn with_range(range: VoltageRange) -> Self {
        Self {
            range,
            vertical: Vec::new(),
            horizontal: Vec::new(),
        }
    }

    /// The write history for one axis, oldest first.
    pub fn history(&self, axis: Axis) -> &[f64] {
        match axis {
            Axis::Vertical => &self.vertical,
            Axis::Horizontal => &self.horizontal,
        }
    }

    /// The most recent voltage written to one axis, if any.
    pub fn last(&self, axis: Axis) -> Option<f64> {
        self.history(axis).last().copied()
    }
}

impl Default for MockGalvo {
    fn default() -> Self {
        Self::new()
    }
}

impl ActuatorSink for MockGalvo {
    fn write(&mut self, axis: Axis, volts: f64) -> Result<()> {
        if !self.range.contains(volts) {
            return Err(TrackError::VoltageOutOfRange {
                channel: axis.channel(),
                volts,
                range: self.range.description(),
            });
        }
        match axis {
            Axis::Vertical => self.vertical.push(volts),
            Axis::Horizontal => self.horizontal.push(volts),
        }
        Ok(())
    }
}
