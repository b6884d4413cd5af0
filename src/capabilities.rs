//! Capability traits at the hardware seams.
//!
//! The pipeline never talks to vendor SDKs directly. Each external
//! collaborator (camera, analog output, display window) is reached through a
//! narrow trait so the control logic runs unchanged against mock
//! implementations in tests and against real hardware in the lab.

use crate::error::Result;
use crate::frame::Frame;
use image::RgbImage;

/// A source of single-channel frames.
///
/// Live cameras implement this as software-trigger-then-fetch; recorded-clip
/// sources as a sequential read. Each call yields exactly one frame or an
/// error; a mid-stream error is fatal to the pipeline.
pub trait FrameSource: Send {
    /// Trigger and fetch the next frame.
    fn acquire(&mut self) -> Result<Frame>;

    /// Frame dimensions (width, height) this source produces.
    fn resolution(&self) -> (u32, u32);
}

/// A beam-steering axis, mapped to an analog output channel.
///
/// Channel assignment follows the bench wiring: ao0 steers up/down
/// (positive voltage moves the beam down), ao1 steers left/right (positive
/// moves it right).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Up/down steering (channel 0)
    Vertical,
    /// Left/right steering (channel 1)
    Horizontal,
}

impl Axis {
    /// The analog output channel this axis is wired to.
    pub fn channel(&self) -> u32 {
        match self {
            Self::Vertical => 0,
            Self::Horizontal => 1,
        }
    }
}

/// A two-channel analog voltage output.
///
/// One scalar sample per channel per invocation. Implementations validate
/// the voltage against their output range.
pub trait ActuatorSink: Send {
    /// Write one voltage sample to one axis.
    fn write(&mut self, axis: Axis, volts: f64) -> Result<()>;
}

/// A keyboard command from the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    /// Request shutdown
    Quit,
    /// Toggle whether the ROI anchor follows the feature
    ToggleTracking,
    /// Toggle whether commands reach the actuator
    ToggleActuator,
    /// Toggle trajectory logging
    ToggleLogging,
    /// Toggle annotated video capture
    ToggleCapture,
    /// Nudge the ROI anchor right by one step
    NudgeRight,
    /// Nudge the ROI anchor left by one step
    NudgeLeft,
    /// Nudge the ROI anchor up by one step
    NudgeUp,
    /// Nudge the ROI anchor down by one step
    NudgeDown,
}

impl KeyCommand {
    /// Map a pressed character to a command, if it is bound.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'q' => Some(Self::Quit),
            't' => Some(Self::ToggleTracking),
            'g' => Some(Self::ToggleActuator),
            'a' => Some(Self::ToggleLogging),
            'v' => Some(Self::ToggleCapture),
            'l' => Some(Self::NudgeRight),
            'k' => Some(Self::NudgeLeft),
            'y' => Some(Self::NudgeUp),
            'h' => Some(Self::NudgeDown),
            _ => None,
        }
    }
}

/// The operator-facing display window.
///
/// Rendering is best-effort: the UI loop skips a cycle rather than wait for
/// the processing thread, and the display layer must never block it.
pub trait OperatorDisplay: Send {
    /// Show an annotated frame, already scaled to the display size.
    fn present(&mut self, image: &RgbImage) -> Result<()>;

    /// Poll for at most one keyboard command, without blocking.
    fn poll_key(&mut self) -> Result<Option<KeyCommand>>;

    /// Whether the display surface is still open.
    fn is_open(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bindings() {
        assert_eq!(KeyCommand::from_char('q'), Some(KeyCommand::Quit));
        assert_eq!(KeyCommand::from_char('t'), Some(KeyCommand::ToggleTracking));
        assert_eq!(KeyCommand::from_char('g'), Some(KeyCommand::ToggleActuator));
        assert_eq!(KeyCommand::from_char('a'), Some(KeyCommand::ToggleLogging));
        assert_eq!(KeyCommand::from_char('v'), Some(KeyCommand::ToggleCapture));
        assert_eq!(KeyCommand::from_char('l'), Some(KeyCommand::NudgeRight));
        assert_eq!(KeyCommand::from_char('k'), Some(KeyCommand::NudgeLeft));
        assert_eq!(KeyCommand::from_char('y'), Some(KeyCommand::NudgeUp));
        assert_eq!(KeyCommand::from_char('h'), Some(KeyCommand::NudgeDown));
        assert_eq!(KeyCommand::from_char('x'), None);
    }

    #[test]
    fn test_axis_channels() {
        assert_eq!(Axis::Vertical.channel(), 0);
        assert_eq!(Axis::Horizontal.channel(), 1);
    }
}
