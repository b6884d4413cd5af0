//! Error types for the tracking pipeline.
//!
//! One enum covers every failure mode the pipeline distinguishes. Startup
//! failures (no source, bad config) abort before any loop is spawned;
//! actuator faults are logged and survived; a mid-stream capture failure
//! tears the pipeline down (fail fast, no reconnect).

use thiserror::Error;

/// Result type alias for tracking operations.
pub type Result<T> = std::result::Result<T, TrackError>;

/// Errors that can occur in the tracking pipeline.
#[derive(Error, Debug)]
pub enum TrackError {
    /// No frame source could be opened at startup.
    #[error("frame source unavailable: {message}")]
    SourceUnavailable { message: String },

    /// A recorded clip ran out of frames.
    #[error("frame source exhausted after {frames} frames")]
    SourceExhausted { frames: u64 },

    /// A capture failed mid-stream.
    #[error("frame capture failed: {message}")]
    CaptureFailed { message: String },

    /// The actuator rejected a write.
    #[error("actuator fault on channel {channel}: {message}")]
    ActuatorFault { channel: u32, message: String },

    /// A commanded voltage fell outside the output range.
    #[error("voltage {volts} V outside range {range} for channel {channel}")]
    VoltageOutOfRange {
        channel: u32,
        volts: f64,
        range: &'static str,
    },

    /// Invalid configuration or parameter.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The display layer failed to render or poll.
    #[error("display error: {message}")]
    Display { message: String },

    /// A video container could not be read or written.
    #[error("video container error: {message}")]
    Container { message: String },

    /// I/O error from the operating system.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrackError {
    /// Check if this is an end-of-clip condition rather than a fault.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::SourceExhausted { .. })
    }

    /// Check if this error should abort startup.
    pub fn is_startup_fatal(&self) -> bool {
        matches!(
            self,
            Self::SourceUnavailable { .. } | Self::InvalidConfig { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TrackError::VoltageOutOfRange {
            channel: 1,
            volts: 12.5,
            range: "±10V",
        };
        assert!(err.to_string().contains("12.5"));
        assert!(err.to_string().contains("±10V"));
    }

    #[test]
    fn test_exhausted_predicate() {
        assert!(TrackError::SourceExhausted { frames: 3 }.is_exhausted());
        assert!(!TrackError::CaptureFailed {
            message: "timeout".into()
        }
        .is_exhausted());
    }
}
