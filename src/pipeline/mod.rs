//! The three-loop tracking pipeline.
//!
//! Acquisition pulls frames from the source as fast as it can, processing
//! runs the locate/control cycle on the freshest frame available, and the
//! UI loop renders and handles operator input at its own cadence. The loops
//! share state only through [`PipelineShared`]: two single-slot frame
//! buffers, a set of atomic mode flags, a pending-nudge accumulator, and a
//! shutdown flag every loop polls.

pub mod acquisition;
pub mod processing;
pub mod runner;
pub mod ui;

pub use processing::{CycleReport, ProcessingStage};
pub use runner::{run_live, run_offline};

use crate::buffer::{FrameSlot, ReadyLatch};
use crate::frame::Frame;
use crate::types::ModeSnapshot;
use image::RgbImage;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use tracing::info;

/// Operator-controlled mode flags.
///
/// Toggled from the UI loop, sampled once per cycle by the processing loop.
#[derive(Debug, Default)]
pub struct ModeFlags {
    tracking: AtomicBool,
    actuator: AtomicBool,
    logging: AtomicBool,
    capture: AtomicBool,
}

impl ModeFlags {
    /// Atomically read all four flags.
    pub fn snapshot(&self) -> ModeSnapshot {
        ModeSnapshot {
            tracking: self.tracking.load(Ordering::SeqCst),
            actuator: self.actuator.load(Ordering::SeqCst),
            logging: self.logging.load(Ordering::SeqCst),
            capture: self.capture.load(Ordering::SeqCst),
        }
    }

    /// Flip the tracking flag, returning the new value.
    pub fn toggle_tracking(&self) -> bool {
        !self.tracking.fetch_xor(true, Ordering::SeqCst)
    }

    /// Flip the actuator flag, returning the new value.
    pub fn toggle_actuator(&self) -> bool {
        !self.actuator.fetch_xor(true, Ordering::SeqCst)
    }

    /// Flip the logging flag, returning the new value.
    pub fn toggle_logging(&self) -> bool {
        !self.logging.fetch_xor(true, Ordering::SeqCst)
    }

    /// Flip the capture flag, returning the new value.
    pub fn toggle_capture(&self) -> bool {
        !self.capture.fetch_xor(true, Ordering::SeqCst)
    }

    /// Force a flag configuration (offline runs and tests).
    pub fn set(&self, modes: ModeSnapshot) {
        self.tracking.store(modes.tracking, Ordering::SeqCst);
        self.actuator.store(modes.actuator, Ordering::SeqCst);
        self.logging.store(modes.logging, Ordering::SeqCst);
        self.capture.store(modes.capture, Ordering::SeqCst);
    }
}

/// Accumulated operator nudges, pending consumption.
///
/// Key presses from the UI loop add to the accumulator; the processing loop
/// drains it once per cycle. Multiple presses between cycles sum rather
/// than overwrite.
#[derive(Debug, Default)]
pub struct NudgeState {
    dx: AtomicI32,
    dy: AtomicI32,
}

impl NudgeState {
    /// Add a displacement to the pending nudge.
    pub fn push(&self, dx: i32, dy: i32) {
        self.dx.fetch_add(dx, Ordering::SeqCst);
        self.dy.fetch_add(dy, Ordering::SeqCst);
    }

    /// Drain the pending nudge, resetting it to zero.
    pub fn take(&self) -> (i32, i32) {
        (
            self.dx.swap(0, Ordering::SeqCst),
            self.dy.swap(0, Ordering::SeqCst),
        )
    }
}

/// Everything the three loops share.
#[derive(Debug, Default)]
pub struct PipelineShared {
    /// Latest raw frame from acquisition
    pub raw: FrameSlot<Frame>,
    /// Latest annotated frame from processing
    pub annotated: FrameSlot<RgbImage>,
    /// Opened once the first frame lands in `raw`
    pub ready: ReadyLatch,
    /// Operator mode flags
    pub modes: ModeFlags,
    /// Pending ROI nudges
    pub nudge: NudgeState,
    shutdown: AtomicBool,
}

impl PipelineShared {
    /// Create the shared state for one pipeline run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every loop to exit at its next check.
    ///
    /// Also opens the ready latch, so loops still waiting on the first
    /// frame wake up and see the flag instead of blocking forever.
    pub fn request_shutdown(&self) {
        if !self.shutdown.swap(true, Ordering::SeqCst) {
            info!("shutdown requested");
        }
        self.ready.open();
    }

    /// Whether shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_toggles() {
        let modes = ModeFlags::default();
        assert!(!modes.snapshot().tracking);
        assert!(modes.toggle_tracking());
        assert!(modes.snapshot().tracking);
        assert!(!modes.toggle_tracking());
        assert!(!modes.snapshot().tracking);
    }

    #[test]
    fn test_toggles_are_independent() {
        let modes = ModeFlags::default();
        modes.toggle_actuator();
        let snap = modes.snapshot();
        assert!(snap.actuator);
        assert!(!snap.tracking);
        assert!(!snap.logging);
        assert!(!snap.capture);
    }

    #[test]
    fn test_nudges_accumulate_and_drain() {
        let nudge = NudgeState::default();
        nudge.push(10, 0);
        nudge.push(0, -10);
        nudge.push(10, 0);
        assert_eq!(nudge.take(), (20, -10));
        assert_eq!(nudge.take(), (0, 0));
    }

    #[test]
    fn test_shutdown_flag() {
        let shared = PipelineShared::new();
        assert!(!shared.is_shutdown());
        shared.request_shutdown();
        assert!(shared.is_shutdown());
        shared.request_shutdown();
        assert!(shared.is_shutdown());
    }
}
