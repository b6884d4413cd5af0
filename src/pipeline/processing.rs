//! Processing loop: locate, steer, record.

use super::PipelineShared;
use crate::annotate;
use crate::capabilities::{ActuatorSink, Axis};
use crate::config::TrackConfig;
use crate::controller::Controller;
use crate::error::{Result, TrackError};
use crate::frame::Frame;
use crate::locator::FeatureLocator;
use crate::output::{CaptureWriter, TrajectoryLog};
use crate::roi::{Roi, RoiTracker};
use crate::types::{ControlCommand, ModeSnapshot, RunMode, TrackedPosition};
use image::RgbImage;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Cycles between throughput log lines.
const THROUGHPUT_INTERVAL: u64 = 24;

/// What one processing cycle produced.
#[derive(Debug)]
pub struct CycleReport {
    /// Located feature, `None` in capture mode
    pub position: Option<TrackedPosition>,
    /// Command issued to the actuator this cycle, if any
    pub command: Option<ControlCommand>,
    /// ROI after this cycle's anchor update
    pub roi: Roi,
    /// Annotated frame for display and capture
    pub annotated: RgbImage,
}

/// One cycle of the locate/steer/record sequence, plus the state it carries
/// between cycles.
///
/// The stage is synchronous and single-threaded; [`run`] wraps it in the
/// processing thread, and offline analysis drives it directly.
pub struct ProcessingStage {
    locator: FeatureLocator,
    roi_tracker: RoiTracker,
    controller: Controller,
    actuator: Box<dyn ActuatorSink>,
    trajectory: TrajectoryLog,
    capture: CaptureWriter,
    run_mode: RunMode,
    cycles: u64,
}

impl ProcessingStage {
    /// Build a stage from the configuration and an actuator.
    pub fn new(
        config: &TrackConfig,
        run_mode: RunMode,
        actuator: Box<dyn ActuatorSink>,
        frame_size: (u32, u32),
    ) -> Self {
        Self {
            locator: FeatureLocator::new(config.locator.blur_sigma, config.locator.polarity),
            roi_tracker: RoiTracker::new(
                config.roi.width,
                config.roi.height,
                frame_size.0,
                frame_size.1,
            ),
            controller: Controller::new(
                config.controller.limit_radius,
                config.controller.max_volts,
                config.controller.emit_every,
            ),
            actuator,
            trajectory: TrajectoryLog::new(config.output.trajectory_path.clone()),
            capture: CaptureWriter::new(config.output.capture_path.clone(), config.output.capture_fps),
            run_mode,
            cycles: 0,
        }
    }

    /// The current ROI.
    pub fn roi(&self) -> Roi {
        self.roi_tracker.roi()
    }

    /// Number of cycles completed.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Number of trajectory records written.
    pub fn trajectory_records(&self) -> u64 {
        self.trajectory.records()
    }

    /// Write one command to both actuator channels.
    fn steer(&mut self, command: ControlCommand) -> Result<()> {
        self.actuator.write(Axis::Vertical, command.y_volts)?;
        self.actuator.write(Axis::Horizontal, command.x_volts)?;
        Ok(())
    }

    /// Run one cycle on a frame.
    ///
    /// `modes` is the flag snapshot for this cycle and `nudge` the operator
    /// displacement drained since the last one. In capture mode the locate
    /// and control steps are skipped entirely; the frame passes straight
    /// through to annotation.
    pub fn step(&mut self, frame: &Frame, modes: ModeSnapshot, nudge: (i32, i32)) -> Result<CycleReport> {
        self.cycles += 1;

        if self.run_mode == RunMode::Capture {
            self.roi_tracker.update(None, nudge);
            let roi = self.roi_tracker.roi();
            let annotated = annotate::annotate(frame, &roi, None);
            if modes.capture {
                self.capture.write(&annotated)?;
            }
            return Ok(CycleReport {
                position: None,
                command: None,
                roi,
                annotated,
            });
        }

        let (smoothed, position) = self.locator.locate(frame, &self.roi_tracker.roi());

        let offset = position.offset_from(frame.center());
        let command = self.controller.tick(offset, modes.actuator);
        if let Some(cmd) = command {
            if let Err(e) = self.steer(cmd) {
                if !is_survivable(&e) {
                    return Err(e);
                }
                // An actuator fault costs only this cycle's control output.
                // The beam holds its last position while the trajectory
                // record, ROI update, and drained nudge still go through.
                warn!(error = %e, cycle = self.cycles, "actuator write failed");
            }
        }

        if modes.logging {
            self.trajectory.record(&position)?;
        }

        self.roi_tracker
            .update(modes.tracking.then_some(position), nudge);
        let roi = self.roi_tracker.roi();

        let annotated = annotate::annotate(&smoothed, &roi, Some(&position));
        if modes.capture {
            self.capture.write(&annotated)?;
        }

        Ok(CycleReport {
            position: Some(position),
            command,
            roi,
            annotated,
        })
    }
}

/// Whether a steering error is survivable.
///
/// Actuator faults are logged inside the cycle and the beam stays where it
/// is; anything touching the frame path or the output files is fatal.
fn is_survivable(error: &TrackError) -> bool {
    matches!(
        error,
        TrackError::ActuatorFault { .. } | TrackError::VoltageOutOfRange { .. }
    )
}

/// Run the processing loop to completion.
pub fn run(mut stage: ProcessingStage, shared: Arc<PipelineShared>) -> Result<()> {
    shared.ready.wait();
    info!("processing started");

    let mut last_report = Instant::now();
    while !shared.is_shutdown() {
        let Some(frame) = shared.raw.snapshot() else {
            continue;
        };
        let modes = shared.modes.snapshot();
        let nudge = shared.nudge.take();

        match stage.step(&frame, modes, nudge) {
            Ok(report) => {
                if let Some(pos) = report.position {
                    debug!(x = pos.x, y = pos.y, value = pos.value, "located");
                }
                shared.annotated.publish(report.annotated);
            }
            Err(e) => {
                shared.request_shutdown();
                return Err(e);
            }
        }

        if stage.cycles() % THROUGHPUT_INTERVAL == 0 {
            let elapsed = last_report.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                info!(
                    cycles = stage.cycles(),
                    fps = THROUGHPUT_INTERVAL as f64 / elapsed,
                    "processing throughput"
                );
            }
            last_report = Instant::now();
        }
    }

    info!(cycles = stage.cycles(), "processing stopped");
    Ok(())
}
