//! Pipeline assembly: thread spawning, joining, and the offline driver.

use super::{acquisition, processing, ui, PipelineShared, ProcessingStage};
use crate::capabilities::{ActuatorSink, FrameSource, OperatorDisplay};
use crate::config::TrackConfig;
use crate::drivers::MockGalvo;
use crate::types::{ModeSnapshot, RunMode};
use anyhow::{bail, Context, Result};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::info;

fn join_loop(handle: JoinHandle<crate::error::Result<()>>, name: &str) -> Result<()> {
    match handle.join() {
        Ok(result) => result.with_context(|| format!("{name} loop failed")),
        Err(_) => bail!("{name} thread panicked"),
    }
}

/// Run the three-thread live pipeline until quit or failure.
///
/// Spawns acquisition, processing, and UI on their own OS threads and joins
/// them all before returning. The first loop to fail requests shutdown, so
/// the others drain out; its error is the one reported (acquisition first,
/// the most likely root cause).
pub fn run_live(
    config: &TrackConfig,
    run_mode: RunMode,
    source: Box<dyn FrameSource>,
    actuator: Box<dyn ActuatorSink>,
    display: Box<dyn OperatorDisplay>,
) -> Result<()> {
    let shared = Arc::new(PipelineShared::new());
    let stage = ProcessingStage::new(config, run_mode, actuator, source.resolution());
    let max_frames = config.output.max_frames;

    info!(mode = ?run_mode, "pipeline starting");

    let acq_shared = Arc::clone(&shared);
    let acq_handle = thread::Builder::new()
        .name("acquisition".into())
        .spawn(move || acquisition::run(source, acq_shared, max_frames))
        .context("failed to spawn acquisition thread")?;

    let proc_shared = Arc::clone(&shared);
    let proc_handle = thread::Builder::new()
        .name("processing".into())
        .spawn(move || processing::run(stage, proc_shared))
        .context("failed to spawn processing thread")?;

    let ui_shared = Arc::clone(&shared);
    let ui_config = config.clone();
    let ui_handle = thread::Builder::new()
        .name("ui".into())
        .spawn(move || ui::run(display, ui_shared, &ui_config))
        .context("failed to spawn ui thread")?;

    // Join everything before reporting, so no loop outlives the run.
    let acq_result = join_loop(acq_handle, "acquisition");
    let proc_result = join_loop(proc_handle, "processing");
    let ui_result = join_loop(ui_handle, "ui");

    acq_result?;
    proc_result?;
    ui_result?;
    info!("pipeline stopped");
    Ok(())
}

/// Frames between offline progress lines.
const PROGRESS_INTERVAL: u64 = 24;

/// Summary of an offline analysis run.
#[derive(Debug, Clone, Copy)]
pub struct OfflineSummary {
    /// Frames analyzed
    pub frames: u64,
    /// Trajectory records written
    pub records: u64,
}

/// Analyze a recorded clip sequentially, no threads.
///
/// Tracking and logging are on for the whole run; with `record` set, the
/// annotated frames are also written out as a clip. The actuator path runs
/// against a mock so the controller state advances exactly as it would
/// live, without touching hardware.
pub fn run_offline(
    config: &TrackConfig,
    mut source: Box<dyn FrameSource>,
    record: bool,
) -> Result<OfflineSummary> {
    let mut stage = ProcessingStage::new(
        config,
        RunMode::Offline,
        Box::new(MockGalvo::new()),
        source.resolution(),
    );
    let modes = ModeSnapshot {
        tracking: true,
        logging: true,
        capture: record,
        ..Default::default()
    };

    let mut frames: u64 = 0;
    loop {
        let frame = match source.acquire() {
            Ok(frame) => frame,
            Err(e) if e.is_exhausted() => break,
            Err(e) => return Err(e).context("clip analysis failed"),
        };
        stage
            .step(&frame, modes, (0, 0))
            .context("clip analysis failed")?;
        frames += 1;
        if frames % PROGRESS_INTERVAL == 0 {
            info!(frames, "offline analysis progress");
        }
        if config.output.max_frames > 0 && frames >= config.output.max_frames {
            break;
        }
    }

    let summary = OfflineSummary {
        frames,
        records: stage.trajectory_records(),
    };
    info!(
        frames = summary.frames,
        records = summary.records,
        "offline analysis complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::{MockCamera, MockDisplay, ScriptedSource};
    use crate::frame::Frame;

    fn test_config(dir: &std::path::Path) -> TrackConfig {
        let mut config = TrackConfig::default();
        config.camera.width = 160;
        config.camera.height = 120;
        config.locator.blur_sigma = 1.0;
        config.display.poll_ms = 1;
        config.output.trajectory_path = dir.join("trajectory.txt");
        config.output.capture_path = dir.join("capture.y4m");
        config
    }

    #[test]
    fn test_live_run_stops_at_frame_limit() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = test_config(dir.path());
        config.output.max_frames = 10;

        run_live(
            &config,
            RunMode::Live,
            Box::new(MockCamera::new(160, 120)),
            Box::new(MockGalvo::new()),
            Box::new(MockDisplay::new()),
        )
        .expect("live run");
    }

    #[test]
    fn test_live_run_fails_on_capture_fault() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = test_config(dir.path());
        let frames = vec![Frame::uniform(160, 120, 200); 3];
        let source = ScriptedSource::new(frames).failing_after_exhaustion();

        let err = run_live(
            &config,
            RunMode::Live,
            Box::new(source),
            Box::new(MockGalvo::new()),
            Box::new(MockDisplay::new()),
        )
        .unwrap_err();
        assert!(err.to_string().contains("acquisition"));
    }

    #[test]
    fn test_offline_analyzes_all_frames() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = test_config(dir.path());
        let mut frames = Vec::new();
        for i in 0..5u32 {
            let mut frame = Frame::uniform(160, 120, 200);
            frame.put(60 + i, 60, 0);
            frames.push(frame);
        }
        let summary = run_offline(&config, Box::new(ScriptedSource::new(frames)), false)
            .expect("offline run");
        assert_eq!(summary.frames, 5);
        assert_eq!(summary.records, 5);
        let content =
            std::fs::read_to_string(dir.path().join("trajectory.txt")).expect("trajectory");
        assert_eq!(content.lines().count(), 5);
    }

    #[test]
    fn test_offline_respects_frame_limit() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = test_config(dir.path());
        config.output.max_frames = 2;
        let frames = vec![Frame::uniform(160, 120, 200); 5];
        let summary = run_offline(&config, Box::new(ScriptedSource::new(frames)), false)
            .expect("offline run");
        assert_eq!(summary.frames, 2);
    }
}
