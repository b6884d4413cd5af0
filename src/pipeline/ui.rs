//! UI loop: render the annotated view, handle operator keys.

use super::PipelineShared;
use crate::capabilities::{KeyCommand, OperatorDisplay};
use crate::config::TrackConfig;
use crate::error::Result;
use image::imageops::{self, FilterType};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::info;

/// Run the UI loop to completion.
///
/// Renders the latest annotated frame (scaled to the display size) and
/// dispatches key commands, once per poll period. Rendering is best-effort:
/// if the annotated slot is busy or still empty, the cycle is skipped. A
/// display failure takes the whole pipeline down, since the operator has no
/// controls without it.
pub fn run(
    display: Box<dyn OperatorDisplay>,
    shared: Arc<PipelineShared>,
    config: &TrackConfig,
) -> Result<()> {
    let result = run_loop(display, &shared, config);
    if result.is_err() {
        shared.request_shutdown();
    }
    result
}

fn run_loop(
    mut display: Box<dyn OperatorDisplay>,
    shared: &Arc<PipelineShared>,
    config: &TrackConfig,
) -> Result<()> {
    shared.ready.wait();
    info!(
        width = config.display.width,
        height = config.display.height,
        "ui started"
    );

    let period = Duration::from_millis(config.display.poll_ms);
    let nudge_step = config.ui.nudge_step;

    while !shared.is_shutdown() {
        if !display.is_open() {
            info!("display closed");
            shared.request_shutdown();
            break;
        }

        if let Some(annotated) = shared.annotated.try_snapshot() {
            let view = if annotated.dimensions() == (config.display.width, config.display.height) {
                annotated
            } else {
                imageops::resize(
                    &annotated,
                    config.display.width,
                    config.display.height,
                    FilterType::Triangle,
                )
            };
            display.present(&view)?;
        }

        if let Some(command) = display.poll_key()? {
            dispatch(command, shared, nudge_step);
        }

        thread::sleep(period);
    }

    info!("ui stopped");
    Ok(())
}

/// Apply one key command to the shared state.
pub fn dispatch(command: KeyCommand, shared: &PipelineShared, nudge_step: i32) {
    match command {
        KeyCommand::Quit => {
            info!("quit requested");
            shared.request_shutdown();
        }
        KeyCommand::ToggleTracking => {
            let enabled = shared.modes.toggle_tracking();
            info!(enabled, "tracking toggled");
        }
        KeyCommand::ToggleActuator => {
            let enabled = shared.modes.toggle_actuator();
            info!(enabled, "actuator toggled");
        }
        KeyCommand::ToggleLogging => {
            let enabled = shared.modes.toggle_logging();
            info!(enabled, "logging toggled");
        }
        KeyCommand::ToggleCapture => {
            let enabled = shared.modes.toggle_capture();
            info!(enabled, "capture toggled");
        }
        KeyCommand::NudgeRight => shared.nudge.push(nudge_step, 0),
        KeyCommand::NudgeLeft => shared.nudge.push(-nudge_step, 0),
        KeyCommand::NudgeUp => shared.nudge.push(0, -nudge_step),
        KeyCommand::NudgeDown => shared.nudge.push(0, nudge_step),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::MockDisplay;
    use crate::frame::Frame;
    use image::RgbImage;

    #[test]
    fn test_dispatch_quit_requests_shutdown() {
        let shared = PipelineShared::new();
        dispatch(KeyCommand::Quit, &shared, 10);
        assert!(shared.is_shutdown());
    }

    #[test]
    fn test_dispatch_toggles() {
        let shared = PipelineShared::new();
        dispatch(KeyCommand::ToggleTracking, &shared, 10);
        dispatch(KeyCommand::ToggleActuator, &shared, 10);
        let snap = shared.modes.snapshot();
        assert!(snap.tracking);
        assert!(snap.actuator);
        dispatch(KeyCommand::ToggleTracking, &shared, 10);
        assert!(!shared.modes.snapshot().tracking);
    }

    #[test]
    fn test_dispatch_nudges_use_step() {
        let shared = PipelineShared::new();
        dispatch(KeyCommand::NudgeRight, &shared, 10);
        dispatch(KeyCommand::NudgeDown, &shared, 10);
        dispatch(KeyCommand::NudgeDown, &shared, 10);
        assert_eq!(shared.nudge.take(), (10, 20));
    }

    #[test]
    fn test_ui_loop_presents_and_quits() {
        let shared = Arc::new(PipelineShared::new());
        shared.raw.publish(Frame::uniform(8, 8, 0));
        shared.ready.open();
        shared.annotated.publish(RgbImage::new(64, 48));

        let mut config = TrackConfig::default();
        config.display.width = 32;
        config.display.height = 24;
        config.display.poll_ms = 1;

        let display = MockDisplay::with_keys(vec![KeyCommand::NudgeLeft, KeyCommand::Quit]);
        run(Box::new(display), Arc::clone(&shared), &config).expect("ui run");
        assert!(shared.is_shutdown());
        assert_eq!(shared.nudge.take(), (-10, 0));
    }
}
