//! Command-line entry point for the tracking pipeline.

use anyhow::{bail, Context, Result};
use clap::Parser;
use galvo_track::capabilities::{ActuatorSink, FrameSource, OperatorDisplay};
use galvo_track::drivers::{MockCamera, MockDisplay, MockGalvo, ReplaySource};
use galvo_track::pipeline::{run_live, run_offline};
use galvo_track::{RunMode, TrackConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "galvo-track", about = "Closed-loop particle tracking with galvo beam steering", version)]
struct Args {
    /// Configuration file (TOML); defaults apply if omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// How to run the pipeline
    #[arg(short, long, value_enum, default_value = "live")]
    mode: RunMode,

    /// Recorded clip to analyze or replay (required in offline mode)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Run without a display window
    #[arg(long)]
    headless: bool,

    /// In offline mode, also write the annotated clip
    #[arg(long)]
    record: bool,

    /// ROI width in pixels (overrides the config)
    #[arg(long)]
    roi_width: Option<u32>,

    /// ROI height in pixels (overrides the config)
    #[arg(long)]
    roi_height: Option<u32>,

    /// Stop after this many frames (overrides the config)
    #[arg(long)]
    max_frames: Option<u64>,
}

fn print_key_help() {
    println!("keys:  q quit   t tracking   g galvo   a trajectory log   v capture");
    println!("       k/l nudge ROI left/right   y/h nudge ROI up/down");
}

fn build_source(args: &Args, config: &TrackConfig) -> Result<Box<dyn FrameSource>> {
    match &args.input {
        Some(path) => Ok(Box::new(
            ReplaySource::open(path).context("failed to open input clip")?,
        )),
        None => Ok(Box::new(MockCamera::new(
            config.camera.width,
            config.camera.height,
        ))),
    }
}

#[cfg(feature = "window")]
fn build_display(args: &Args, config: &TrackConfig) -> Result<Box<dyn OperatorDisplay>> {
    if args.headless {
        return Ok(Box::new(MockDisplay::new()));
    }
    let display = galvo_track::drivers::WindowDisplay::open(
        "galvo-track",
        config.display.width,
        config.display.height,
    )
    .context("failed to open display window")?;
    Ok(Box::new(display))
}

#[cfg(not(feature = "window"))]
fn build_display(_args: &Args, _config: &TrackConfig) -> Result<Box<dyn OperatorDisplay>> {
    Ok(Box::new(MockDisplay::new()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => TrackConfig::from_file(path).context("failed to load configuration")?,
        None => TrackConfig::default(),
    };
    if let Some(max_frames) = args.max_frames {
        config.output.max_frames = max_frames;
    }
    if let Some(roi_width) = args.roi_width {
        config.roi.width = roi_width;
    }
    if let Some(roi_height) = args.roi_height {
        config.roi.height = roi_height;
    }
    config.validate().context("invalid configuration")?;

    info!(mode = ?args.mode, "starting");

    match args.mode {
        RunMode::Offline => {
            if args.input.is_none() {
                bail!("offline mode requires --input <clip>");
            }
            let source = build_source(&args, &config)?;
            let summary = run_offline(&config, source, args.record)?;
            println!(
                "analyzed {} frames, wrote {} trajectory records to {}",
                summary.frames,
                summary.records,
                config.output.trajectory_path.display()
            );
        }
        mode => {
            print_key_help();
            let source = build_source(&args, &config)?;
            let actuator: Box<dyn ActuatorSink> = Box::new(MockGalvo::new());
            let display = build_display(&args, &config)?;
            run_live(&config, mode, source, actuator, display)?;
        }
    }

    Ok(())
}
