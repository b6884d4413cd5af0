//! Closed-loop particle tracking with galvo beam steering.
//!
//! Frames come in from a camera (or a recorded clip), a smoothed-extremum
//! locator finds the particle inside a moving region of interest, and a
//! proportional controller writes steering voltages to a two-channel galvo
//! so the particle stays at the frame center. The live pipeline runs three
//! OS threads:
//!
//! - **acquisition** pulls frames from the source and publishes the latest
//!   one into a single-slot buffer
//! - **processing** runs the locate/steer/record cycle on the freshest
//!   frame and publishes an annotated view
//! - **ui** renders the annotated view and turns key presses into mode
//!   toggles and ROI nudges
//!
//! Hardware sits behind the [`capabilities`] traits; mock implementations
//! in [`drivers`] carry the full pipeline in tests and on machines without
//! the bench. Offline analysis of recorded clips reuses the same processing
//! stage without any threads.

pub mod annotate;
pub mod buffer;
pub mod capabilities;
pub mod config;
pub mod controller;
pub mod drivers;
pub mod error;
pub mod frame;
pub mod locator;
pub mod output;
pub mod pipeline;
pub mod roi;
pub mod types;

pub use config::TrackConfig;
pub use error::{Result, TrackError};
pub use frame::Frame;
pub use types::{ControlCommand, ModeSnapshot, Polarity, RunMode, TrackedPosition};
