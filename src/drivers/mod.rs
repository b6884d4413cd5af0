//! Frame source, actuator, and display implementations.
//!
//! Mock drivers carry the full pipeline in tests and on machines without
//! the bench hardware; the replay source feeds recorded clips through the
//! same `FrameSource` seam.

pub mod display;
pub mod mock_camera;
pub mod mock_galvo;
pub mod replay;

pub use display::MockDisplay;
pub use mock_camera::{MockCamera, ScriptedSource};
pub use mock_galvo::{MockGalvo, VoltageRange};
pub use replay::ReplaySource;

#[cfg(feature = "window")]
pub use display::WindowDisplay;
