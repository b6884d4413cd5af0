//! Operator display implementations.

use crate::capabilities::{KeyCommand, OperatorDisplay};
use crate::error::Result;
use image::RgbImage;
use std::collections::VecDeque;
use std::path::PathBuf;

/// Headless display for tests and windowless runs.
///
/// Serves a scripted key sequence, one command per poll, and counts the
/// frames presented to it. The final key can be gated on a file appearing,
/// so a scripted quit waits for the pipeline to produce observable output
/// instead of racing it on wall-clock time.
#[derive(Debug, Default)]
pub struct MockDisplay {
    keys: VecDeque<KeyCommand>,
    hold_last_until: Option<PathBuf>,
    presented: u64,
    last_size: Option<(u32, u32)>,
}

impl MockDisplay {
    /// Create a display with no scripted input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a display that replays the given key sequence.
    pub fn with_keys(keys: Vec<KeyCommand>) -> Self {
        Self {
            keys: keys.into(),
            hold_last_until: None,
            presented: 0,
            last_size: None,
        }
    }

    /// Withhold the final scripted key until `path` exists.
    pub fn hold_last_key_until(mut self, path: PathBuf) -> Self {
        self.hold_last_until = Some(path);
        self
    }

    /// Number of frames presented so far.
    pub fn presented(&self) -> u64 {
        self.presented
    }

    /// Dimensions of the most recently presented frame.
    pub fn last_size(&self) -> Option<(u32, u32)> {
        self.last_size
    }
}

impl OperatorDisplay for MockDisplay {
    fn present(&mut self, image: &RgbImage) -> Result<()> {
        self.presented += 1;
        self.last_size = Some(image.dimensions());
        Ok(())
    }

    fn poll_key(&mut self) -> Result<Option<KeyCommand>> {
        if self.keys.len() == 1 {
            if let Some(path) = &self.hold_last_until {
                if !path.exists() {
                    return Ok(None);
                }
            }
        }
        Ok(self.keys.pop_front())
    }
}

#[cfg(feature = "window")]
pub use window::WindowDisplay;

#[cfg(feature = "window")]
mod window {
    use super::*;
    use crate::error::TrackError;
    use minifb::{Key, KeyRepeat, Window, WindowOptions};

    /// Key bindings checked each poll, in priority order.
    const KEY_MAP: &[(Key, KeyCommand)] = &[
        (Key::Q, KeyCommand::Quit),
        (Key::T, KeyCommand::ToggleTracking),
        (Key::G, KeyCommand::ToggleActuator),
        (Key::A, KeyCommand::ToggleLogging),
        (Key::V, KeyCommand::ToggleCapture),
        (Key::L, KeyCommand::NudgeRight),
        (Key::K, KeyCommand::NudgeLeft),
        (Key::Y, KeyCommand::NudgeUp),
        (Key::H, KeyCommand::NudgeDown),
    ];

    /// Desktop window display.
    pub struct WindowDisplay {
        window: Window,
        buffer: Vec<u32>,
        width: usize,
        height: usize,
    }

    // The boxed display is moved into the ui thread once at startup and
    // never shared or touched from anywhere else afterwards.
    #[allow(unsafe_code)]
    unsafe impl Send for WindowDisplay {}

    impl WindowDisplay {
        /// Open a window of the given size.
        pub fn open(title: &str, width: u32, height: u32) -> Result<Self> {
            let window = Window::new(
                title,
                width as usize,
                height as usize,
                WindowOptions::default(),
            )
            .map_err(|e| TrackError::Display {
                message: e.to_string(),
            })?;
            Ok(Self {
                window,
                buffer: vec![0; (width * height) as usize],
                width: width as usize,
                height: height as usize,
            })
        }
    }

    impl OperatorDisplay for WindowDisplay {
        fn present(&mut self, image: &RgbImage) -> Result<()> {
            let copy_w = (image.width() as usize).min(self.width);
            let copy_h = (image.height() as usize).min(self.height);
            for y in 0..copy_h {
                for x in 0..copy_w {
                    let [r, g, b] = image.get_pixel(x as u32, y as u32).0;
                    self.buffer[y * self.width + x] =
                        (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b);
                }
            }
            self.window
                .update_with_buffer(&self.buffer, self.width, self.height)
                .map_err(|e| TrackError::Display {
                    message: e.to_string(),
                })
        }

        fn poll_key(&mut self) -> Result<Option<KeyCommand>> {
            self.window.update();
            for (key, command) in KEY_MAP {
                if self.window.is_key_pressed(*key, KeyRepeat::No) {
                    return Ok(Some(*command));
                }
            }
            Ok(None)
        }

        fn is_open(&self) -> bool {
            self.window.is_open()
        }
    }
}
