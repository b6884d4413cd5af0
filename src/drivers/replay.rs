//! Recorded-clip frame source.
//!
//! Reads YUV4MPEG2 clips (as written by the capture path, or converted from
//! other containers) and serves the luma plane as monochrome frames. Any
//! planar colorspace works since only the Y plane is consumed.

use crate::capabilities::FrameSource;
use crate::error::{Result, TrackError};
use crate::frame::Frame;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Frame source backed by a recorded clip.
pub struct ReplaySource {
    decoder: y4m::Decoder<BufReader<File>>,
    width: u32,
    height: u32,
    served: u64,
}

impl ReplaySource {
    /// Open a clip for replay.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| TrackError::SourceUnavailable {
            message: format!("{}: {e}", path.display()),
        })?;
        let decoder =
            y4m::decode(BufReader::new(file)).map_err(|e| TrackError::SourceUnavailable {
                message: format!("{}: {e}", path.display()),
            })?;
        let width = decoder.get_width() as u32;
        let height = decoder.get_height() as u32;
        info!(
            path = %path.display(),
            width,
            height,
            colorspace = ?decoder.get_colorspace(),
            "opened replay clip"
        );
        Ok(Self {
            decoder,
            width,
            height,
            served: 0,
        })
    }
}

impl FrameSource for ReplaySource {
    fn acquire(&mut self) -> Result<Frame> {
        let frame = match self.decoder.read_frame() {
            Ok(frame) => frame,
            Err(y4m::Error::EOF) => {
                return Err(TrackError::SourceExhausted {
                    frames: self.served,
                });
            }
            Err(e) => {
                return Err(TrackError::CaptureFailed {
                    message: format!("clip read failed: {e}"),
                });
            }
        };
        let y_plane = frame.get_y_plane();
        let expected = (self.width * self.height) as usize;
        if y_plane.len() < expected {
            return Err(TrackError::CaptureFailed {
                message: format!(
                    "short luma plane: {} bytes, expected {expected}",
                    y_plane.len()
                ),
            });
        }
        self.served += 1;
        Ok(Frame::from_pixels(
            self.width,
            self.height,
            y_plane[..expected].to_vec(),
        ))
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
