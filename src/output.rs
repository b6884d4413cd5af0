//! Trajectory and video outputs.
//!
//! Both writers open lazily on first use: toggling logging or capture on
//! creates (or truncates) the file at that moment, and a session that never
//! enables them leaves no file behind.

use crate::error::{Result, TrackError};
use crate::types::TrackedPosition;
use image::RgbImage;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, warn};

/// Plain-text trajectory record, one `x y` pair per line.
#[derive(Debug)]
pub struct TrajectoryLog {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    records: u64,
}

impl TrajectoryLog {
    /// Create a log that will write to `path` once the first record lands.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            writer: None,
            records: 0,
        }
    }

    /// Append one located position.
    pub fn record(&mut self, position: &TrackedPosition) -> Result<()> {
        if self.writer.is_none() {
            info!(path = %self.path.display(), "opening trajectory record");
            self.writer = Some(BufWriter::new(File::create(&self.path)?));
        }
        if let Some(writer) = self.writer.as_mut() {
            writeln!(writer, "{} {}", position.x, position.y)?;
            self.records += 1;
        }
        Ok(())
    }

    /// Number of records written so far.
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Flush buffered records to disk.
    pub fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for TrajectoryLog {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!(error = %e, "failed to flush trajectory record");
        }
    }
}

/// Convert an RGB image to planar YUV 4:4:4 (BT.601, full range).
fn rgb_to_yuv444(image: &RgbImage) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
    let n = (image.width() * image.height()) as usize;
    let mut y_plane = Vec::with_capacity(n);
    let mut u_plane = Vec::with_capacity(n);
    let mut v_plane = Vec::with_capacity(n);
    for pixel in image.pixels() {
        let [r, g, b] = pixel.0;
        let (r, g, b) = (f32::from(r), f32::from(g), f32::from(b));
        let y = 0.299 * r + 0.587 * g + 0.114 * b;
        let u = 128.0 - 0.168_736 * r - 0.331_264 * g + 0.5 * b;
        let v = 128.0 + 0.5 * r - 0.418_688 * g - 0.081_312 * b;
        y_plane.push(y.round().clamp(0.0, 255.0) as u8);
        u_plane.push(u.round().clamp(0.0, 255.0) as u8);
        v_plane.push(v.round().clamp(0.0, 255.0) as u8);
    }
    (y_plane, u_plane, v_plane)
}

/// Annotated capture clip in the YUV4MPEG2 container.
///
/// Frames are stored as uncompressed 4:4:4 so overlay colors survive
/// exactly; the clips are short and disk is cheap on the acquisition host.
pub struct CaptureWriter {
    path: PathBuf,
    fps: u32,
    encoder: Option<y4m::Encoder<BufWriter<File>>>,
    frames: u64,
}

impl CaptureWriter {
    /// Create a writer that will open `path` when the first frame arrives.
    pub fn new(path: PathBuf, fps: u32) -> Self {
        Self {
            path,
            fps,
            encoder: None,
            frames: 0,
        }
    }

    /// Append one annotated frame. The first frame fixes the clip geometry.
    pub fn write(&mut self, image: &RgbImage) -> Result<()> {
        if self.encoder.is_none() {
            info!(
                path = %self.path.display(),
                width = image.width(),
                height = image.height(),
                fps = self.fps,
                "opening capture clip"
            );
            let file = BufWriter::new(File::create(&self.path)?);
            let encoder = y4m::encode(
                image.width() as usize,
                image.height() as usize,
                y4m::Ratio::new(self.fps as usize, 1),
            )
            .with_colorspace(y4m::Colorspace::C444)
            .write_header(file)
            .map_err(|e| TrackError::Container {
                message: format!("{}: {e}", self.path.display()),
            })?;
            self.encoder = Some(encoder);
        }

        let (y_plane, u_plane, v_plane) = rgb_to_yuv444(image);
        if let Some(encoder) = self.encoder.as_mut() {
            let frame = y4m::Frame::new([&y_plane, &u_plane, &v_plane], None);
            encoder.write_frame(&frame).map_err(|e| TrackError::Container {
                message: format!("{}: {e}", self.path.display()),
            })?;
            self.frames += 1;
        }
        Ok(())
    }

    /// Number of frames appended so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trajectory_format() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("trajectory.txt");
        let mut log = TrajectoryLog::new(path.clone());
        log.record(&TrackedPosition {
            x: 320,
            y: 240,
            value: 5,
        })
        .expect("record");
        log.record(&TrackedPosition {
            x: 321,
            y: 239,
            value: 5,
        })
        .expect("record");
        log.flush().expect("flush");
        assert_eq!(log.records(), 2);
        let content = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(content, "320 240\n321 239\n");
    }

    #[test]
    fn test_trajectory_lazy_open() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("trajectory.txt");
        let log = TrajectoryLog::new(path.clone());
        drop(log);
        assert!(!path.exists());
    }

    #[test]
    fn test_yuv_conversion_neutral_gray() {
        let image = RgbImage::from_pixel(2, 2, image::Rgb([128, 128, 128]));
        let (y, u, v) = rgb_to_yuv444(&image);
        assert_eq!(y[0], 128);
        assert_eq!(u[0], 128);
        assert_eq!(v[0], 128);
    }

    #[test]
    fn test_capture_clip_readable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("capture.y4m");
        let mut writer = CaptureWriter::new(path.clone(), 24);
        let image = RgbImage::from_pixel(16, 8, image::Rgb([0, 255, 0]));
        writer.write(&image).expect("frame 1");
        writer.write(&image).expect("frame 2");
        assert_eq!(writer.frames(), 2);
        drop(writer);

        let file = File::open(&path).expect("open clip");
        let mut decoder = y4m::decode(file).expect("parse header");
        assert_eq!(decoder.get_width(), 16);
        assert_eq!(decoder.get_height(), 8);
        assert!(matches!(decoder.get_colorspace(), y4m::Colorspace::C444));
        decoder.read_frame().expect("frame 1 back");
        decoder.read_frame().expect("frame 2 back");
        assert!(decoder.read_frame().is_err());
    }

    #[test]
    fn test_capture_lazy_open() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("capture.y4m");
        let writer = CaptureWriter::new(path.clone(), 24);
        drop(writer);
        assert!(!path.exists());
    }
}
