//! Single-channel image frames.

use image::{GrayImage, ImageBuffer, Luma};

/// A single 8-bit monochrome frame.
///
/// Data is stored row-major, one byte per pixel. Frames are immutable once
/// captured; each loop clones its own copy before mutating it for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Raw pixel data, `width * height` bytes
    pub data: Vec<u8>,
}

impl Frame {
    /// Create a frame from raw pixel data.
    ///
    /// The caller must ensure the buffer length is `width * height`.
    pub fn from_pixels(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), (width * height) as usize);
        Self {
            width,
            height,
            data,
        }
    }

    /// Create a uniform frame filled with a single intensity.
    pub fn uniform(width: u32, height: u32, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; (width * height) as usize],
        }
    }

    /// Get the pixel value at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get((y * self.width + x) as usize).copied()
    }

    /// Set the pixel value at (x, y). Out-of-bounds writes are ignored.
    pub fn put(&mut self, x: u32, y: u32, value: u8) {
        if x < self.width && y < self.height {
            self.data[(y * self.width + x) as usize] = value;
        }
    }

    /// View this frame as a grayscale image buffer (copies the data).
    pub fn to_gray_image(&self) -> GrayImage {
        ImageBuffer::<Luma<u8>, Vec<u8>>::from_raw(self.width, self.height, self.data.clone())
            .unwrap_or_else(|| GrayImage::new(self.width, self.height))
    }

    /// Build a frame from a grayscale image buffer.
    pub fn from_gray_image(img: GrayImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }

    /// Frame center coordinate, used as the control setpoint.
    pub fn center(&self) -> (u32, u32) {
        (self.width / 2, self.height / 2)
    }
}
