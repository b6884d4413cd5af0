//! Overlay rendering for the operator view.
//!
//! The smoothed frame is expanded to RGB and two overlays are drawn on it:
//! a green rectangle outlining the current ROI and a red circle around the
//! located feature. The same annotated image feeds both the display window
//! and the capture clip, so what the operator sees is what gets recorded.

use crate::frame::Frame;
use crate::roi::Roi;
use crate::types::TrackedPosition;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

const ROI_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const MARKER_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const MARKER_RADIUS: i32 = 29;

/// Expand a monochrome frame to RGB.
pub fn to_rgb(frame: &Frame) -> RgbImage {
    let mut rgb = RgbImage::new(frame.width, frame.height);
    for (src, dst) in frame.data.iter().zip(rgb.pixels_mut()) {
        *dst = Rgb([*src, *src, *src]);
    }
    rgb
}

/// Draw the ROI outline and feature marker onto an RGB image.
pub fn draw_overlays(image: &mut RgbImage, roi: &Roi, position: Option<&TrackedPosition>) {
    draw_hollow_rect_mut(
        image,
        Rect::at(roi.x as i32, roi.y as i32).of_size(roi.width.max(1), roi.height.max(1)),
        ROI_COLOR,
    );
    if let Some(pos) = position {
        draw_hollow_circle_mut(
            image,
            (pos.x as i32, pos.y as i32),
            MARKER_RADIUS,
            MARKER_COLOR,
        );
    }
}

/// Build the full annotated view for one cycle.
pub fn annotate(frame: &Frame, roi: &Roi, position: Option<&TrackedPosition>) -> RgbImage {
    let mut image = to_rgb(frame);
    draw_overlays(&mut image, roi, position);
    image
}
