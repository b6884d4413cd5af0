//! Feature location by smoothed intensity extremum.
//!
//! The whole frame is Gaussian-smoothed, then the region of interest is
//! scanned for the darkest (or brightest) pixel. Smoothing the full frame
//! rather than the ROI crop keeps the result identical when the ROI moves:
//! the blur has no crop-edge artifacts that would shift the extremum.

use crate::frame::Frame;
use crate::roi::Roi;
use crate::types::{Polarity, TrackedPosition};
use imageproc::filter::gaussian_blur_f32;

/// Locates the tracked feature within a region of interest.
#[derive(Debug, Clone)]
pub struct FeatureLocator {
    sigma: f32,
    polarity: Polarity,
}

impl FeatureLocator {
    /// Create a locator with the given smoothing sigma and polarity.
    pub fn new(sigma: f32, polarity: Polarity) -> Self {
        Self { sigma, polarity }
    }

    /// Smooth the frame and return the smoothed copy.
    ///
    /// Exposed separately so the annotated output shows the same image the
    /// scan ran on.
    pub fn smooth(&self, frame: &Frame) -> Frame {
        Frame::from_gray_image(gaussian_blur_f32(&frame.to_gray_image(), self.sigma))
    }

    /// Scan an already-smoothed frame for the extremum inside `roi`.
    ///
    /// Ties resolve to the first pixel in row-major order (strict compare),
    /// so a uniform ROI yields its top-left corner. The ROI is assumed to
    /// lie within the frame; out-of-bounds rows and columns are skipped.
    pub fn scan(&self, smoothed: &Frame, roi: &Roi) -> TrackedPosition {
        let mut best = TrackedPosition {
            x: roi.x,
            y: roi.y,
            value: match self.polarity {
                Polarity::Dark => u8::MAX,
                Polarity::Bright => u8::MIN,
            },
        };

        let x_end = (roi.x + roi.width).min(smoothed.width);
        let y_end = (roi.y + roi.height).min(smoothed.height);
        for y in roi.y..y_end {
            let row = &smoothed.data[(y * smoothed.width) as usize..];
            for x in roi.x..x_end {
                let value = row[x as usize];
                let better = match self.polarity {
                    Polarity::Dark => value < best.value,
                    Polarity::Bright => value > best.value,
                };
                if better {
                    best = TrackedPosition { x, y, value };
                }
            }
        }
        best
    }

    /// Smooth the frame, then scan the ROI. Returns the smoothed frame
    /// alongside the located position.
    pub fn locate(&self, frame: &Frame, roi: &Roi) -> (Frame, TrackedPosition) {
        let smoothed = self.smooth(frame);
        let position = self.scan(&smoothed, roi);
        (smoothed, position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_spot(width: u32, height: u32, bg: u8, spot: (u32, u32), value: u8) -> Frame {
        let mut frame = Frame::uniform(width, height, bg);
        frame.put(spot.0, spot.1, value);
        frame
    }

    #[test]
    fn test_scan_finds_dark_extremum() {
        let frame = frame_with_spot(200, 200, 200, (150, 60), 0);
        let locator = FeatureLocator::new(1.0, Polarity::Dark);
        let roi = Roi {
            x: 100,
            y: 20,
            width: 100,
            height: 100,
        };
        let pos = locator.scan(&frame, &roi);
        assert_eq!((pos.x, pos.y), (150, 60));
        assert_eq!(pos.value, 0);
    }

    #[test]
    fn test_scan_finds_bright_extremum() {
        let frame = frame_with_spot(200, 200, 20, (30, 40), 255);
        let locator = FeatureLocator::new(1.0, Polarity::Bright);
        let roi = Roi {
            x: 0,
            y: 0,
            width: 100,
            height: 100,
        };
        let pos = locator.scan(&frame, &roi);
        assert_eq!((pos.x, pos.y), (30, 40));
    }

    #[test]
    fn test_scan_ignores_extremum_outside_roi() {
        // Two dark spots; only the one inside the ROI counts.
        let mut frame = Frame::uniform(200, 200, 200);
        frame.put(10, 10, 0);
        frame.put(150, 150, 5);
        let locator = FeatureLocator::new(1.0, Polarity::Dark);
        let roi = Roi {
            x: 100,
            y: 100,
            width: 100,
            height: 100,
        };
        let pos = locator.scan(&frame, &roi);
        assert_eq!((pos.x, pos.y), (150, 150));
    }

    #[test]
    fn test_uniform_roi_ties_to_top_left() {
        let frame = Frame::uniform(100, 100, 128);
        let locator = FeatureLocator::new(1.0, Polarity::Dark);
        let roi = Roi {
            x: 25,
            y: 35,
            width: 50,
            height: 50,
        };
        let pos = locator.scan(&frame, &roi);
        assert_eq!((pos.x, pos.y), (25, 35));
    }

    #[test]
    fn test_locate_after_smoothing_stays_near_spot() {
        // Smoothing spreads the spot but must not move its extremum far.
        // A blurred single-pixel dip quantizes back to u8 as a small
        // plateau of tied values, and the tie-break picks the plateau's
        // top-left corner, so allow a few pixels of slack.
        let frame = frame_with_spot(200, 200, 200, (100, 100), 0);
        let locator = FeatureLocator::new(3.0, Polarity::Dark);
        let roi = Roi {
            x: 50,
            y: 50,
            width: 100,
            height: 100,
        };
        let (_, pos) = locator.locate(&frame, &roi);
        assert!((pos.x as i32 - 100).abs() <= 4);
        assert!((pos.y as i32 - 100).abs() <= 4);
    }

    #[test]
    fn test_scan_clips_roi_to_frame() {
        let frame = frame_with_spot(100, 100, 200, (99, 99), 0);
        let locator = FeatureLocator::new(1.0, Polarity::Dark);
        // ROI overhangs the bottom-right corner.
        let roi = Roi {
            x: 60,
            y: 60,
            width: 100,
            height: 100,
        };
        let pos = locator.scan(&frame, &roi);
        assert_eq!((pos.x, pos.y), (99, 99));
    }
}
