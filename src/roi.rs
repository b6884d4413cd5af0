//! Region-of-interest geometry and anchor tracking.

use crate::types::TrackedPosition;

/// An axis-aligned pixel rectangle, anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roi {
    /// Anchor x (left edge)
    pub x: u32,
    /// Anchor y (top edge)
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Roi {
    /// Center coordinate of the rectangle.
    pub fn center(&self) -> (u32, u32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Whether a point lies inside the rectangle.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Maintains the ROI anchor across processing cycles.
///
/// The anchor moves for two reasons: when tracking is enabled it recenters
/// on the feature located in the previous cycle, and operator nudges
/// displace it by a fixed step. After every move the rectangle is pulled
/// back inside the frame; if the ROI is larger than the frame the anchor
/// pins to the origin.
#[derive(Debug, Clone)]
pub struct RoiTracker {
    roi: Roi,
    frame_width: u32,
    frame_height: u32,
}

impl RoiTracker {
    /// Create a tracker with the ROI centered in the frame.
    pub fn new(roi_width: u32, roi_height: u32, frame_width: u32, frame_height: u32) -> Self {
        let x = (frame_width as i64 - roi_width as i64) / 2;
        let y = (frame_height as i64 - roi_height as i64) / 2;
        let mut tracker = Self {
            roi: Roi {
                x: x.max(0) as u32,
                y: y.max(0) as u32,
                width: roi_width,
                height: roi_height,
            },
            frame_width,
            frame_height,
        };
        tracker.clamp();
        tracker
    }

    /// The current rectangle.
    pub fn roi(&self) -> Roi {
        self.roi
    }

    /// Advance the anchor by one cycle.
    ///
    /// `followed` is the feature position from this cycle when tracking is
    /// enabled, `None` otherwise. `nudge` is the accumulated operator
    /// displacement since the last cycle (consumed by the caller).
    pub fn update(&mut self, followed: Option<TrackedPosition>, nudge: (i32, i32)) {
        let mut x = self.roi.x as i64;
        let mut y = self.roi.y as i64;

        if let Some(pos) = followed {
            x = pos.x as i64 - (self.roi.width / 2) as i64;
            y = pos.y as i64 - (self.roi.height / 2) as i64;
        }

        x += nudge.0 as i64;
        y += nudge.1 as i64;

        self.roi.x = x.max(0) as u32;
        self.roi.y = y.max(0) as u32;
        self.clamp();
    }

    /// Pull the rectangle back inside the frame bounds.
    fn clamp(&mut self) {
        let x_max = self.frame_width as i64 - self.roi.width as i64;
        let y_max = self.frame_height as i64 - self.roi.height as i64;
        self.roi.x = (self.roi.x as i64).min(x_max).max(0) as u32;
        self.roi.y = (self.roi.y as i64).min(y_max).max(0) as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(x: u32, y: u32) -> TrackedPosition {
        TrackedPosition { x, y, value: 0 }
    }

    #[test]
    fn test_initial_anchor_centered() {
        let tracker = RoiTracker::new(100, 100, 640, 480);
        assert_eq!(tracker.roi().x, 270);
        assert_eq!(tracker.roi().y, 190);
        assert_eq!(tracker.roi().center(), (320, 240));
    }

    #[test]
    fn test_recenter_on_feature() {
        let mut tracker = RoiTracker::new(100, 100, 640, 480);
        tracker.update(Some(pos(150, 60)), (0, 0));
        assert_eq!(tracker.roi().x, 100);
        assert_eq!(tracker.roi().y, 10);
        assert_eq!(tracker.roi().center(), (150, 60));
    }

    #[test]
    fn test_nudge_without_tracking() {
        let mut tracker = RoiTracker::new(100, 100, 640, 480);
        tracker.update(None, (10, -10));
        assert_eq!(tracker.roi().x, 280);
        assert_eq!(tracker.roi().y, 180);
    }

    #[test]
    fn test_nudge_applies_after_recenter() {
        let mut tracker = RoiTracker::new(100, 100, 640, 480);
        tracker.update(Some(pos(320, 240)), (10, 0));
        assert_eq!(tracker.roi().x, 280);
        assert_eq!(tracker.roi().y, 190);
    }

    #[test]
    fn test_clamps_at_origin() {
        let mut tracker = RoiTracker::new(100, 100, 640, 480);
        tracker.update(Some(pos(5, 5)), (0, 0));
        assert_eq!(tracker.roi().x, 0);
        assert_eq!(tracker.roi().y, 0);
    }

    #[test]
    fn test_clamps_at_far_edge() {
        let mut tracker = RoiTracker::new(100, 100, 640, 480);
        tracker.update(Some(pos(639, 479)), (0, 0));
        assert_eq!(tracker.roi().x, 540);
        assert_eq!(tracker.roi().y, 380);
    }

    #[test]
    fn test_oversize_roi_pins_to_origin() {
        let mut tracker = RoiTracker::new(800, 600, 640, 480);
        assert_eq!((tracker.roi().x, tracker.roi().y), (0, 0));
        tracker.update(Some(pos(300, 300)), (50, 50));
        assert_eq!((tracker.roi().x, tracker.roi().y), (0, 0));
    }

    #[test]
    fn test_bounds_hold_under_arbitrary_nudge_sequence() {
        // Size and position invariants survive any mix of recenters and
        // nudges, including ones that slam the anchor into the edges.
        let mut tracker = RoiTracker::new(100, 80, 640, 480);
        let nudges = [
            (1000, 0),
            (-5000, 300),
            (0, -5000),
            (17, 23),
            (-1, -1),
            (640, 480),
        ];
        let targets = [None, Some(pos(0, 0)), Some(pos(639, 479)), None, Some(pos(320, 240)), None];
        for (nudge, target) in nudges.iter().zip(targets) {
            tracker.update(target, *nudge);
            let roi = tracker.roi();
            assert_eq!((roi.width, roi.height), (100, 80));
            assert!(roi.x + roi.width <= 640);
            assert!(roi.y + roi.height <= 480);
        }
    }

    #[test]
    fn test_nudge_accumulates_across_cycles() {
        let mut tracker = RoiTracker::new(100, 100, 640, 480);
        tracker.update(None, (10, 0));
        tracker.update(None, (10, 0));
        assert_eq!(tracker.roi().x, 290);
    }
}
