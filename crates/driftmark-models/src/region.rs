//! Normalized frame regions and watermark placements.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A normalized rectangle (0.0 to 1.0) reserved by a placed watermark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Region {
    /// X coordinate of the top-left corner (0.0 = left, 1.0 = right)
    pub x: f64,
    /// Y coordinate of the top-left corner (0.0 = top, 1.0 = bottom)
    pub y: f64,
    /// Width of the rectangle (0.0 to 1.0)
    pub width: f64,
    /// Height of the rectangle (0.0 to 1.0)
    pub height: f64,
}

impl Region {
    /// Create a new region.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Region of the given normalized size centered on `(cx, cy)`, clipped to
    /// the unit square.
    pub fn centered(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        let left = (cx - width / 2.0).clamp(0.0, 1.0);
        let right = (cx + width / 2.0).clamp(0.0, 1.0);
        let top = (cy - height / 2.0).clamp(0.0, 1.0);
        let bottom = (cy + height / 2.0).clamp(0.0, 1.0);

        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Axis-aligned overlap test.
    ///
    /// Two regions overlap unless one lies entirely to the left, right,
    /// above or below the other. Touching edges do not count as overlap.
    pub fn overlaps(&self, other: &Region) -> bool {
        !(self.right() <= other.x
            || other.right() <= self.x
            || self.bottom() <= other.y
            || other.bottom() <= self.y)
    }

    /// Check that every coordinate lies within the unit square.
    pub fn is_within_frame(&self) -> bool {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        in_unit(self.x)
            && in_unit(self.y)
            && self.width >= 0.0
            && self.height >= 0.0
            && self.right() <= 1.0 + f64::EPSILON
            && self.bottom() <= 1.0 + f64::EPSILON
    }
}

/// Normalized center point assigned to one watermark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Placement {
    /// Watermark index (0-based)
    pub index: usize,
    /// Horizontal center as a fraction of frame width
    pub x: f64,
    /// Vertical center as a fraction of frame height
    pub y: f64,
}

impl Placement {
    pub fn new(index: usize, x: f64, y: f64) -> Self {
        Self { index, x, y }
    }
}
