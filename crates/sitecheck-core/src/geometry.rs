//! Axis-aligned box geometry for layout checks

use serde::{Deserialize, Serialize};

/// Rendered element rectangle in page pixels (top-left corner plus size)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// See [`boxes_intersect`].
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        boxes_intersect(self, other)
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{x: {}, y: {}, width: {}, height: {}}}",
            self.x, self.y, self.width, self.height
        )
    }
}

/// Whether two boxes overlap or touch.
///
/// Separating-axis test with strict comparisons: boxes sharing only an edge
/// count as intersecting.
pub fn boxes_intersect(a: &BoundingBox, b: &BoundingBox) -> bool {
    !(a.right() < b.x || b.right() < a.x || a.bottom() < b.y || b.bottom() < a.y)
}
