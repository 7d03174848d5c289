//! Axis-aligned bounding boxes for player and item overlap tests
//!
//! Entities are positioned by their center, so a box is built from a center
//! and a full size.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in playfield pixels (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Overlap test with touching edges counting as contact.
    /// Degenerate (zero-area) boxes never intersect anything.
    pub fn intersects(&self, other: &Aabb) -> bool {
        if self.width() <= 0.0 || self.height() <= 0.0 {
            return false;
        }
        if other.width() <= 0.0 || other.height() <= 0.0 {
            return false;
        }
        !(self.max.x < other.min.x
            || self.max.y < other.min.y
            || self.min.x > other.max.x
            || self.min.y > other.max.y)
    }
}
