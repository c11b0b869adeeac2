//! Wall segment geometry
//!
//! Walls are line segments in world space. The only query the simulation
//! needs is point-to-segment distance, which governs both wall collisions
//! and (through the proximity radii) arrival checks.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An impassable wall segment between two points in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    /// First endpoint
    pub a: Vec2,
    /// Second endpoint
    pub b: Vec2,
}

impl Wall {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            a: Vec2::new(x0, y0),
            b: Vec2::new(x1, y1),
        }
    }

    /// Distance from `point` to the closest point on this segment.
    ///
    /// The projection parameter is clamped to [0, 1], so points whose
    /// perpendicular foot falls past an endpoint measure to that endpoint
    /// rather than to the extended line.
    pub fn distance_to(&self, point: Vec2) -> f32 {
        let seg = self.b - self.a;
        let to_point = point - self.a;
        let len_sq = seg.length_squared();

        if len_sq < 1e-8 {
            // Degenerate wall, both endpoints coincide
            return to_point.length();
        }

        let t = (to_point.dot(seg) / len_sq).clamp(0.0, 1.0);
        let closest = self.a + seg * t;
        (point - closest).length()
    }
}
