//! Drawing-space geometry utilities.
//!
//! All coordinates are millimeters. The helpers are pure and never
//! propagate NaN: a segment touching a non-finite coordinate contributes
//! zero length.

use serde::{Deserialize, Serialize};

/// Tolerance applied when comparing accumulated lengths against a budget.
pub const LENGTH_EPSILON_MM: f64 = 1e-3;

/// Segments shorter than this are treated as zero-length.
pub const ZERO_LENGTH_MM: f64 = 1e-9;

/// A point in drawing space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns true when both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        distance(*self, *other)
    }
}

/// Euclidean distance between two points, 0 when either is non-finite.
pub fn distance(a: Point, b: Point) -> f64 {
    if !a.is_finite() || !b.is_finite() {
        return 0.0;
    }
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let d = (dx * dx + dy * dy).sqrt();
    if d.is_finite() {
        d
    } else {
        0.0
    }
}

/// Sum of consecutive-pair distances. Returns 0 for fewer than 2 points.
pub fn polyline_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| distance(w[0], w[1])).sum()
}

/// Point at fractional position `t` along `a -> b`, with `t` clamped to [0, 1].
pub fn interpolate(a: Point, b: Point, t: f64) -> Point {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}
