//! Geometry helpers shared by hit testing and the canvas controller.

use serde::{Deserialize, Serialize};

/// A 2D point. Used for both map-space and screen-space coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Whether both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Distance from `p` to the segment `a`-`b`, clamped to the endpoints.
///
/// A zero-length segment degenerates to the distance to `a`.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;

    let t = if len_sq != 0.0 {
        ((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq
    } else {
        -1.0
    };

    let closest = if t < 0.0 {
        a
    } else if t > 1.0 {
        b
    } else {
        Point::new(a.x + t * dx, a.y + t * dy)
    };

    p.distance_to(closest)
}

/// Strict test against a box of the given half extents centered at `center`.
pub fn within_half_extents_strict(p: Point, center: Point, half_w: f32, half_h: f32) -> bool {
    (p.x - center.x).abs() < half_w && (p.y - center.y).abs() < half_h
}

/// Inclusive test against a box of the given half extents centered at `center`.
pub fn within_half_extents(p: Point, center: Point, half_w: f32, half_h: f32) -> bool {
    p.x >= center.x - half_w
        && p.x <= center.x + half_w
        && p.y >= center.y - half_h
        && p.y <= center.y + half_h
}

/// Inclusive test against a box anchored at its top-left corner.
pub fn within_rect(p: Point, origin: Point, width: f32, height: f32) -> bool {
    p.x >= origin.x && p.x <= origin.x + width && p.y >= origin.y && p.y <= origin.y + height
}
