//! Pan/zoom viewport and the screen/map coordinate mapping.
//!
//! Screen space is pixels inside the canvas element; map space is the
//! unscaled coordinate system of the background image. The canvas draws the
//! map translated by `pan` and then scaled by `zoom` around its top-left
//! corner, so:
//!
//! ```text
//! map = (screen - origin - pan) / zoom
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::{WHEEL_ZOOM_IN, WHEEL_ZOOM_OUT, ZOOM_MAX, ZOOM_MIN, ZOOM_STEP};
use crate::geometry::Point;

/// Pan/zoom transform state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub zoom: f32,
    pub pan_x: f32,
    pub pan_y: f32,
}

impl Viewport {
    /// Create a viewport with the given zoom (clamped) and pan.
    pub fn new(zoom: f32, pan_x: f32, pan_y: f32) -> Self {
        Self {
            zoom: clamp_zoom(zoom),
            pan_x,
            pan_y,
        }
    }

    /// Create an identity viewport (zoom=1, no pan).
    pub fn identity() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }

    pub fn pan(&self) -> Point {
        Point::new(self.pan_x, self.pan_y)
    }

    /// Map a screen-space pointer position to map space.
    ///
    /// `origin` is the screen position of the canvas' top-left corner.
    pub fn screen_to_map(&self, screen: Point, origin: Point) -> Point {
        Point::new(
            (screen.x - origin.x - self.pan_x) / self.zoom,
            (screen.y - origin.y - self.pan_y) / self.zoom,
        )
    }

    /// Inverse of [`Viewport::screen_to_map`].
    pub fn map_to_screen(&self, map: Point, origin: Point) -> Point {
        Point::new(
            map.x * self.zoom + self.pan_x + origin.x,
            map.y * self.zoom + self.pan_y + origin.y,
        )
    }

    /// Multiply the zoom by `factor`, clamped to the allowed range.
    pub fn zoom_by(&self, factor: f32) -> Viewport {
        Viewport {
            zoom: clamp_zoom(self.zoom * factor),
            ..*self
        }
    }

    /// Zoom in by one step.
    pub fn zoom_in(&self) -> Viewport {
        self.zoom_by(ZOOM_STEP)
    }

    /// Zoom out by one step.
    pub fn zoom_out(&self) -> Viewport {
        self.zoom_by(1.0 / ZOOM_STEP)
    }

    /// Apply a wheel tick. Positive `delta_y` (scrolling down) zooms out.
    pub fn wheel(&self, delta_y: f32) -> Viewport {
        let factor = if delta_y > 0.0 {
            WHEEL_ZOOM_OUT
        } else {
            WHEEL_ZOOM_IN
        };
        self.zoom_by(factor)
    }

    /// Anchor for a pan drag starting at `pointer` (screen space).
    pub fn pan_anchor(&self, pointer: Point) -> Point {
        pointer - self.pan()
    }

    /// Pan so that the anchor recorded by [`Viewport::pan_anchor`] follows
    /// the pointer.
    pub fn pan_to(&self, pointer: Point, anchor: Point) -> Viewport {
        let pan = pointer - anchor;
        Viewport {
            pan_x: pan.x,
            pan_y: pan.y,
            ..*self
        }
    }

    /// Whether zoom is inside the clamp range and pan is finite.
    pub fn is_valid(&self) -> bool {
        self.zoom.is_finite()
            && (ZOOM_MIN..=ZOOM_MAX).contains(&self.zoom)
            && self.pan().is_finite()
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::identity()
    }
}

fn clamp_zoom(zoom: f32) -> f32 {
    zoom.clamp(ZOOM_MIN, ZOOM_MAX)
}
