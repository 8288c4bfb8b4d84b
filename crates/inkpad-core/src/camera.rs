//! Camera view state, consumed to derive viewport bounds.
//!
//! The engine does not own or mutate the camera; the host supplies one so
//! that renderers can derive the world-space viewport for culling queries.

use crate::bounds::Bounds;
use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Pan/zoom/rotation view state over the unbounded canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Screen-space pan offset.
    pub x: f64,
    pub y: f64,
    /// Zoom factor, always > 0.
    pub zoom: f64,
    /// View rotation in radians. Not folded into viewport bounds.
    pub rotation: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
            rotation: 0.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// World-to-screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(Vec2::new(self.x, self.y)) * Affine::scale(self.zoom)
    }

    /// Screen-to-world transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(Vec2::new(-self.x, -self.y))
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// World-space rectangle currently visible for a viewport of the given
    /// screen size. This is what culling queries take.
    pub fn viewport_bounds(&self, viewport: Size) -> Bounds {
        Bounds::new(
            -self.x / self.zoom,
            -self.y / self.zoom,
            viewport.width / self.zoom,
            viewport.height / self.zoom,
        )
    }
}
