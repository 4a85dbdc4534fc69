//! Interfaces to the external canvas collaborators.
//!
//! The [`Viewport`] owns the drawn grid and its pan/zoom transform; [`Place`] is the
//! live channel that authors pixels on the shared canvas. Both are implemented by
//! the host application. [`crate::canvas::GridCanvas`] is an in-memory version.

use image::{Rgb, Rgba};

use crate::model::WorldPixel;

/// Position in screen space (host window units).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPos {
    pub x: f32,
    pub y: f32,
}

impl ScreenPos {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Continuous position on the world grid. Pixel `(x, y)` covers `[x, x+1) × [y, y+1)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
}

impl WorldPos {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Square of the given edge length centred on a point.
    pub fn centered(center: ScreenPos, size: f32) -> Self {
        Self::new(center.x - size / 2.0, center.y - size / 2.0, size, size)
    }

    pub fn center(&self) -> ScreenPos {
        ScreenPos::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Grow the rectangle by `margin` on every side.
    pub fn expanded(&self, margin: f32) -> Self {
        Self::new(
            self.x - margin,
            self.y - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }

    /// True if the two rectangles overlap (touching edges count).
    pub fn intersects(&self, other: &ScreenRect) -> bool {
        self.x <= other.right()
            && other.x <= self.right()
            && self.y <= other.bottom()
            && other.y <= self.bottom()
    }

    pub fn contains(&self, pos: ScreenPos) -> bool {
        pos.x >= self.x && pos.x <= self.right() && pos.y >= self.y && pos.y <= self.bottom()
    }
}

/// The rendering and pan/zoom engine that owns the canvas.
pub trait Viewport {
    /// Map a screen position to the world. `None` when the position has no valid mapping.
    fn screen_to_world(&self, screen: ScreenPos) -> Option<WorldPos>;

    /// Screen units per world pixel.
    fn zoom(&self) -> f32;

    fn set_zoom(&mut self, zoom: f32);

    /// Move the view by a screen-space delta.
    fn pan_by(&mut self, dx: f32, dy: f32);

    /// Screen rectangle occupied by the canvas.
    fn screen_bounds(&self) -> ScreenRect;

    /// The host window changed size.
    fn resize(&mut self, width: f32, height: f32);

    /// Current colour of a world pixel.
    fn color_at(&self, pixel: WorldPixel) -> Rgba<u8>;

    fn grid_enabled(&self) -> bool;

    fn set_grid(&mut self, enabled: bool);

    /// Redraw after a state change.
    fn draw(&mut self);
}

/// Live pixel-authoring channel to the shared canvas.
pub trait Place {
    fn set_pixel(&mut self, x: i32, y: i32, color: Rgb<u8>);
}
