//! In-memory canvas implementing both [`Viewport`] and [`Place`].
//!
//! Backs the world grid with an `RgbaImage` whose pixel `(0, 0)` is world pixel
//! `(0, 0)`. Used for headless operation and tests; it does not render anything.

use image::{Rgb, Rgba, RgbaImage};

use crate::model::WorldPixel;
use crate::viewport::{Place, ScreenPos, ScreenRect, Viewport, WorldPos};
use crate::zoom_math::Transform;

/// Headless canvas with a pan/zoom transform.
#[derive(Debug, Clone)]
pub struct GridCanvas {
    image: RgbaImage,
    transform: Transform,
    bounds: ScreenRect,
    grid: bool,
    draw_count: u64,
}

impl GridCanvas {
    /// Create a canvas of `width × height` world pixels filled with `fill`,
    /// shown in a screen area of `bounds`.
    pub fn new(width: u32, height: u32, fill: Rgba<u8>, bounds: ScreenRect) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, fill),
            transform: Transform::identity(),
            bounds,
            grid: false,
            draw_count: 0,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Number of `draw` calls so far.
    pub fn draw_count(&self) -> u64 {
        self.draw_count
    }

    /// Screen position of a world position under the current transform.
    pub fn world_to_screen(&self, world: WorldPos) -> ScreenPos {
        self.transform.world_to_screen(world, self.bounds.center())
    }

    fn image_coords(&self, pixel: WorldPixel) -> Option<(u32, u32)> {
        let x = u32::try_from(pixel.x).ok()?;
        let y = u32::try_from(pixel.y).ok()?;
        (x < self.image.width() && y < self.image.height()).then_some((x, y))
    }
}

impl Viewport for GridCanvas {
    fn screen_to_world(&self, screen: ScreenPos) -> Option<WorldPos> {
        if !self.bounds.contains(screen) {
            return None;
        }
        let world = self.transform.screen_to_world(screen, self.bounds.center());
        let inside = world.x >= 0.0
            && world.y >= 0.0
            && world.x < self.image.width() as f32
            && world.y < self.image.height() as f32;
        inside.then_some(world)
    }

    fn zoom(&self) -> f32 {
        self.transform.zoom
    }

    fn set_zoom(&mut self, zoom: f32) {
        let center = self.bounds.center();
        self.transform = self.transform.zoom_to_cursor(zoom, center, center);
    }

    fn pan_by(&mut self, dx: f32, dy: f32) {
        self.transform = self.transform.pan_by(dx, dy);
    }

    fn screen_bounds(&self) -> ScreenRect {
        self.bounds
    }

    fn resize(&mut self, width: f32, height: f32) {
        self.bounds.width = width;
        self.bounds.height = height;
    }

    fn color_at(&self, pixel: WorldPixel) -> Rgba<u8> {
        self.image_coords(pixel)
            .map(|(x, y)| *self.image.get_pixel(x, y))
            .unwrap_or(Rgba([0, 0, 0, 0]))
    }

    fn grid_enabled(&self) -> bool {
        self.grid
    }

    fn set_grid(&mut self, enabled: bool) {
        self.grid = enabled;
    }

    fn draw(&mut self) {
        self.draw_count += 1;
    }
}

impl Place for GridCanvas {
    fn set_pixel(&mut self, x: i32, y: i32, color: Rgb<u8>) {
        match self.image_coords(WorldPixel::new(x, y)) {
            Some((ix, iy)) => {
                let [r, g, b] = color.0;
                self.image.put_pixel(ix, iy, Rgba([r, g, b, 255]));
            }
            None => log::warn!("Ignoring pixel outside the canvas: ({}, {})", x, y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> GridCanvas {
        GridCanvas::new(
            64,
            64,
            Rgba([255, 255, 255, 255]),
            ScreenRect::new(0.0, 0.0, 200.0, 100.0),
        )
        .with_transform(Transform::new(4.0, 0.0, 0.0))
    }

    #[test]
    fn test_outside_screen_bounds_has_no_mapping() {
        let c = canvas();
        assert!(c.screen_to_world(ScreenPos::new(-1.0, 50.0)).is_none());
        assert!(c.screen_to_world(ScreenPos::new(50.0, 101.0)).is_none());
    }

    #[test]
    fn test_outside_image_has_no_mapping() {
        let c = canvas();
        // Left of the centre is negative world x
        assert!(c.screen_to_world(ScreenPos::new(90.0, 60.0)).is_none());
        let w = c.screen_to_world(ScreenPos::new(110.0, 60.0)).unwrap();
        assert_eq!((w.x, w.y), (2.5, 2.5));
    }

    #[test]
    fn test_set_zoom_keeps_center_fixed() {
        let mut c = canvas().with_transform(Transform::new(2.0, -40.0, -20.0));
        let center = c.screen_bounds().center();
        let before = c.screen_to_world(center).unwrap();
        c.set_zoom(8.0);
        let after = c.screen_to_world(center).unwrap();
        assert!((before.x - after.x).abs() < 1e-4);
        assert!((before.y - after.y).abs() < 1e-4);
        assert_eq!(c.zoom(), 8.0);
    }

    #[test]
    fn test_set_pixel_and_read_back() {
        let mut c = canvas();
        c.set_pixel(3, 4, Rgb([10, 20, 30]));
        assert_eq!(c.color_at(WorldPixel::new(3, 4)), Rgba([10, 20, 30, 255]));
        assert_eq!(c.color_at(WorldPixel::new(-1, 4)), Rgba([0, 0, 0, 0]));
    }
}
