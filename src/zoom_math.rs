//! Pan/zoom mathematics for the world grid.
//!
//! The world origin sits at the centre of the canvas, shifted by the pan offset:
//! `screen = center + pan + world * zoom`.

use crate::viewport::{ScreenPos, WorldPos};

/// Pan/zoom state of the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub zoom: f32,
    pub pan_x: f32,
    pub pan_y: f32,
}

impl Transform {
    pub fn new(zoom: f32, pan_x: f32, pan_y: f32) -> Self {
        Self { zoom, pan_x, pan_y }
    }

    /// Zoom 1, no pan.
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    /// Screen position to world position, given the canvas centre in screen space.
    pub fn screen_to_world(&self, screen: ScreenPos, center: ScreenPos) -> WorldPos {
        WorldPos::new(
            (screen.x - center.x - self.pan_x) / self.zoom,
            (screen.y - center.y - self.pan_y) / self.zoom,
        )
    }

    /// World position to screen position, given the canvas centre in screen space.
    pub fn world_to_screen(&self, world: WorldPos, center: ScreenPos) -> ScreenPos {
        ScreenPos::new(
            center.x + self.pan_x + world.x * self.zoom,
            center.y + self.pan_y + world.y * self.zoom,
        )
    }

    /// Change zoom while the world point under `cursor` stays put.
    pub fn zoom_to_cursor(&self, new_zoom: f32, cursor: ScreenPos, center: ScreenPos) -> Transform {
        let rel_x = cursor.x - center.x;
        let rel_y = cursor.y - center.y;
        let anchor = self.screen_to_world(cursor, center);

        Transform {
            zoom: new_zoom,
            pan_x: rel_x - anchor.x * new_zoom,
            pan_y: rel_y - anchor.y * new_zoom,
        }
    }

    pub fn pan_by(&self, dx: f32, dy: f32) -> Transform {
        Transform::new(self.zoom, self.pan_x + dx, self.pan_y + dy)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    const CENTER: ScreenPos = ScreenPos { x: 100.0, y: 100.0 };

    #[test]
    fn test_identity_transform() {
        let t = Transform::identity();
        assert_eq!(t.zoom, 1.0);
        assert_eq!(t.pan_x, 0.0);
        assert_eq!(t.pan_y, 0.0);
    }

    #[test]
    fn test_center_maps_to_origin() {
        let t = Transform::new(4.0, 0.0, 0.0);
        let w = t.screen_to_world(CENTER, CENTER);
        assert!(approx_eq(w.x, 0.0));
        assert!(approx_eq(w.y, 0.0));
    }

    #[test]
    fn test_screen_world_inverse() {
        let t = Transform::new(3.0, 17.0, -42.0);
        let screen = ScreenPos::new(250.0, 13.0);
        let back = t.world_to_screen(t.screen_to_world(screen, CENTER), CENTER);
        assert!(approx_eq(back.x, screen.x));
        assert!(approx_eq(back.y, screen.y));
    }

    #[test]
    fn test_zoom_to_cursor_at_center() {
        // Zooming at the center should not change pan
        let t = Transform::identity();
        let new_t = t.zoom_to_cursor(2.0, CENTER, CENTER);

        assert_eq!(new_t.zoom, 2.0);
        assert!(approx_eq(new_t.pan_x, 0.0));
        assert!(approx_eq(new_t.pan_y, 0.0));
    }

    #[test]
    fn test_zoom_to_cursor_preserves_cursor_point() {
        let t = Transform::new(1.0, 50.0, 30.0);
        let cursor = ScreenPos::new(150.0, 120.0);

        let before = t.screen_to_world(cursor, CENTER);
        let new_t = t.zoom_to_cursor(2.0, cursor, CENTER);
        let after = new_t.screen_to_world(cursor, CENTER);

        assert!(approx_eq(before.x, after.x));
        assert!(approx_eq(before.y, after.y));
    }

    #[test]
    fn test_pan_by() {
        let t = Transform::new(1.0, 10.0, 20.0);
        let new_t = t.pan_by(5.0, -10.0);

        assert_eq!(new_t.zoom, 1.0);
        assert_eq!(new_t.pan_x, 15.0);
        assert_eq!(new_t.pan_y, 10.0);
    }

    #[test]
    fn test_zoom_out_around_offset_cursor() {
        let t = Transform::new(10.0, -100.0, -100.0);
        let cursor = ScreenPos::new(40.0, 160.0);
        let new_t = t.zoom_to_cursor(5.0, cursor, CENTER);

        assert_eq!(new_t.zoom, 5.0);
        let w = new_t.screen_to_world(cursor, CENTER);
        assert!(approx_eq(w.x, 4.0));
        assert!(approx_eq(w.y, 16.0));
    }
}
