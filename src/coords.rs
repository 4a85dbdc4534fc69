//! Screen position to world pixel resolution.
//!
//! Selection and painting both resolve their target cell through [`resolve_pixel`],
//! so a click always addresses the same cell whichever mode is active.

use crate::model::WorldPixel;
use crate::viewport::{ScreenPos, Viewport, WorldPos};

/// Quantize a world position to the pixel cell containing it.
///
/// Each axis is floored independently: `(3.9, -0.1)` is pixel `(3, -1)`.
pub fn floor_pixel(world: WorldPos) -> WorldPixel {
    WorldPixel::new(world.x.floor() as i32, world.y.floor() as i32)
}

/// Resolve the world pixel under a screen position.
///
/// Returns `None` when the viewport has no mapping for the position; callers treat
/// that as a no-op.
pub fn resolve_pixel<V: Viewport + ?Sized>(viewport: &V, screen: ScreenPos) -> Option<WorldPixel> {
    let world = viewport.screen_to_world(screen)?;
    if !world.x.is_finite() || !world.y.is_finite() {
        log::trace!("Non-finite world position for screen ({}, {})", screen.x, screen.y);
        return None;
    }
    Some(floor_pixel(world))
}
