//! Overlay projection: screen-space markers that track selected world pixels.
//!
//! Every selected pixel owns one marker. Markers are positioned relative to a
//! reference point (the world position under the canvas centre) so that they stay
//! aligned with the grid through any pan or zoom. Markers that fall off-screen are
//! hidden, not destroyed, and come back on the next reprojection.

use std::collections::HashMap;

use crate::constants::MIN_MARKER_SIZE;
use crate::model::WorldPixel;
use crate::viewport::{ScreenPos, ScreenRect, Viewport, WorldPos};

/// Rendering layer for markers (DOM nodes, canvas overlay, native widgets...).
pub trait MarkerSink {
    /// Opaque handle to one rendered marker.
    type Handle;

    /// Create a marker for `pixel`. It stays hidden until shown.
    fn create(&mut self, pixel: WorldPixel) -> Self::Handle;

    /// Show the marker at `rect`.
    fn show(&mut self, handle: &Self::Handle, rect: ScreenRect);

    fn hide(&mut self, handle: &Self::Handle);

    fn destroy(&mut self, handle: Self::Handle);
}

/// Where a marker currently is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    Visible(ScreenRect),
    Hidden,
}

impl Placement {
    pub fn rect(&self) -> Option<ScreenRect> {
        match self {
            Placement::Visible(rect) => Some(*rect),
            Placement::Hidden => None,
        }
    }

    pub fn is_visible(&self) -> bool {
        matches!(self, Placement::Visible(_))
    }
}

/// Snapshot of the viewport parameters needed to place markers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Screen centre and the world position under it; `None` if the centre is unmapped.
    reference: Option<(ScreenPos, WorldPos)>,
    zoom: f32,
    bounds: ScreenRect,
    min_size: f32,
}

impl Projection {
    pub fn capture<V: Viewport + ?Sized>(viewport: &V, min_size: f32) -> Self {
        let bounds = viewport.screen_bounds();
        let center = bounds.center();
        Self {
            reference: viewport.screen_to_world(center).map(|world| (center, world)),
            zoom: viewport.zoom(),
            bounds,
            min_size,
        }
    }

    /// Marker edge length in screen units.
    pub fn marker_size(&self) -> f32 {
        self.zoom.max(self.min_size)
    }

    /// Place the marker for `pixel`, centred on the cell's projected centre.
    pub fn place(&self, pixel: WorldPixel) -> Placement {
        let Some((ref_screen, ref_world)) = self.reference else {
            return Placement::Hidden;
        };

        let center = ScreenPos::new(
            ref_screen.x + (pixel.x as f32 + 0.5 - ref_world.x) * self.zoom,
            ref_screen.y + (pixel.y as f32 + 0.5 - ref_world.y) * self.zoom,
        );
        let size = self.marker_size();
        let rect = ScreenRect::centered(center, size);

        if rect.expanded(size).intersects(&self.bounds) {
            Placement::Visible(rect)
        } else {
            Placement::Hidden
        }
    }
}

/// One marker and the pixel it belongs to.
#[derive(Debug)]
pub struct Marker<H> {
    pixel: WorldPixel,
    placement: Placement,
    handle: H,
}

impl<H> Marker<H> {
    pub fn pixel(&self) -> WorldPixel {
        self.pixel
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }
}

/// Owns the pixel → marker mapping and keeps markers aligned with the viewport.
pub struct OverlayProjector<S: MarkerSink> {
    sink: S,
    markers: HashMap<WorldPixel, Marker<S::Handle>>,
    min_size: f32,
}

impl<S: MarkerSink> OverlayProjector<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            markers: HashMap::new(),
            min_size: MIN_MARKER_SIZE,
        }
    }

    pub fn with_min_size(mut self, min_size: f32) -> Self {
        self.min_size = min_size;
        self
    }

    /// Create and position the marker for `pixel`.
    ///
    /// A pixel that already has a marker keeps it unchanged.
    pub fn place<V: Viewport + ?Sized>(
        &mut self,
        pixel: WorldPixel,
        viewport: &V,
    ) -> &Marker<S::Handle> {
        let projection = Projection::capture(viewport, self.min_size);
        let sink = &mut self.sink;
        self.markers.entry(pixel).or_insert_with(|| {
            let handle = sink.create(pixel);
            let placement = projection.place(pixel);
            apply(sink, &handle, placement);
            Marker {
                pixel,
                placement,
                handle,
            }
        })
    }

    /// Reposition every marker for the viewport's current pan, zoom, and size.
    pub fn reproject_all<V: Viewport + ?Sized>(&mut self, viewport: &V) {
        if self.markers.is_empty() {
            return;
        }
        let projection = Projection::capture(viewport, self.min_size);
        for marker in self.markers.values_mut() {
            marker.placement = projection.place(marker.pixel);
            apply(&mut self.sink, &marker.handle, marker.placement);
        }
        log::trace!("Reprojected {} markers", self.markers.len());
    }

    /// Destroy every marker.
    pub fn remove_all(&mut self) {
        let count = self.markers.len();
        for (_, marker) in self.markers.drain() {
            self.sink.destroy(marker.handle);
        }
        if count > 0 {
            log::trace!("Removed {} markers", count);
        }
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn get(&self, pixel: WorldPixel) -> Option<&Marker<S::Handle>> {
        self.markers.get(&pixel)
    }

    pub fn markers(&self) -> impl Iterator<Item = &Marker<S::Handle>> {
        self.markers.values()
    }

    pub fn visible_count(&self) -> usize {
        self.markers
            .values()
            .filter(|m| m.placement.is_visible())
            .count()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

fn apply<S: MarkerSink>(sink: &mut S, handle: &S::Handle, placement: Placement) {
    match placement {
        Placement::Visible(rect) => sink.show(handle, rect),
        Placement::Hidden => sink.hide(handle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::GridCanvas;
    use crate::testing::RecordingSink;
    use crate::zoom_math::Transform;
    use image::Rgba;

    fn canvas(zoom: f32) -> GridCanvas {
        // Screen centre (50, 50) looks at world (10, 10)
        GridCanvas::new(
            100,
            100,
            Rgba([0, 0, 0, 255]),
            ScreenRect::new(0.0, 0.0, 100.0, 100.0),
        )
        .with_transform(Transform::new(zoom, -10.0 * zoom, -10.0 * zoom))
    }

    fn projector() -> OverlayProjector<RecordingSink> {
        OverlayProjector::new(RecordingSink::default())
    }

    #[test]
    fn test_marker_covers_its_cell() {
        let view = canvas(4.0);
        let mut overlay = projector();
        let marker = overlay.place(WorldPixel::new(12, 9), &view);

        // Cell (12, 9) spans screen x 58..62, y 46..50
        assert_eq!(
            marker.placement(),
            Placement::Visible(ScreenRect::new(58.0, 46.0, 4.0, 4.0))
        );
    }

    #[test]
    fn test_marker_has_minimum_size() {
        let view = canvas(0.5);
        let mut overlay = projector();
        let rect = overlay
            .place(WorldPixel::new(10, 10), &view)
            .placement()
            .rect()
            .unwrap();
        assert_eq!(rect.width, MIN_MARKER_SIZE);
        assert_eq!(rect.height, MIN_MARKER_SIZE);
    }

    #[test]
    fn test_place_twice_keeps_one_marker() {
        let view = canvas(4.0);
        let mut overlay = projector();
        overlay.place(WorldPixel::new(10, 10), &view);
        overlay.place(WorldPixel::new(10, 10), &view);
        assert_eq!(overlay.len(), 1);
        assert_eq!(overlay.sink().created, 1);
    }

    #[test]
    fn test_reprojection_follows_pan() {
        let mut view = canvas(4.0);
        let mut overlay = projector();
        overlay.place(WorldPixel::new(12, 9), &view);

        view.pan_by(10.0, -4.0);
        overlay.reproject_all(&view);

        let rect = overlay
            .get(WorldPixel::new(12, 9))
            .unwrap()
            .placement()
            .rect()
            .unwrap();
        assert_eq!(rect, ScreenRect::new(68.0, 42.0, 4.0, 4.0));
        // Repositioned, never recreated
        assert_eq!(overlay.sink().created, 1);
    }

    #[test]
    fn test_reprojection_is_idempotent() {
        let mut view = canvas(3.0);
        let mut overlay = projector();
        for x in 5..15 {
            overlay.place(WorldPixel::new(x, x), &view);
        }
        view.set_zoom(7.5);

        let snapshot = |overlay: &OverlayProjector<RecordingSink>| {
            let mut placements: Vec<_> = overlay
                .markers()
                .map(|m| (m.pixel(), m.placement()))
                .collect();
            placements.sort_by_key(|(p, _)| *p);
            placements
        };

        overlay.reproject_all(&view);
        let first = snapshot(&overlay);
        overlay.reproject_all(&view);
        assert_eq!(first, snapshot(&overlay));
    }

    #[test]
    fn test_offscreen_marker_is_hidden_then_reshown() {
        let mut view = canvas(4.0);
        let mut overlay = projector();
        let pixel = WorldPixel::new(12, 10);
        overlay.place(pixel, &view);
        assert!(overlay.get(pixel).unwrap().placement().is_visible());

        let handle = *overlay.get(pixel).unwrap().handle();
        assert_eq!(overlay.visible_count(), 1);

        view.pan_by(-500.0, 0.0);
        overlay.reproject_all(&view);
        assert_eq!(overlay.get(pixel).unwrap().placement(), Placement::Hidden);
        assert_eq!(overlay.sink().shown(handle), None);
        assert_eq!(overlay.visible_count(), 0);
        assert_eq!(overlay.len(), 1);

        view.pan_by(500.0, 0.0);
        overlay.reproject_all(&view);
        assert!(overlay.get(pixel).unwrap().placement().is_visible());
        assert_eq!(
            overlay.sink().shown(handle),
            Some(ScreenRect::new(58.0, 50.0, 4.0, 4.0))
        );
        assert_eq!(overlay.sink().created, 1);
    }

    #[test]
    fn test_marker_just_outside_edge_stays_visible() {
        let view = canvas(4.0);
        let mut overlay = projector();
        // Cell (23, 10) is centred at screen x 104, just past the right edge
        let placement = overlay.place(WorldPixel::new(23, 10), &view).placement();
        assert!(placement.is_visible());
        // Far outside the expanded rectangle
        let placement = overlay.place(WorldPixel::new(40, 10), &view).placement();
        assert_eq!(placement, Placement::Hidden);
    }

    #[test]
    fn test_unmapped_center_hides_markers() {
        let mut view = canvas(4.0);
        let mut overlay = projector();
        let pixel = WorldPixel::new(10, 10);
        overlay.place(pixel, &view);

        // Move the grid so nothing maps under the screen centre
        view.pan_by(1000.0, 1000.0);
        overlay.reproject_all(&view);
        assert_eq!(overlay.get(pixel).unwrap().placement(), Placement::Hidden);
    }

    #[test]
    fn test_remove_all_destroys_markers() {
        let view = canvas(4.0);
        let mut overlay = projector();
        overlay.place(WorldPixel::new(10, 10), &view);
        overlay.place(WorldPixel::new(11, 10), &view);
        overlay.remove_all();
        assert!(overlay.is_empty());
        assert_eq!(overlay.sink().live(), 0);
        assert_eq!(overlay.sink().destroyed, 2);
    }
}
