//! Global constants for the place atlas client

use std::time::Duration;

/// Smallest marker edge length in screen units, so markers stay visible when zoomed out
pub const MIN_MARKER_SIZE: f32 = 2.0;

/// Zoom factor for keyboard and button zoom
pub const ZOOM_STEP: f32 = 1.2;

/// Zoom factor for one mouse wheel notch
pub const WHEEL_ZOOM_STEP: f32 = 1.05;

/// Zoom-out is refused once the zoom drops below this level
pub const MIN_ZOOM_FOR_ZOOM_OUT: f32 = 1.0;

/// Pan step size for arrow-key navigation (screen units)
pub const PAN_STEP: f32 = 10.0;

/// A touch released faster than this counts as a tap
pub const TAP_MAX_DURATION: Duration = Duration::from_millis(100);

/// Default selection backend
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

/// Endpoint path for selection records
pub const SELECTIONS_PATH: &str = "/selections";
