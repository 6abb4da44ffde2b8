//! Engine-wide constants for the pixel-space viewer.
//! Keeping them in a single place makes it easier to tweak magic numbers.

/// Square tile size in pixels, fixed by the tile pyramid generator.
pub const TILE_SIZE: u32 = 256;

/// Programmatic +/- zoom step when calling `zoom_in/zoom_out`.
pub const DEFAULT_ZOOM_DELTA: f64 = 1.0;

/// Zoom controls snap to these quanta (0.5 → integer or half steps).
pub const ZOOM_SNAP: f64 = 0.5;

/// Zoom change applied per mouse-wheel notch.
pub const WHEEL_ZOOM_STEP: f64 = 0.5;

/// Duration of the zoom-control animation.
pub const ZOOM_ANIMATION_MS: u64 = 250;

/// Padding (screen pixels) kept around the extent when fitting the view.
pub const FIT_PADDING_PX: f64 = 20.0;

/// Pointer tolerance (screen pixels) around marker icons for hit testing.
pub const HIT_TOLERANCE_PX: f64 = 4.0;

/// Marker icon size in screen pixels at scale 1.0.
pub const MARKER_ICON_SIZE: (f64, f64) = (25.0, 41.0);

/// Interval between tile-readiness polls after an image upload.
pub const TILE_POLL_INTERVAL_MS: u64 = 2_000;

/// Default number of tile images kept in memory.
pub const TILE_CACHE_SIZE: usize = 512;

/// Two coordinates closer than this are considered identical.
pub const COORDINATE_EPSILON: f64 = 1e-6;
