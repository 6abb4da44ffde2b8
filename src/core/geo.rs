use crate::constants::COORDINATE_EPSILON;
use serde::{Deserialize, Serialize};

/// A point in map pixel space or screen space.
///
/// Map space spans `[0, width] × [0, height]` with `y` growing downwards,
/// the same orientation as the source image and the screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn multiply(&self, scalar: f64) -> Point {
        Point::new(self.x * scalar, self.y * scalar)
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn floor(&self) -> Point {
        Point::new(self.x.floor(), self.y.floor())
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Equality up to [`COORDINATE_EPSILON`], used to match server echoes
    /// against locally held coordinates.
    pub fn approx_eq(&self, other: &Point) -> bool {
        (self.x - other.x).abs() <= COORDINATE_EPSILON
            && (self.y - other.y).abs() <= COORDINATE_EPSILON
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// A tile address.
///
/// Coordinates are signed: the tile grid hands out rows in its own
/// convention (negative, see [`crate::tiles::source`]) and out-of-range
/// requests must be representable so they can be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub z: i32,
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub fn new(z: i32, x: i32, y: i32) -> Self {
        Self { z, x, y }
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}
