//! Tile URL resolution.
//!
//! The tile grid addresses rows the way the grid walks them from its
//! top-left origin: the first row is `-1`, the next `-2`, and so on. The tile
//! service publishes them as `0, 1, ...`, so a grid row `r` is fetched as
//! row `-r - 1`. Requests outside the pyramid resolve to `None` and are never
//! fetched; a blank tile at the map edge is expected, not an error.

use crate::{core::geo::TileCoord, data::MapId};

/// Trait representing anything that can produce tile URLs for a grid coordinate.
pub trait TileSource: Send + Sync {
    /// Build a URL for the requested grid `coord`, or `None` when no tile
    /// exists there.
    fn url(&self, coord: TileCoord) -> Option<String>;

    /// Published address of the grid `coord`; doubles as the cache key.
    fn published(&self, coord: TileCoord) -> Option<TileCoord>;
}

/// Tiles served by the map service under `{base}/tiles/{map_id}/{z}/{x}/{y}.png`.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelTileSource {
    base_url: String,
    map_id: MapId,
    max_zoom: u8,
}

impl PixelTileSource {
    pub fn new(base_url: impl Into<String>, map_id: MapId, max_zoom: u8) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            map_id,
            max_zoom,
        }
    }

    /// Converts a grid coordinate to the published `(z, x, y)` address.
    pub fn published_coord(&self, coord: TileCoord) -> Option<TileCoord> {
        let z = coord.z;
        let x = coord.x;
        // widen first: -i32::MIN overflows
        let y = -i64::from(coord.y) - 1;

        if z < 0 || z > i32::from(self.max_zoom) || x < 0 || y < 0 {
            return None;
        }
        let y = i32::try_from(y).ok()?;
        Some(TileCoord::new(z, x, y))
    }

    /// Grid row for a published row, the inverse of [`Self::published_coord`].
    pub fn grid_row(published_row: i32) -> i32 {
        -published_row - 1
    }

    pub fn map_id(&self) -> MapId {
        self.map_id
    }
}

impl TileSource for PixelTileSource {
    fn url(&self, coord: TileCoord) -> Option<String> {
        let tile = self.published_coord(coord)?;
        Some(format!(
            "{}/tiles/{}/{}/{}/{}.png",
            self.base_url, self.map_id, tile.z, tile.x, tile.y
        ))
    }

    fn published(&self, coord: TileCoord) -> Option<TileCoord> {
        self.published_coord(coord)
    }
}
