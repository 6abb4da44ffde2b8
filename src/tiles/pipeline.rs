use crate::{
    core::geo::TileCoord,
    rendering::TileDraw,
    tiles::{
        cache::{TileCache, TileEntry},
        loader::{TileFetch, TileLoader},
    },
};

/// Couples the loader and the cache: requests what a frame needs, files what
/// the loader brings back.
pub struct TilePipeline {
    loader: TileLoader,
    cache: TileCache,
}

impl TilePipeline {
    pub fn new(loader: TileLoader, cache_size: usize) -> Self {
        Self {
            loader,
            cache: TileCache::new(cache_size),
        }
    }

    /// Starts downloads for tiles neither cached nor in flight.
    /// Returns the number of new requests.
    pub fn request<'a>(&mut self, tiles: impl IntoIterator<Item = &'a TileDraw>) -> usize {
        let mut started = 0;
        for tile in tiles {
            if self.cache.contains(&tile.coord) || self.loader.is_in_flight(&tile.coord) {
                continue;
            }
            self.loader.start_download(tile.coord, tile.url.clone());
            started += 1;
        }
        started
    }

    /// Moves finished downloads into the cache; returns tiles that became
    /// drawable.
    pub fn pump(&mut self) -> Vec<TileCoord> {
        let mut ready = Vec::new();
        for (coord, outcome) in self.loader.poll_completed() {
            let entry = match outcome {
                TileFetch::Loaded(bytes) => {
                    ready.push(coord);
                    TileEntry::Ready(bytes)
                }
                TileFetch::Absent => TileEntry::Absent,
                TileFetch::Failed(reason) => {
                    log::warn!("tile {} left blank: {}", coord, reason);
                    TileEntry::Failed
                }
            };
            self.cache.insert(coord, entry);
        }
        ready
    }

    pub fn get(&mut self, coord: &TileCoord) -> Option<&TileEntry> {
        self.cache.get(coord)
    }

    pub fn cache(&self) -> &TileCache {
        &self.cache
    }

    pub fn loader(&self) -> &TileLoader {
        &self.loader
    }
}
