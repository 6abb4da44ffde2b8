use crate::{core::geo::TileCoord, traits::CacheStats};
use lru::LruCache;
use std::{num::NonZeroUsize, sync::Arc};

/// What the viewer knows about a published tile
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileEntry {
    Ready(Arc<[u8]>),
    /// Not published; drawn blank and never requested again
    Absent,
    /// Fetch failed; drawn blank, eligible for a new request after eviction
    Failed,
}

/// LRU cache of tile images keyed by published tile coordinate
pub struct TileCache {
    entries: LruCache<TileCoord, TileEntry>,
    stats: CacheStats,
}

impl TileCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    /// Looks up a tile, refreshing its recency
    pub fn get(&mut self, coord: &TileCoord) -> Option<&TileEntry> {
        match self.entries.get(coord) {
            Some(entry) => {
                self.stats.hits += 1;
                Some(entry)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    pub fn contains(&self, coord: &TileCoord) -> bool {
        self.entries.contains(coord)
    }

    pub fn insert(&mut self, coord: TileCoord, entry: TileEntry) {
        self.entries.put(coord, entry);
    }

    pub fn remove(&mut self, coord: &TileCoord) -> Option<TileEntry> {
        self.entries.pop(coord)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.entries.len(),
            ..self.stats.clone()
        }
    }
}
