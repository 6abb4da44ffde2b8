use crate::{
    backend::MapBackend,
    data::{Location, LocationId, LocationPatch, MapDescriptor, MapId, NewLocation},
    prelude::HashMap,
    Error, Result,
};
use async_trait::async_trait;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex, MutexGuard,
};

#[derive(Default)]
struct Store {
    maps: HashMap<MapId, MapDescriptor>,
    locations: Vec<Location>,
    /// Error returned by the next call, then cleared
    fail_next: Option<String>,
}

/// Backend kept entirely in memory, for tests and the demo app
#[derive(Default)]
pub struct InMemoryBackend {
    store: Mutex<Store>,
    map_fetches: AtomicUsize,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_map(map: MapDescriptor, locations: Vec<Location>) -> Self {
        let backend = Self::new();
        if let Ok(mut store) = backend.store.lock() {
            store.maps.insert(map.id, map);
            store.locations = locations;
        }
        backend
    }

    fn store(&self) -> Result<MutexGuard<'_, Store>> {
        self.store
            .lock()
            .map_err(|_| Error::Backend("in-memory store poisoned".into()))
    }

    /// Takes the simulated failure, if one is armed
    fn check(&self, store: &mut Store) -> Result<()> {
        match store.fail_next.take() {
            Some(reason) => Err(Error::Backend(reason)),
            None => Ok(()),
        }
    }

    pub fn insert_map(&self, map: MapDescriptor) -> Result<()> {
        self.store()?.maps.insert(map.id, map);
        Ok(())
    }

    /// Simulates the tiler finishing: records the pyramid and flips
    /// `tiles_ready`.
    pub fn mark_tiles_ready(&self, map_id: MapId, width: u32, height: u32, max_zoom: u8) -> Result<()> {
        let mut store = self.store()?;
        let map = store
            .maps
            .get_mut(&map_id)
            .ok_or_else(|| Error::NotFound(format!("map {}", map_id)))?;
        *map = map.clone().with_tiles(width, height, max_zoom);
        Ok(())
    }

    /// Makes the next backend call fail with `reason`
    pub fn fail_next(&self, reason: impl Into<String>) -> Result<()> {
        self.store()?.fail_next = Some(reason.into());
        Ok(())
    }

    /// Number of `fetch_map` calls so far
    pub fn map_fetches(&self) -> usize {
        self.map_fetches.load(Ordering::SeqCst)
    }

    pub fn locations(&self) -> Result<Vec<Location>> {
        Ok(self.store()?.locations.clone())
    }
}

#[async_trait]
impl MapBackend for InMemoryBackend {
    async fn fetch_map(&self, map_id: MapId) -> Result<MapDescriptor> {
        self.map_fetches.fetch_add(1, Ordering::SeqCst);
        let mut store = self.store()?;
        self.check(&mut store)?;
        store
            .maps
            .get(&map_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("map {}", map_id)))
    }

    async fn fetch_locations(&self, map_id: MapId) -> Result<Vec<Location>> {
        let mut store = self.store()?;
        self.check(&mut store)?;
        Ok(store
            .locations
            .iter()
            .filter(|l| l.map_id == map_id)
            .cloned()
            .collect())
    }

    async fn create_location(&self, data: NewLocation) -> Result<Location> {
        let mut store = self.store()?;
        self.check(&mut store)?;
        if !store.maps.contains_key(&data.map_id) {
            return Err(Error::NotFound(format!("map {}", data.map_id)));
        }
        let location = data.into_location(LocationId::new_v4());
        store.locations.push(location.clone());
        Ok(location)
    }

    async fn update_location(&self, id: LocationId, patch: LocationPatch) -> Result<Location> {
        let mut store = self.store()?;
        self.check(&mut store)?;
        let location = store
            .locations
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| Error::NotFound(format!("location {}", id)))?;
        location.apply(&patch);
        Ok(location.clone())
    }

    async fn delete_location(&self, id: LocationId) -> Result<()> {
        let mut store = self.store()?;
        self.check(&mut store)?;
        let before = store.locations.len();
        store.locations.retain(|l| l.id != id);
        if store.locations.len() == before {
            return Err(Error::NotFound(format!("location {}", id)));
        }
        Ok(())
    }
}
