//! Tile readiness polling after an image upload.
//!
//! The tiler runs out of band, so a freshly uploaded map has no pyramid yet.
//! The poller re-fetches the map descriptor on a fixed interval until
//! `tiles_ready` flips, publishes the ready descriptor, and stops. Dropping
//! or cancelling the handle stops it too.

use crate::{
    backend::MapBackend,
    data::{MapDescriptor, MapId},
};
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};

/// Owning handle of a running poller; the task is aborted on drop
pub struct PollHandle {
    task: JoinHandle<()>,
    ready: watch::Receiver<Option<MapDescriptor>>,
}

/// Starts polling `map_id` every `every`. The first check happens right
/// away. Must be called from within a tokio runtime.
pub fn spawn_tile_poller(backend: Arc<dyn MapBackend>, map_id: MapId, every: Duration) -> PollHandle {
    let (tx, ready) = watch::channel(None);

    let task = tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut attempts = 0u32;

        loop {
            ticker.tick().await;
            attempts += 1;
            match backend.fetch_map(map_id).await {
                Ok(map) if map.tiles_ready => {
                    log::info!("tiles for map {} ready after {} checks", map_id, attempts);
                    // nobody listening is fine, the poll is over either way
                    let _ = tx.send(Some(map));
                    break;
                }
                Ok(_) => log::debug!("tiles for map {} not ready (check {})", map_id, attempts),
                Err(e) => log::warn!("tile readiness check for map {} failed: {}", map_id, e),
            }
            if tx.is_closed() {
                log::debug!("tile poller for map {} lost its receiver", map_id);
                break;
            }
        }
    });

    PollHandle { task, ready }
}

impl PollHandle {
    /// Stops polling. Idempotent.
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// The ready descriptor, once the poller has seen one
    pub fn try_ready(&self) -> Option<MapDescriptor> {
        self.ready.borrow().clone()
    }

    /// Waits until tiles are ready. Returns `None` when the poller stopped
    /// without seeing them (cancelled).
    pub async fn wait_ready(&mut self) -> Option<MapDescriptor> {
        loop {
            if let Some(map) = self.ready.borrow_and_update().clone() {
                return Some(map);
            }
            if self.ready.changed().await.is_err() {
                return self.ready.borrow().clone();
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_ready() {
        let map = MapDescriptor::new(MapId::new_v4(), "Sothoryos");
        let map_id = map.id;
        let backend = Arc::new(InMemoryBackend::with_map(map, Vec::new()));

        let mut handle = spawn_tile_poller(backend.clone(), map_id, Duration::from_secs(2));
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(handle.try_ready().is_none());
        // immediate check plus ticks at 2s and 4s
        assert_eq!(backend.map_fetches(), 3);

        backend.mark_tiles_ready(map_id, 512, 512, 1).unwrap();
        let ready = handle.wait_ready().await.unwrap();
        assert!(ready.tiles_ready);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(handle.is_finished());
        assert_eq!(backend.map_fetches(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_polling() {
        let map = MapDescriptor::new(MapId::new_v4(), "Ulthos");
        let map_id = map.id;
        let backend = Arc::new(InMemoryBackend::with_map(map, Vec::new()));

        let mut handle = spawn_tile_poller(backend.clone(), map_id, Duration::from_secs(2));
        tokio::time::sleep(Duration::from_secs(1)).await;
        handle.cancel();
        assert_eq!(handle.wait_ready().await, None);

        let fetched = backend.map_fetches();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(backend.map_fetches(), fetched);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_polling() {
        let map = MapDescriptor::new(MapId::new_v4(), "Valyria");
        let map_id = map.id;
        let backend = Arc::new(InMemoryBackend::with_map(map, Vec::new()));

        let handle = spawn_tile_poller(backend.clone(), map_id, Duration::from_secs(2));
        tokio::time::sleep(Duration::from_secs(1)).await;
        drop(handle);
        tokio::task::yield_now().await;

        let fetched = backend.map_fetches();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(backend.map_fetches(), fetched);
    }
}
