//! The persistence collaborator the editor's host talks to.
//!
//! The editor itself only emits [`ViewerEvent`](crate::input::events::ViewerEvent)s;
//! a host performs them against a [`MapBackend`] and hands the outcome back.

pub mod memory;
#[cfg(feature = "tokio-runtime")]
pub mod poller;

use crate::{
    data::{Location, LocationId, LocationPatch, MapDescriptor, MapId, NewLocation},
    editor::requests::RequestOutcome,
    input::events::ViewerEvent,
    Result,
};
use async_trait::async_trait;

pub use memory::InMemoryBackend;
#[cfg(feature = "tokio-runtime")]
pub use poller::{spawn_tile_poller, PollHandle};

/// Map and location storage
#[async_trait]
pub trait MapBackend: Send + Sync {
    async fn fetch_map(&self, map_id: MapId) -> Result<MapDescriptor>;

    async fn fetch_locations(&self, map_id: MapId) -> Result<Vec<Location>>;

    async fn create_location(&self, data: NewLocation) -> Result<Location>;

    async fn update_location(&self, id: LocationId, patch: LocationPatch) -> Result<Location>;

    async fn delete_location(&self, id: LocationId) -> Result<()>;
}

/// Performs the backend call behind a viewer event. Events that need no
/// backend work yield `None`.
pub async fn perform(backend: &dyn MapBackend, event: &ViewerEvent) -> Option<RequestOutcome> {
    let outcome = match event {
        ViewerEvent::AddLocation { data, .. } => backend
            .create_location(data.clone())
            .await
            .map(RequestOutcome::Created),
        ViewerEvent::UpdateLocation { id, data, .. } => backend
            .update_location(*id, data.clone())
            .await
            .map(RequestOutcome::Updated),
        ViewerEvent::DeleteLocation { id, .. } => backend
            .delete_location(*id)
            .await
            .map(|()| RequestOutcome::Deleted),
        _ => return None,
    };
    Some(outcome.unwrap_or_else(|e| RequestOutcome::Failed(e.to_string())))
}
