//! Prelude module for common fablemap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use fablemap::prelude::*;`

pub use crate::core::{
    bounds::Bounds,
    config::{ViewerOptions, ViewerProfile},
    geo::{Point, TileCoord},
    projection::PixelProjection,
    viewport::View,
};

pub use crate::data::{
    Location, LocationId, LocationPatch, MapDescriptor, MapId, NewLocation, Visibility,
};

pub use crate::layers::{
    marker::{FeatureKind, MarkerFeature, MarkerLayer},
    style::{MarkerStyle, MarkerVariant, StyleCache},
    tile::TileLayer,
};

pub use crate::input::{
    events::{InputEvent, MouseButton, ViewerEvent},
    handler::EventQueue,
};

pub use crate::interaction::{
    controller::{Hit, InteractionController, Transition},
    state::{InteractionState, Mode},
};

pub use crate::editor::{
    form::{FormError, LocationForm},
    panel::Panel,
    requests::{RequestKey, RequestOutcome, RequestToken, RequestTracker},
    shell::MapEditor,
};

pub use crate::animation::{easing::EasingType, zoom::ZoomAnimation};

pub use crate::backend::{memory::InMemoryBackend, MapBackend};

#[cfg(feature = "tokio-runtime")]
pub use crate::backend::poller::{spawn_tile_poller, PollHandle};

pub use crate::rendering::{RenderFrame, SceneRenderer};

pub use crate::tiles::{
    cache::{TileCache, TileEntry},
    loader::{HttpFetcher, TileFetch, TileFetcher, TileLoader},
    source::{PixelTileSource, TileSource},
};

pub use crate::{Error as MapError, Result};

pub use std::{
    sync::Arc,
    time::{Duration, Instant},
};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet, FxHasher};
