//! # fablemap
//!
//! Viewer and location editor for hand-drawn "fantasy" maps.
//!
//! Maps live in their own pixel coordinate space (no geography, no
//! wraparound). The image is cut into a 256×256 tile pyramid by the backend;
//! this crate projects that pyramid onto a canvas, keeps one marker per pinned
//! location, and runs the hover/select/add/drag interaction model on top.
//!
//! Persistence is somebody else's problem: the editor consumes a
//! [`MapDescriptor`] and a list of [`Location`]s and emits
//! [`ViewerEvent`]s describing what the user asked for.

pub mod animation;
pub mod backend;
pub mod core;
pub mod data;
pub mod editor;
pub mod input;
pub mod interaction;
pub mod layers;
pub mod prelude;
pub mod rendering;
pub mod spatial;
pub mod tiles;
pub mod traits;

pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    bounds::Bounds,
    config::{ViewerOptions, ViewerProfile},
    geo::{Point, TileCoord},
    projection::PixelProjection,
    viewport::View,
};

pub use data::{Location, LocationId, LocationPatch, MapDescriptor, MapId, NewLocation};

pub use editor::{
    form::LocationForm,
    panel::Panel,
    requests::{RequestKey, RequestOutcome, RequestToken, RequestTracker},
    shell::MapEditor,
};

pub use input::{events::InputEvent, events::ViewerEvent, handler::EventQueue};

pub use interaction::{
    controller::InteractionController,
    state::{InteractionState, Mode},
};

pub use layers::{marker::MarkerLayer, tile::TileLayer};

pub use tiles::source::{PixelTileSource, TileSource};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Invalid map: {0}")]
    InvalidMap(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Form(#[from] editor::form::FormError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Error type alias for convenience
pub type Error = MapError;
