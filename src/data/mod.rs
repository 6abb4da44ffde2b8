//! Records mirrored from the map service.

pub mod models;
pub mod pyramid;

pub use models::{
    Location, LocationId, LocationPatch, MapDescriptor, MapId, NewLocation, Visibility,
};
pub use pyramid::{LevelSize, TilePyramid};
