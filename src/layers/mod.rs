#[macro_use]
pub mod macros;

pub mod base;
pub mod marker;
pub mod style;
pub mod tile;

pub use base::{Layer, LayerKind, LayerProperties};
pub use marker::{FeatureKind, MarkerFeature, MarkerLayer, ReconcileReport};
pub use style::{MarkerStyle, MarkerVariant, StyleCache};
pub use tile::TileLayer;
