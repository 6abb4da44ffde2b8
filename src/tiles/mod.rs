pub mod cache;
pub mod loader;
pub mod pipeline;
pub mod source;

// Re-exports for convenience
pub use cache::{TileCache, TileEntry};
pub use loader::{HttpFetcher, TileFetch, TileFetcher, TileLoader};
pub use pipeline::TilePipeline;
pub use source::{PixelTileSource, TileSource};
