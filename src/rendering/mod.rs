//! Toolkit-independent description of what to draw.
//!
//! The editor shell produces a [`RenderFrame`] each frame: tiles and markers
//! already projected to screen space and styled. A [`SceneRenderer`] turns it
//! into pixels; swapping the UI toolkit means writing another renderer.

#[cfg(feature = "egui")]
pub mod egui_backend;
pub mod frame;

pub use frame::{MarkerDraw, RenderFrame, SceneRenderer, TileDraw};
#[cfg(feature = "egui")]
pub use egui_backend::{collect_input, EguiRenderer, TileTextures};
