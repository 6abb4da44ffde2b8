//! Tile pyramid layout for an uploaded image.
//!
//! The tile service derives the zoom range from the image size and cuts each
//! level into 256px tiles; the viewer needs the same numbers to know which
//! tiles exist.

use crate::constants::TILE_SIZE;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSize {
    pub zoom: u8,
    /// Scaled image size at this level
    pub width: u32,
    pub height: u32,
    pub columns: u32,
    pub rows: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilePyramid {
    pub width: u32,
    pub height: u32,
    pub max_zoom: u8,
    pub levels: Vec<LevelSize>,
}

impl TilePyramid {
    /// Layout for a `width × height` source image:
    /// `max_zoom = ceil(log2(max(1, max(width, height) / 256)))`.
    pub fn for_image(width: u32, height: u32) -> Self {
        let max_dim = f64::from(width.max(height));
        let max_zoom = (max_dim / f64::from(TILE_SIZE)).max(1.0).log2().ceil() as u8;

        let levels = (0..=max_zoom)
            .map(|zoom| {
                let scale = 2_f64.powi(i32::from(max_zoom - zoom));
                let level_w = (f64::from(width) / scale).ceil() as u32;
                let level_h = (f64::from(height) / scale).ceil() as u32;
                LevelSize {
                    zoom,
                    width: level_w,
                    height: level_h,
                    columns: level_w.div_ceil(TILE_SIZE),
                    rows: level_h.div_ceil(TILE_SIZE),
                }
            })
            .collect();

        Self {
            width,
            height,
            max_zoom,
            levels,
        }
    }

    pub fn level(&self, zoom: u8) -> Option<&LevelSize> {
        self.levels.get(usize::from(zoom))
    }

    pub fn tile_count(&self) -> u64 {
        self.levels
            .iter()
            .map(|l| u64::from(l.columns) * u64::from(l.rows))
            .sum()
    }
}
