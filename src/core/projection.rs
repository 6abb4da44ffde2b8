//! Finite pixel-space projection for a single map image.
//!
//! A map of `width × height` pixels is published as a tile pyramid with
//! zoom levels `0..=max_zoom`. At zoom `z` one screen pixel covers
//! `2^(max_zoom - z)` map pixels: zoom 0 is the most zoomed-out level and
//! `max_zoom` shows the image 1:1. Neither axis wraps.

use crate::{
    constants::TILE_SIZE,
    core::{bounds::Bounds, geo::Point},
    data::MapDescriptor,
    Error, Result,
};

#[derive(Debug, Clone, PartialEq)]
pub struct PixelProjection {
    width: u32,
    height: u32,
    max_zoom: u8,
    extent: Bounds,
    resolutions: Vec<f64>,
}

impl PixelProjection {
    pub fn new(width: u32, height: u32, max_zoom: u8) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidMap(format!(
                "map dimensions must be positive, got {width}x{height}"
            )));
        }
        // 2^max_zoom must stay exactly representable as a tile span
        if max_zoom > 30 {
            return Err(Error::InvalidMap(format!(
                "max zoom {max_zoom} is out of range"
            )));
        }

        let resolutions = (0..=max_zoom)
            .map(|z| 2_f64.powi(i32::from(max_zoom - z)))
            .collect();

        Ok(Self {
            width,
            height,
            max_zoom,
            extent: Bounds::from_coords(0.0, 0.0, f64::from(width), f64::from(height)),
            resolutions,
        })
    }

    /// Builds the projection for a map whose tiles have been generated.
    pub fn for_map(map: &MapDescriptor) -> Result<Self> {
        let (width, height, max_zoom) = map.dimensions().ok_or_else(|| {
            Error::InvalidMap(format!("map {} has no generated tiles yet", map.id))
        })?;
        Self::new(width, height, max_zoom)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn max_zoom(&self) -> u8 {
        self.max_zoom
    }

    /// `[0, 0, width, height]`
    pub fn extent(&self) -> Bounds {
        self.extent
    }

    /// Resolution ladder, indexed by zoom level.
    pub fn resolutions(&self) -> &[f64] {
        &self.resolutions
    }

    /// Resolution at an integer zoom level, `None` outside `[0, max_zoom]`.
    pub fn resolution(&self, zoom: i32) -> Option<f64> {
        usize::try_from(zoom)
            .ok()
            .and_then(|z| self.resolutions.get(z).copied())
    }

    /// Resolution at a fractional zoom, clamped to the valid zoom range.
    pub fn resolution_for_zoom(&self, zoom: f64) -> f64 {
        let zoom = zoom.clamp(0.0, f64::from(self.max_zoom));
        2_f64.powf(f64::from(self.max_zoom) - zoom)
    }

    /// Inverse of [`Self::resolution_for_zoom`], clamped to the valid range.
    pub fn zoom_for_resolution(&self, resolution: f64) -> f64 {
        if resolution <= 0.0 || !resolution.is_finite() {
            return f64::from(self.max_zoom);
        }
        (f64::from(self.max_zoom) - resolution.log2()).clamp(0.0, f64::from(self.max_zoom))
    }

    pub fn is_valid_zoom(&self, zoom: i32) -> bool {
        zoom >= 0 && zoom <= i32::from(self.max_zoom)
    }

    pub fn zoom_levels(&self) -> std::ops::RangeInclusive<u8> {
        0..=self.max_zoom
    }

    /// Map-pixel span of one tile at the given zoom.
    pub fn tile_span(&self, zoom: i32) -> Option<f64> {
        self.resolution(zoom).map(|r| r * f64::from(TILE_SIZE))
    }

    /// Number of tile columns and rows published at `zoom`.
    ///
    /// Mirrors the pyramid generator: the image is scaled down by
    /// `2^(max_zoom - zoom)` (rounding up) and cut into 256px tiles, the last
    /// row/column possibly partial.
    pub fn tile_range(&self, zoom: i32) -> Option<(u32, u32)> {
        let scale = self.resolution(zoom)?;
        let scaled_w = (f64::from(self.width) / scale).ceil();
        let scaled_h = (f64::from(self.height) / scale).ceil();
        let tile = f64::from(TILE_SIZE);
        Some(((scaled_w / tile).ceil() as u32, (scaled_h / tile).ceil() as u32))
    }

    pub fn contains(&self, point: &Point) -> bool {
        self.extent.contains(point)
    }

    pub fn clamp(&self, point: &Point) -> Point {
        self.extent.clamp(point)
    }
}
