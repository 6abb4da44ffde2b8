//! Configuration for the viewer/editor shell
//!
//! Options can be built from a preset ([`ViewerProfile`]), tweaked in code, or
//! loaded from a JSON document; unknown keys are rejected and missing keys
//! fall back to the defaults.

use crate::{animation::easing::EasingType, constants, Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerOptions {
    /// Base URL serving `/tiles/{map}/{z}/{x}/{y}.png`
    pub tile_base_url: String,
    pub marker_icon_url: String,
    /// Icon for the pending new-location marker; falls back to the marker icon
    pub preview_icon_url: Option<String>,
    /// Enables add mode, edit forms and marker dragging
    pub editable: bool,
    pub hit_tolerance_px: f64,
    pub fit_padding_px: f64,
    pub zoom_delta: f64,
    pub wheel_zoom_step: f64,
    pub zoom_duration_ms: u64,
    pub zoom_easing: EasingType,
    pub pan_on_drag: bool,
    pub zoom_on_wheel: bool,
    pub tile_cache_size: usize,
    pub tile_poll_interval_ms: u64,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            tile_base_url: "http://localhost:8080".to_string(),
            marker_icon_url: "/marker.png".to_string(),
            preview_icon_url: None,
            editable: true,
            hit_tolerance_px: constants::HIT_TOLERANCE_PX,
            fit_padding_px: constants::FIT_PADDING_PX,
            zoom_delta: constants::DEFAULT_ZOOM_DELTA,
            wheel_zoom_step: constants::WHEEL_ZOOM_STEP,
            zoom_duration_ms: constants::ZOOM_ANIMATION_MS,
            zoom_easing: EasingType::EaseOut,
            pan_on_drag: true,
            zoom_on_wheel: true,
            tile_cache_size: constants::TILE_CACHE_SIZE,
            tile_poll_interval_ms: constants::TILE_POLL_INTERVAL_MS,
        }
    }
}

impl ViewerOptions {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        log::info!("loading viewer options from {}", path.as_ref().display());
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tile_base_url.trim().is_empty() {
            return Err(Error::Config("tile_base_url must not be empty".into()));
        }
        if !(self.hit_tolerance_px >= 0.0 && self.hit_tolerance_px.is_finite()) {
            return Err(Error::Config(format!(
                "hit_tolerance_px must be a non-negative number, got {}",
                self.hit_tolerance_px
            )));
        }
        if !(self.zoom_delta > 0.0 && self.wheel_zoom_step > 0.0) {
            return Err(Error::Config("zoom steps must be positive".into()));
        }
        if self.tile_cache_size == 0 {
            return Err(Error::Config("tile_cache_size must be at least 1".into()));
        }
        if self.tile_poll_interval_ms == 0 {
            return Err(Error::Config("tile_poll_interval_ms must be positive".into()));
        }
        Ok(())
    }

    pub fn preview_icon(&self) -> &str {
        self.preview_icon_url
            .as_deref()
            .unwrap_or(&self.marker_icon_url)
    }

    pub fn zoom_duration(&self) -> Duration {
        Duration::from_millis(self.zoom_duration_ms)
    }

    pub fn tile_poll_interval(&self) -> Duration {
        Duration::from_millis(self.tile_poll_interval_ms)
    }

    pub fn with_tile_base_url(mut self, url: impl Into<String>) -> Self {
        self.tile_base_url = url.into();
        self
    }

    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }
}

/// Presets for the two ways the shell is embedded
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerProfile {
    /// Owner's editing page: add/edit/drag enabled
    Editor,
    /// Public or shared-link page: hover and select only
    ReadOnly,
    Custom(ViewerOptions),
}

impl ViewerProfile {
    pub fn resolve(&self) -> ViewerOptions {
        match self {
            Self::Editor => ViewerOptions::default(),
            Self::ReadOnly => ViewerOptions {
                editable: false,
                ..ViewerOptions::default()
            },
            Self::Custom(options) => options.clone(),
        }
    }
}
