use crate::core::geo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new_v4() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

uuid_id!(MapId);
uuid_id!(LocationId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Private,
    Public,
    /// Reachable through a share link only
    Link,
}

/// Map metadata as returned by the map service.
///
/// `width`, `height` and `max_zoom` are only known once the uploaded image has
/// been cut into tiles, and never change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDescriptor {
    pub id: MapId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub max_zoom: Option<u8>,
    #[serde(default)]
    pub tiles_ready: bool,
}

impl MapDescriptor {
    pub fn new(id: MapId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            tags: Vec::new(),
            visibility: Visibility::default(),
            width: None,
            height: None,
            max_zoom: None,
            tiles_ready: false,
        }
    }

    /// Marks tiles as generated for an image of the given size
    pub fn with_tiles(mut self, width: u32, height: u32, max_zoom: u8) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self.max_zoom = Some(max_zoom);
        self.tiles_ready = true;
        self
    }

    /// `(width, height, max_zoom)` once tiles are ready
    pub fn dimensions(&self) -> Option<(u32, u32, u8)> {
        if !self.tiles_ready {
            return None;
        }
        Some((self.width?, self.height?, self.max_zoom?))
    }
}

/// A pinned point of interest with its markdown article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub map_id: MapId,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub description_md: String,
    pub x: f64,
    pub y: f64,
    #[serde(default, rename = "metadata_json", skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Location {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Applies a partial update the same way the service does
    pub fn apply(&mut self, patch: &LocationPatch) {
        if let Some(kind) = &patch.kind {
            self.kind = kind.clone();
        }
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description_md {
            self.description_md = description.clone();
        }
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(metadata) = &patch.metadata {
            self.metadata = Some(metadata.clone());
        }
    }
}

/// Payload for creating a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLocation {
    pub map_id: MapId,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub description_md: String,
    pub x: f64,
    pub y: f64,
}

impl NewLocation {
    pub fn into_location(self, id: LocationId) -> Location {
        Location {
            id,
            map_id: self.map_id,
            kind: self.kind,
            name: self.name,
            description_md: self.description_md,
            x: self.x,
            y: self.y,
            metadata: None,
        }
    }
}

/// Partial update; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationPatch {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_md: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, rename = "metadata_json", skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}
