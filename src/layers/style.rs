use crate::{
    constants::MARKER_ICON_SIZE,
    core::{bounds::Bounds, geo::Point},
    prelude::HashMap,
    traits::CacheStats,
};
use std::sync::Arc;

/// Visual state a marker is drawn in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerVariant {
    Normal,
    Hovered,
    Selected,
    Dragging,
    Preview,
}

impl MarkerVariant {
    pub const ALL: [MarkerVariant; 5] = [
        MarkerVariant::Normal,
        MarkerVariant::Hovered,
        MarkerVariant::Selected,
        MarkerVariant::Dragging,
        MarkerVariant::Preview,
    ];

    fn slot(self) -> usize {
        match self {
            MarkerVariant::Normal => 0,
            MarkerVariant::Hovered => 1,
            MarkerVariant::Selected => 2,
            MarkerVariant::Dragging => 3,
            MarkerVariant::Preview => 4,
        }
    }
}

/// Resolved drawing parameters for one (icon, variant) pair
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerStyle {
    pub icon_url: String,
    pub variant: MarkerVariant,
    /// Multiplier applied to the base icon size
    pub scale: f64,
    pub opacity: f32,
    /// RGBA multiplier, white leaves the icon untouched
    pub tint: [u8; 4],
    /// Higher values draw on top
    pub z_order: i32,
}

impl MarkerStyle {
    pub fn new(icon_url: impl Into<String>, variant: MarkerVariant) -> Self {
        let (scale, opacity, tint, z_order) = match variant {
            MarkerVariant::Normal => (1.0, 1.0, [255, 255, 255, 255], 0),
            MarkerVariant::Hovered => (1.15, 1.0, [255, 255, 255, 255], 1),
            MarkerVariant::Selected => (1.25, 1.0, [255, 214, 90, 255], 2),
            MarkerVariant::Dragging => (1.3, 0.85, [255, 214, 90, 255], 3),
            MarkerVariant::Preview => (1.0, 0.8, [255, 255, 255, 255], 4),
        };
        Self {
            icon_url: icon_url.into(),
            variant,
            scale,
            opacity,
            tint,
            z_order,
        }
    }

    /// Icon size in screen pixels
    pub fn icon_size(&self) -> Point {
        Point::new(MARKER_ICON_SIZE.0 * self.scale, MARKER_ICON_SIZE.1 * self.scale)
    }

    /// Screen rectangle of an icon anchored bottom-centre at `anchor`
    pub fn icon_box(&self, anchor: Point) -> Bounds {
        let size = self.icon_size();
        Bounds::from_coords(
            anchor.x - size.x / 2.0,
            anchor.y - size.y,
            anchor.x + size.x / 2.0,
            anchor.y,
        )
    }
}

/// Caches one shared style per (icon URL, variant) so a render pass does not
/// rebuild styles for every feature.
#[derive(Debug, Default)]
pub struct StyleCache {
    styles: HashMap<String, [Option<Arc<MarkerStyle>>; 5]>,
    stats: CacheStats,
}

impl StyleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, icon_url: &str, variant: MarkerVariant) -> Arc<MarkerStyle> {
        if let Some(style) = self
            .styles
            .get(icon_url)
            .and_then(|slots| slots[variant.slot()].as_ref())
        {
            self.stats.hits += 1;
            return Arc::clone(style);
        }

        self.stats.misses += 1;
        let style = Arc::new(MarkerStyle::new(icon_url, variant));
        let slots = self.styles.entry(icon_url.to_string()).or_default();
        slots[variant.slot()] = Some(Arc::clone(&style));
        style
    }

    /// Number of distinct styles built so far
    pub fn len(&self) -> usize {
        self.styles
            .values()
            .map(|slots| slots.iter().flatten().count())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.len(),
            ..self.stats.clone()
        }
    }
}
