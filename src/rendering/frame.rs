use crate::{
    core::{bounds::Bounds, geo::Point, geo::TileCoord},
    layers::{
        marker::FeatureKind,
        style::{MarkerStyle, MarkerVariant},
    },
};
use std::sync::Arc;

/// One tile to draw
#[derive(Debug, Clone, PartialEq)]
pub struct TileDraw {
    /// Published tile address, also the cache key
    pub coord: TileCoord,
    pub url: String,
    /// Where the tile lands on the canvas
    pub screen: Bounds,
}

/// One styled marker to draw
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerDraw {
    pub kind: FeatureKind,
    /// Screen position of the icon's anchor (bottom-centre)
    pub anchor: Point,
    pub variant: MarkerVariant,
    pub style: Arc<MarkerStyle>,
}

impl MarkerDraw {
    pub fn icon_box(&self) -> Bounds {
        self.style.icon_box(self.anchor)
    }
}

/// Everything needed to paint one frame, back to front
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderFrame {
    pub size: Point,
    pub zoom: f64,
    pub tiles: Vec<TileDraw>,
    /// Sorted bottom to top
    pub markers: Vec<MarkerDraw>,
}

impl RenderFrame {
    pub fn marker(&self, kind: &FeatureKind) -> Option<&MarkerDraw> {
        self.markers.iter().find(|m| &m.kind == kind)
    }
}

/// Trait for toolkit backends that paint a frame
pub trait SceneRenderer {
    type Error;

    fn render(&mut self, frame: &RenderFrame) -> std::result::Result<(), Self::Error>;
}
