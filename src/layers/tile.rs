use crate::{
    core::{bounds::Bounds, geo::TileCoord, projection::PixelProjection, viewport::View},
    layers::base::{Layer, LayerKind, LayerProperties},
    rendering::TileDraw,
    tiles::source::TileSource,
};

/// Base layer drawing the map image from its tile pyramid
///
/// Tiles are addressed in grid convention (rows negative, growing downward
/// from the top-left origin); the source turns them into published
/// addresses.
pub struct TileLayer {
    properties: LayerProperties,
    source: Box<dyn TileSource>,
}

impl TileLayer {
    pub fn new(source: Box<dyn TileSource>) -> Self {
        Self {
            properties: LayerProperties::new("tiles", LayerKind::Tile),
            source,
        }
    }

    pub fn source(&self) -> &dyn TileSource {
        self.source.as_ref()
    }

    /// Tiles covering the view at its current tile zoom, row-major from the
    /// top-left.
    pub fn visible_tiles(&self, projection: &PixelProjection, view: &View) -> Vec<TileDraw> {
        if !self.properties.visible {
            return Vec::new();
        }

        let z = view.tile_zoom();
        let (Some(span), Some((columns, rows))) = (projection.tile_span(z), projection.tile_range(z))
        else {
            return Vec::new();
        };
        let extent = projection.extent();
        let Some(covered) = view.visible_extent().intersection(&extent) else {
            return Vec::new();
        };

        let first_col = (covered.min.x / span).floor().max(0.0) as i32;
        let first_row = (covered.min.y / span).floor().max(0.0) as i32;
        let last_col = ((covered.max.x / span).ceil() as i32).min(columns as i32) - 1;
        let last_row = ((covered.max.y / span).ceil() as i32).min(rows as i32) - 1;

        let mut tiles = Vec::new();
        for row in first_row..=last_row {
            for col in first_col..=last_col {
                let grid = TileCoord::new(z, col, -row - 1);
                let (Some(coord), Some(url)) = (self.source.published(grid), self.source.url(grid))
                else {
                    continue;
                };

                // edge tiles are cropped by the tiler, so clip to the extent
                let map_box = Bounds::from_coords(
                    f64::from(col) * span,
                    f64::from(row) * span,
                    (f64::from(col + 1) * span).min(extent.max.x),
                    (f64::from(row + 1) * span).min(extent.max.y),
                );
                tiles.push(TileDraw {
                    coord,
                    url,
                    screen: Bounds::new(
                        view.map_to_screen(&map_box.min),
                        view.map_to_screen(&map_box.max),
                    ),
                });
            }
        }
        tiles
    }
}

impl Layer for TileLayer {
    crate::impl_layer!(properties);
}
