//! egui backend: paints a [`RenderFrame`] and turns canvas interaction into
//! [`InputEvent`]s.

use crate::{
    core::{bounds::Bounds, geo::{Point, TileCoord}},
    input::events::{InputEvent, MouseButton},
    prelude::HashMap,
    rendering::{RenderFrame, SceneRenderer},
    tiles::{cache::TileEntry, pipeline::TilePipeline},
};
use egui::{Color32, ColorImage, Painter, Pos2, Rect, Response, Shape, Stroke, TextureHandle, Ui, Vec2};

/// Scroll distance (points) treated as one wheel step
const SCROLL_STEP: f32 = 50.0;

/// GPU textures for decoded tiles, keyed by published coordinate
#[derive(Default)]
pub struct TileTextures {
    textures: HashMap<TileCoord, TextureHandle>,
}

impl TileTextures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the frame's tiles, collects finished downloads and uploads
    /// them. Returns true when new textures arrived.
    pub fn sync(&mut self, ctx: &egui::Context, pipeline: &mut TilePipeline, frame: &RenderFrame) -> bool {
        pipeline.request(&frame.tiles);
        let ready = pipeline.pump();
        let mut uploaded = false;
        for coord in ready {
            if let Some(TileEntry::Ready(bytes)) = pipeline.get(&coord) {
                match decode(bytes) {
                    Some(image) => {
                        let texture = ctx.load_texture(format!("tile_{}", coord), image, egui::TextureOptions::LINEAR);
                        self.textures.insert(coord, texture);
                        uploaded = true;
                    }
                    None => log::warn!("tile {} is not a decodable image", coord),
                }
            }
        }
        uploaded
    }

    pub fn get(&self, coord: &TileCoord) -> Option<&TextureHandle> {
        self.textures.get(coord)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Drops every texture, e.g. when switching maps
    pub fn clear(&mut self) {
        self.textures.clear();
    }
}

fn decode(bytes: &[u8]) -> Option<ColorImage> {
    let img = image::load_from_memory(bytes).ok()?;
    let rgba = img.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Some(ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

/// Paints frames into an egui canvas whose top-left is `origin`
pub struct EguiRenderer<'a> {
    painter: &'a Painter,
    origin: Pos2,
    textures: &'a TileTextures,
    icons: Option<&'a HashMap<String, TextureHandle>>,
}

impl<'a> EguiRenderer<'a> {
    pub fn new(painter: &'a Painter, origin: Pos2, textures: &'a TileTextures) -> Self {
        Self {
            painter,
            origin,
            textures,
            icons: None,
        }
    }

    /// Marker icon textures by URL; markers without one are drawn as pins
    pub fn with_icons(mut self, icons: &'a HashMap<String, TextureHandle>) -> Self {
        self.icons = Some(icons);
        self
    }

    fn rect(&self, bounds: &Bounds) -> Rect {
        Rect::from_two_pos(self.pos(&bounds.min), self.pos(&bounds.max))
    }

    fn pos(&self, point: &Point) -> Pos2 {
        Pos2::new(self.origin.x + point.x as f32, self.origin.y + point.y as f32)
    }
}

impl SceneRenderer for EguiRenderer<'_> {
    type Error = crate::Error;

    fn render(&mut self, frame: &RenderFrame) -> Result<(), Self::Error> {
        let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));

        for tile in &frame.tiles {
            if let Some(texture) = self.textures.get(&tile.coord) {
                self.painter.image(texture.id(), self.rect(&tile.screen), uv, Color32::WHITE);
            }
        }

        for marker in &frame.markers {
            let style = &marker.style;
            let [r, g, b, a] = style.tint;
            let tint = Color32::from_rgba_unmultiplied(r, g, b, a).linear_multiply(style.opacity);
            let rect = self.rect(&marker.icon_box());

            match self.icons.and_then(|icons| icons.get(&style.icon_url)) {
                Some(icon) => {
                    self.painter.image(icon.id(), rect, uv, tint);
                }
                None => paint_pin(self.painter, rect, tint),
            }
        }
        Ok(())
    }
}

/// Teardrop pin filling `rect`, tip at the bottom centre
fn paint_pin(painter: &Painter, rect: Rect, tint: Color32) {
    let base = Color32::from_rgb(200, 60, 50);
    let fill = Color32::from_rgba_unmultiplied(
        (u16::from(base.r()) * u16::from(tint.r()) / 255) as u8,
        (u16::from(base.g()) * u16::from(tint.g()) / 255) as u8,
        (u16::from(base.b()) * u16::from(tint.b()) / 255) as u8,
        tint.a(),
    );
    let radius = rect.width() / 2.0;
    let center = Pos2::new(rect.center().x, rect.min.y + radius);
    let stroke = Stroke::new(1.0, Color32::from_black_alpha(tint.a()));

    painter.add(Shape::convex_polygon(
        vec![
            Pos2::new(rect.min.x + radius * 0.25, center.y + radius * 0.6),
            Pos2::new(rect.max.x - radius * 0.25, center.y + radius * 0.6),
            Pos2::new(rect.center().x, rect.max.y),
        ],
        fill,
        stroke,
    ));
    painter.circle(center, radius, fill, stroke);
    painter.circle_filled(center, radius * 0.35, Color32::from_white_alpha(tint.a()));
}

/// Translates this frame's interaction with the canvas `response` into
/// input events in canvas coordinates. `was_hovered` carries the hover
/// state across frames so leaving the canvas is reported once.
pub fn collect_input(response: &Response, ui: &Ui, was_hovered: &mut bool) -> Vec<InputEvent> {
    let origin = response.rect.min;
    let local = |pos: Pos2| Point::new(f64::from(pos.x - origin.x), f64::from(pos.y - origin.y));
    let mut events = Vec::new();

    let size = response.rect.size();
    events.push(InputEvent::Resize {
        size: Point::new(f64::from(size.x), f64::from(size.y)),
    });

    match response.hover_pos() {
        Some(pos) => {
            *was_hovered = true;
            events.push(InputEvent::PointerMove { position: local(pos) });

            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll.abs() > 0.1 {
                events.push(InputEvent::Scroll {
                    delta: f64::from(scroll / SCROLL_STEP),
                    position: local(pos),
                });
            }
        }
        None if *was_hovered && !response.dragged() => {
            *was_hovered = false;
            events.push(InputEvent::PointerLeave);
        }
        None => {}
    }

    let pointer = response.interact_pointer_pos().map(local);
    if let Some(position) = pointer {
        if response.clicked() {
            events.push(InputEvent::Click {
                position,
                button: MouseButton::Left,
            });
        }
        if response.drag_started() {
            // report from where the press began, not where the drag was detected
            let delta = response.drag_delta();
            let start = Point::new(position.x - f64::from(delta.x), position.y - f64::from(delta.y));
            events.push(InputEvent::DragStart { position: start });
        }
        if response.dragged() && response.drag_delta() != Vec2::ZERO {
            let delta = response.drag_delta();
            events.push(InputEvent::Drag {
                position,
                delta: Point::new(f64::from(delta.x), f64::from(delta.y)),
            });
        }
        if response.drag_released() {
            events.push(InputEvent::DragEnd { position });
        }
    }
    events
}
