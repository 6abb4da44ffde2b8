use crate::core::bounds::Bounds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Tile,
    Marker,
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerKind::Tile => write!(f, "tile"),
            LayerKind::Marker => write!(f, "marker"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LayerProperties {
    pub id: String,
    pub kind: LayerKind,
    pub visible: bool,
    /// Whether pointer hit tests consult this layer
    pub interactive: bool,
}

impl LayerProperties {
    pub fn new(id: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            id: id.into(),
            kind,
            visible: true,
            interactive: false,
        }
    }

    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }
}

/// Common surface shared by the tile and marker layers
pub trait Layer {
    fn id(&self) -> &str;
    fn kind(&self) -> LayerKind;
    fn is_visible(&self) -> bool;
    fn set_visible(&mut self, visible: bool);
    fn is_interactive(&self) -> bool;

    /// Map-space bounds of the layer's content, if it has any
    fn bounds(&self) -> Option<Bounds> {
        None
    }
}
