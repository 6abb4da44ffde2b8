use crate::{core::geo::Point, data::LocationId, prelude::HashMap};

/// Editor mode derived from the interaction state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Idle,
    /// Empty-canvas clicks stage a new location
    AddMode,
    /// A location is selected (and editable when the viewer allows it)
    EditMode(LocationId),
    /// The selected marker is being dragged
    Dragging(LocationId),
}

/// Client-side interaction state of the viewer
///
/// At most one drag is active at a time, and only ever on the selected
/// location. Pending coordinates are positions the user dragged a marker to
/// that the backend has not confirmed yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionState {
    pub(crate) hovered: Option<LocationId>,
    pub(crate) selected: Option<LocationId>,
    pub(crate) dragging: Option<LocationId>,
    /// Live position of the marker being dragged
    pub(crate) drag_position: Option<Point>,
    pub(crate) pending: HashMap<LocationId, Point>,
    pub(crate) preview: Option<Point>,
    pub(crate) add_mode: bool,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        if let Some(id) = self.dragging {
            Mode::Dragging(id)
        } else if self.add_mode {
            Mode::AddMode
        } else if let Some(id) = self.selected {
            Mode::EditMode(id)
        } else {
            Mode::Idle
        }
    }

    pub fn hovered(&self) -> Option<LocationId> {
        self.hovered
    }

    pub fn selected(&self) -> Option<LocationId> {
        self.selected
    }

    pub fn dragging(&self) -> Option<LocationId> {
        self.dragging
    }

    pub fn drag_position(&self) -> Option<Point> {
        self.drag_position
    }

    pub fn pending(&self, id: &LocationId) -> Option<Point> {
        self.pending.get(id).copied()
    }

    pub fn pending_coordinates(&self) -> &HashMap<LocationId, Point> {
        &self.pending
    }

    pub fn preview(&self) -> Option<Point> {
        self.preview
    }

    pub fn is_add_mode(&self) -> bool {
        self.add_mode
    }
}
