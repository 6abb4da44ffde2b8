use crate::{
    core::geo::Point,
    data::{Location, LocationId, LocationPatch, NewLocation},
    editor::requests::RequestToken,
};
use serde::{Deserialize, Serialize};

/// Pointer input delivered to the viewer, in canvas pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    PointerMove { position: Point },
    /// The pointer left the canvas
    PointerLeave,
    Click {
        position: Point,
        button: MouseButton,
    },
    DragStart { position: Point },
    /// Drag in progress; `delta` is the movement since the last event
    Drag { position: Point, delta: Point },
    DragEnd { position: Point },
    /// Wheel steps, positive zooms in
    Scroll { delta: f64, position: Point },
    Resize { size: Point },
}

/// Mouse button types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

impl InputEvent {
    /// Gets the primary position associated with this event, if any
    pub fn position(&self) -> Option<Point> {
        match self {
            InputEvent::PointerMove { position }
            | InputEvent::Click { position, .. }
            | InputEvent::DragStart { position }
            | InputEvent::Drag { position, .. }
            | InputEvent::DragEnd { position }
            | InputEvent::Scroll { position, .. } => Some(*position),
            InputEvent::PointerLeave | InputEvent::Resize { .. } => None,
        }
    }

    pub fn is_drag_event(&self) -> bool {
        matches!(
            self,
            InputEvent::DragStart { .. } | InputEvent::Drag { .. } | InputEvent::DragEnd { .. }
        )
    }
}

/// What the viewer asks of its host. Requests that hit the backend carry a
/// [`RequestToken`] the host hands back with the outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    AddLocation {
        request: RequestToken,
        data: NewLocation,
    },
    UpdateLocation {
        request: RequestToken,
        id: LocationId,
        data: LocationPatch,
    },
    DeleteLocation {
        request: RequestToken,
        id: LocationId,
    },
    /// Empty-canvas click in add mode, in map pixels
    MapClick { coordinate: Point },
    SelectLocation { location: Location },
    /// A marker was dropped at a new, not yet saved, position
    MoveLocation { id: LocationId, x: f64, y: f64 },
}

impl ViewerEvent {
    /// Listener key used by [`EventQueue::on`](crate::input::handler::EventQueue::on)
    pub fn name(&self) -> &'static str {
        match self {
            ViewerEvent::AddLocation { .. } => "addlocation",
            ViewerEvent::UpdateLocation { .. } => "updatelocation",
            ViewerEvent::DeleteLocation { .. } => "deletelocation",
            ViewerEvent::MapClick { .. } => "mapclick",
            ViewerEvent::SelectLocation { .. } => "selectlocation",
            ViewerEvent::MoveLocation { .. } => "movelocation",
        }
    }

    pub fn request(&self) -> Option<RequestToken> {
        match self {
            ViewerEvent::AddLocation { request, .. }
            | ViewerEvent::UpdateLocation { request, .. }
            | ViewerEvent::DeleteLocation { request, .. } => Some(*request),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::requests::{RequestKey, RequestTracker};

    #[test]
    fn test_input_event_position() {
        let click = InputEvent::Click {
            position: Point::new(100.0, 200.0),
            button: MouseButton::Left,
        };
        assert_eq!(click.position(), Some(Point::new(100.0, 200.0)));
        assert_eq!(InputEvent::PointerLeave.position(), None);
        assert!(!click.is_drag_event());
        assert!(InputEvent::DragEnd {
            position: Point::default()
        }
        .is_drag_event());
    }

    #[test]
    fn test_viewer_event_request() {
        let mut tracker = RequestTracker::new();
        let id = LocationId::new_v4();
        let token = tracker.issue(RequestKey::Delete(id));
        let event = ViewerEvent::DeleteLocation { request: token, id };
        assert_eq!(event.request(), Some(token));
        assert_eq!(event.name(), "deletelocation");

        let moved = ViewerEvent::MoveLocation { id, x: 1.0, y: 2.0 };
        assert_eq!(moved.request(), None);
    }
}
