use crate::{
    core::geo::Point,
    data::{Location, LocationId},
    input::events::ViewerEvent,
    interaction::state::{InteractionState, Mode},
    layers::marker::FeatureKind,
    prelude::HashMap,
};

/// Result of a pointer hit test, as seen by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Location(LocationId),
    Preview,
}

impl From<FeatureKind> for Hit {
    fn from(kind: FeatureKind) -> Self {
        match kind {
            FeatureKind::Location(id) => Hit::Location(id),
            FeatureKind::Preview => Hit::Preview,
        }
    }
}

/// A marker moved back from a discarded position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rollback {
    pub id: LocationId,
    pub restored: Point,
    pub discarded: Point,
}

/// Everything one controller step did: the mode change, markers that must
/// snap back, and events for the host.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub from: Mode,
    pub to: Mode,
    pub rollbacks: Vec<Rollback>,
    pub events: Vec<ViewerEvent>,
}

impl Transition {
    fn unchanged(mode: Mode) -> Self {
        Self {
            from: mode,
            to: mode,
            rollbacks: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.from == self.to && self.rollbacks.is_empty() && self.events.is_empty()
    }
}

/// Hover, selection, placement and drag state machine
///
/// Every mutating call returns a [`Transition`]; the caller applies its
/// rollbacks to the marker layer and forwards its events. The controller
/// itself never touches rendering state.
#[derive(Debug, Clone)]
pub struct InteractionController {
    state: InteractionState,
    /// Last positions the backend confirmed, by location
    confirmed: HashMap<LocationId, Location>,
    editable: bool,
}

impl InteractionController {
    pub fn new(editable: bool) -> Self {
        Self {
            state: InteractionState::new(),
            confirmed: HashMap::default(),
            editable,
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn location(&self, id: &LocationId) -> Option<&Location> {
        self.confirmed.get(id)
    }

    /// Takes in a fresh location list. Pending coordinates the list already
    /// reflects are committed; ids that disappeared lose their pending
    /// coordinate, selection and hover.
    pub fn sync_locations(&mut self, locations: &[Location]) -> Transition {
        let from = self.state.mode();
        self.confirmed = locations.iter().map(|l| (l.id, l.clone())).collect();

        let confirmed = &self.confirmed;
        self.state.pending.retain(|id, pending| match confirmed.get(id) {
            Some(location) => {
                let committed = location.position().approx_eq(pending);
                if committed {
                    log::debug!("pending position of {} confirmed", id);
                }
                !committed
            }
            None => false,
        });

        let gone = |id: &Option<LocationId>| id.map_or(false, |id| !confirmed.contains_key(&id));
        if gone(&self.state.selected) {
            self.state.selected = None;
        }
        if gone(&self.state.dragging) {
            self.state.dragging = None;
            self.state.drag_position = None;
        }
        if gone(&self.state.hovered) {
            self.state.hovered = None;
        }

        self.finish(from, Vec::new(), Vec::new())
    }

    /// Enters add mode, or leaves it when already active. Entering discards
    /// the selection together with any unsaved drag.
    pub fn toggle_add_mode(&mut self) -> Transition {
        let from = self.state.mode();
        if !self.editable {
            return Transition::unchanged(from);
        }

        if self.state.add_mode {
            self.state.add_mode = false;
            self.state.preview = None;
            return self.finish(from, Vec::new(), Vec::new());
        }

        let mut rollbacks: Vec<Rollback> = self.abort_drag().into_iter().collect();
        let pending: Vec<LocationId> = self.state.pending.keys().copied().collect();
        rollbacks.extend(pending.into_iter().filter_map(|id| self.rollback(id)));

        self.state.selected = None;
        self.state.preview = None;
        self.state.add_mode = true;
        self.finish(from, rollbacks, Vec::new())
    }

    /// Selects `id`, leaving add mode. A previously selected location loses
    /// its unsaved position.
    pub fn select(&mut self, id: LocationId) -> Transition {
        let from = self.state.mode();
        let mut rollbacks = Vec::new();

        if self.state.selected != Some(id) {
            rollbacks.extend(self.abort_drag());
            if let Some(previous) = self.state.selected {
                rollbacks.extend(self.rollback(previous));
            }
        }

        self.state.selected = Some(id);
        self.state.add_mode = false;
        self.state.preview = None;

        let events = self
            .confirmed
            .get(&id)
            .map(|location| ViewerEvent::SelectLocation {
                location: location.clone(),
            })
            .into_iter()
            .collect();
        self.finish(from, rollbacks, events)
    }

    /// Clears the selection, rolling back its unsaved position unless the
    /// last confirmed list already carries it.
    pub fn deselect(&mut self) -> Transition {
        let from = self.state.mode();
        let Some(selected) = self.state.selected.take() else {
            return Transition::unchanged(from);
        };
        let mut rollbacks: Vec<Rollback> = self.abort_drag().into_iter().collect();
        rollbacks.extend(self.rollback(selected));
        self.finish(from, rollbacks, Vec::new())
    }

    /// Pointer click. A marker hit selects regardless of mode; an empty hit
    /// in add mode stages a placement; anything else does nothing.
    pub fn click(&mut self, hit: Option<Hit>, coordinate: Point) -> Transition {
        match hit {
            Some(Hit::Location(id)) => self.select(id),
            Some(Hit::Preview) => Transition::unchanged(self.state.mode()),
            None if self.state.add_mode => self.place(coordinate),
            None => Transition::unchanged(self.state.mode()),
        }
    }

    /// Stages a new location at `coordinate` (add mode only)
    pub fn place(&mut self, coordinate: Point) -> Transition {
        let from = self.state.mode();
        if !self.state.add_mode {
            return Transition::unchanged(from);
        }
        self.state.preview = Some(coordinate);
        self.finish(from, Vec::new(), vec![ViewerEvent::MapClick { coordinate }])
    }

    /// Placement saved: back to idle with the preview gone
    pub fn complete_placement(&mut self) -> Transition {
        let from = self.state.mode();
        self.state.add_mode = false;
        self.state.preview = None;
        self.finish(from, Vec::new(), Vec::new())
    }

    /// Starts dragging `id`. Only the selected marker of an editable viewer
    /// outside add mode can be dragged; `None` means the drag was not
    /// consumed.
    pub fn begin_drag(&mut self, id: LocationId) -> Option<Transition> {
        let from = self.state.mode();
        if !self.editable
            || self.state.add_mode
            || self.state.dragging.is_some()
            || self.state.selected != Some(id)
        {
            return None;
        }
        self.state.drag_position = self.effective_position(&id);
        self.state.dragging = Some(id);
        Some(self.finish(from, Vec::new(), Vec::new()))
    }

    /// Moves the dragged marker; returns the dragged id when a drag is active
    pub fn drag_to(&mut self, position: Point) -> Option<LocationId> {
        let id = self.state.dragging?;
        self.state.drag_position = Some(position);
        Some(id)
    }

    /// Drops the dragged marker at `position`, recording it as pending
    pub fn end_drag(&mut self, position: Point) -> Transition {
        let from = self.state.mode();
        let Some(id) = self.state.dragging.take() else {
            return Transition::unchanged(from);
        };
        self.state.drag_position = None;
        self.state.pending.insert(id, position);
        log::debug!("location {} moved to ({:.1}, {:.1})", id, position.x, position.y);

        let event = ViewerEvent::MoveLocation {
            id,
            x: position.x,
            y: position.y,
        };
        self.finish(from, Vec::new(), vec![event])
    }

    /// Updates the hovered location. Returns true when it changed.
    pub fn hover(&mut self, hit: Option<Hit>) -> bool {
        let hovered = match hit {
            Some(Hit::Location(id)) => Some(id),
            _ => None,
        };
        let changed = self.state.hovered != hovered;
        self.state.hovered = hovered;
        changed
    }

    pub fn pointer_left(&mut self) -> bool {
        self.hover(None)
    }

    /// Where the marker for `id` should be drawn right now
    pub fn effective_position(&self, id: &LocationId) -> Option<Point> {
        if self.state.dragging == Some(*id) {
            if let Some(position) = self.state.drag_position {
                return Some(position);
            }
        }
        self.state
            .pending(id)
            .or_else(|| self.confirmed.get(id).map(Location::position))
    }

    /// Positions that override the confirmed records when reconciling markers
    pub fn overrides(&self) -> HashMap<LocationId, Point> {
        let mut overrides = self.state.pending.clone();
        if let (Some(id), Some(position)) = (self.state.dragging, self.state.drag_position) {
            overrides.insert(id, position);
        }
        overrides
    }

    fn finish(&self, from: Mode, rollbacks: Vec<Rollback>, events: Vec<ViewerEvent>) -> Transition {
        let to = self.state.mode();
        if from != to {
            log::debug!("interaction {:?} -> {:?}", from, to);
        }
        Transition {
            from,
            to,
            rollbacks,
            events,
        }
    }

    /// Drops the pending position of `id`. A rollback is reported only when
    /// the marker actually has to move.
    fn rollback(&mut self, id: LocationId) -> Option<Rollback> {
        let discarded = self.state.pending.remove(&id)?;
        let restored = self.confirmed.get(&id)?.position();
        if restored.approx_eq(&discarded) {
            return None;
        }
        log::debug!("rolled back unsaved position of {}", id);
        Some(Rollback {
            id,
            restored,
            discarded,
        })
    }

    /// Cancels an active drag, returning the marker to its pending or
    /// confirmed position.
    fn abort_drag(&mut self) -> Option<Rollback> {
        let id = self.state.dragging.take()?;
        let discarded = self.state.drag_position.take()?;
        let restored = self
            .state
            .pending(&id)
            .or_else(|| self.confirmed.get(&id).map(Location::position))?;
        Some(Rollback {
            id,
            restored,
            discarded,
        })
    }
}
