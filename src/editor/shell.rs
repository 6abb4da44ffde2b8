use crate::{
    core::{
        config::ViewerOptions, geo::Point, projection::PixelProjection, viewport::View,
    },
    data::{Location, LocationId, MapDescriptor},
    editor::{
        form::LocationForm,
        panel::Panel,
        requests::{RequestKey, RequestOutcome, RequestToken, RequestTracker},
    },
    input::{
        events::{InputEvent, MouseButton, ViewerEvent},
        handler::EventQueue,
    },
    interaction::{
        controller::{Hit, InteractionController, Transition},
        state::{InteractionState, Mode},
    },
    layers::{marker::MarkerLayer, tile::TileLayer},
    rendering::{RenderFrame, SceneRenderer},
    tiles::source::PixelTileSource,
    Error, Result,
};
use std::time::Instant;

/// Pointer gesture in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gesture {
    Idle,
    PanView,
    DragMarker(LocationId),
}

#[derive(Debug, Clone, PartialEq)]
enum FormState {
    Edit(LocationId, LocationForm),
    New(LocationForm),
}

/// The map viewer/editor: projection, tiles, markers and the interaction
/// controller behind one input-driven facade.
///
/// The editor never talks to the backend. Requests come out of
/// [`drain_events`](Self::drain_events) carrying a [`RequestToken`]; the host
/// performs them and reports back through
/// [`resolve_request`](Self::resolve_request).
pub struct MapEditor {
    map: MapDescriptor,
    options: ViewerOptions,
    projection: PixelProjection,
    view: View,
    tiles: TileLayer,
    markers: MarkerLayer,
    controller: InteractionController,
    locations: Vec<Location>,
    events: EventQueue,
    requests: RequestTracker,
    form: Option<FormState>,
    gesture: Gesture,
    notice: Option<String>,
}

impl MapEditor {
    /// Creates an editor for `map`, fitted to a canvas of `size` pixels.
    /// Fails when the map has no tiles yet.
    pub fn new(map: MapDescriptor, options: ViewerOptions, size: Point) -> Result<Self> {
        options.validate()?;
        let projection = PixelProjection::for_map(&map)?;
        let view = View::new(&projection, size, options.fit_padding_px);
        let source = PixelTileSource::new(options.tile_base_url.clone(), map.id, projection.max_zoom());

        log::info!(
            "opening map {} ({}x{}, max zoom {}, {})",
            map.id,
            projection.width(),
            projection.height(),
            projection.max_zoom(),
            if options.editable { "editable" } else { "read-only" }
        );

        Ok(Self {
            tiles: TileLayer::new(Box::new(source)),
            markers: MarkerLayer::new(options.marker_icon_url.clone(), options.preview_icon().to_string()),
            controller: InteractionController::new(options.editable),
            map,
            options,
            projection,
            view,
            locations: Vec::new(),
            events: EventQueue::new(),
            requests: RequestTracker::new(),
            form: None,
            gesture: Gesture::Idle,
            notice: None,
        })
    }

    /// Viewer for public and shared-link pages: hover and select only
    pub fn read_only(map: MapDescriptor, options: ViewerOptions, size: Point) -> Result<Self> {
        Self::new(map, options.with_editable(false), size)
    }

    pub fn map(&self) -> &MapDescriptor {
        &self.map
    }

    pub fn options(&self) -> &ViewerOptions {
        &self.options
    }

    pub fn projection(&self) -> &PixelProjection {
        &self.projection
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut View {
        &mut self.view
    }

    pub fn markers(&self) -> &MarkerLayer {
        &self.markers
    }

    pub fn tiles(&self) -> &TileLayer {
        &self.tiles
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn state(&self) -> &InteractionState {
        self.controller.state()
    }

    pub fn mode(&self) -> Mode {
        self.controller.mode()
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn requests(&self) -> &RequestTracker {
        &self.requests
    }

    pub fn events(&mut self) -> &mut EventQueue {
        &mut self.events
    }

    /// Events produced since the last call, oldest first
    pub fn drain_events(&mut self) -> Vec<ViewerEvent> {
        self.events.drain()
    }

    /// Last backend failure reported through [`resolve_request`](Self::resolve_request)
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Replaces the location list (initial load or refetch)
    pub fn set_locations(&mut self, locations: Vec<Location>) {
        self.locations = locations;
        self.refresh();
    }

    /// Swaps in a refreshed descriptor, e.g. once its tiles are ready. The
    /// view is refitted when the pyramid changed.
    pub fn set_map(&mut self, map: MapDescriptor) -> Result<()> {
        let projection = PixelProjection::for_map(&map)?;
        if projection != self.projection {
            self.view = View::new(&projection, self.view.size(), self.options.fit_padding_px);
            let source = PixelTileSource::new(
                self.options.tile_base_url.clone(),
                map.id,
                projection.max_zoom(),
            );
            self.tiles = TileLayer::new(Box::new(source));
            self.projection = projection;
        }
        self.map = map;
        Ok(())
    }

    /// Feeds one pointer event through hit testing and the controller
    pub fn handle_input(&mut self, event: InputEvent, now: Instant) {
        match event {
            InputEvent::PointerMove { position } => {
                if self.gesture == Gesture::Idle {
                    let hit = self.hit_test(position);
                    self.controller.hover(hit);
                }
            }
            InputEvent::PointerLeave => {
                self.controller.pointer_left();
            }
            InputEvent::Click { position, button } => {
                if button == MouseButton::Left {
                    self.click(position);
                }
            }
            InputEvent::DragStart { position } => self.drag_start(position),
            InputEvent::Drag { position, delta } => match self.gesture {
                Gesture::DragMarker(id) => {
                    let point = self.drop_point(position);
                    if self.controller.drag_to(point).is_some() {
                        self.markers.set_position(&id, point);
                    }
                }
                Gesture::PanView => self.view.pan_by(delta),
                Gesture::Idle => {}
            },
            InputEvent::DragEnd { position } => {
                if let Gesture::DragMarker(id) = self.gesture {
                    let point = self.drop_point(position);
                    let transition = self.controller.end_drag(point);
                    // the drag may have been aborted under the pointer
                    if transition.from == Mode::Dragging(id) {
                        self.markers.set_position(&id, point);
                        if let Some(FormState::Edit(editing, form)) = &mut self.form {
                            if *editing == id {
                                form.set_coordinate(point);
                            }
                        }
                    }
                    self.apply(transition);
                }
                self.gesture = Gesture::Idle;
            }
            InputEvent::Scroll { delta, position } => {
                if self.options.zoom_on_wheel && delta != 0.0 {
                    let zoom = self.view.target_zoom() + delta * self.options.wheel_zoom_step;
                    self.view.zoom_at(zoom, position);
                }
            }
            InputEvent::Resize { size } => self.view.set_size(size),
        }
        self.tick(now);
    }

    fn hit_test(&mut self, position: Point) -> Option<Hit> {
        self.markers
            .hit_test(
                self.controller.state(),
                &self.view,
                position,
                self.options.hit_tolerance_px,
            )
            .map(Hit::from)
    }

    fn click(&mut self, position: Point) {
        let hit = self.hit_test(position);
        let coordinate = self.view.screen_to_map(&position);
        if hit.is_none() && self.controller.state().is_add_mode() && !self.projection.contains(&coordinate) {
            log::debug!("ignoring placement outside the map at {:?}", coordinate);
            return;
        }
        let transition = self.controller.click(hit, coordinate);
        self.apply(transition);
    }

    fn drag_start(&mut self, position: Point) {
        if let Some(Hit::Location(id)) = self.hit_test(position) {
            if let Some(transition) = self.controller.begin_drag(id) {
                self.gesture = Gesture::DragMarker(id);
                self.apply(transition);
                return;
            }
        }
        self.gesture = if self.options.pan_on_drag {
            Gesture::PanView
        } else {
            Gesture::Idle
        };
    }

    /// Map point under `position`, kept on the map image
    fn drop_point(&self, position: Point) -> Point {
        self.projection.clamp(&self.view.screen_to_map(&position))
    }

    pub fn toggle_add_mode(&mut self) {
        let transition = self.controller.toggle_add_mode();
        self.apply(transition);
    }

    /// Selects a location, e.g. from a list outside the map
    pub fn select_location(&mut self, id: LocationId) -> Result<()> {
        if self.controller.location(&id).is_none() {
            return Err(Error::NotFound(format!("location {}", id)));
        }
        let transition = self.controller.select(id);
        self.apply(transition);
        Ok(())
    }

    pub fn deselect(&mut self) {
        let transition = self.controller.deselect();
        self.apply(transition);
    }

    pub fn form(&self) -> Option<&LocationForm> {
        match &self.form {
            Some(FormState::Edit(_, form)) | Some(FormState::New(form)) => Some(form),
            None => None,
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut LocationForm> {
        match &mut self.form {
            Some(FormState::Edit(_, form)) | Some(FormState::New(form)) => Some(form),
            None => None,
        }
    }

    /// Validates the open form and emits the matching create or update
    /// request. Selection and pending positions stay until the outcome
    /// arrives.
    pub fn submit_form(&mut self) -> Result<RequestToken> {
        let event = match &self.form {
            Some(FormState::New(form)) => {
                let data = form.to_new_location(self.map.id)?;
                let request = self.requests.issue(RequestKey::Create);
                ViewerEvent::AddLocation { request, data }
            }
            Some(FormState::Edit(id, form)) => {
                let data = form.to_patch()?;
                let request = self.requests.issue(RequestKey::Update(*id));
                ViewerEvent::UpdateLocation {
                    request,
                    id: *id,
                    data,
                }
            }
            None => return Err(Error::NotFound("no open location form".into())),
        };
        let token = event.request().ok_or_else(|| Error::Backend("request without token".into()))?;
        self.notice = None;
        self.events.emit(event);
        Ok(token)
    }

    /// Closes the open form: leaves add mode or drops the selection
    pub fn cancel_form(&mut self) {
        match self.form {
            Some(FormState::New(_)) => {
                self.requests.cancel(&RequestKey::Create);
                let transition = self.controller.complete_placement();
                self.apply(transition);
            }
            Some(FormState::Edit(..)) => self.deselect(),
            None => {}
        }
    }

    /// Emits a delete request for the selected location
    pub fn delete_selected(&mut self) -> Result<RequestToken> {
        if !self.options.editable {
            return Err(Error::Config("viewer is read-only".into()));
        }
        let id = self
            .controller
            .state()
            .selected()
            .ok_or_else(|| Error::NotFound("no selected location".into()))?;
        let request = self.requests.issue(RequestKey::Delete(id));
        self.notice = None;
        self.events.emit(ViewerEvent::DeleteLocation { request, id });
        Ok(request)
    }

    /// Applies the outcome of a request issued by this editor. Stale tokens
    /// are ignored and return false. Failures keep selection and pending
    /// positions untouched so the user can retry.
    pub fn resolve_request(&mut self, token: RequestToken, outcome: RequestOutcome) -> bool {
        if !self.requests.complete(&token) {
            return false;
        }

        match (token.key, outcome) {
            (key, RequestOutcome::Failed(reason)) => {
                log::warn!("{:?} failed: {}", key, reason);
                self.notice = Some(reason);
            }
            (RequestKey::Create, RequestOutcome::Created(location)) => {
                log::info!("location {} created", location.id);
                self.locations.push(location);
                let placing = self.controller.mode() == Mode::AddMode
                    && matches!(self.form, Some(FormState::New(_)));
                if placing {
                    let transition = self.controller.complete_placement();
                    self.form = None;
                    self.apply(transition);
                } else {
                    log::debug!("create confirmed after leaving add mode");
                }
                self.refresh();
            }
            (RequestKey::Update(id), RequestOutcome::Updated(location)) => {
                match self.locations.iter_mut().find(|l| l.id == id) {
                    Some(existing) => *existing = location,
                    None => self.locations.push(location),
                }
                self.refresh();
                if self.controller.state().selected() == Some(id) {
                    self.deselect();
                }
            }
            (RequestKey::Delete(id), RequestOutcome::Deleted) => {
                log::info!("location {} deleted", id);
                self.locations.retain(|l| l.id != id);
                self.refresh();
            }
            (key, outcome) => {
                log::warn!("unexpected outcome {:?} for {:?}", outcome, key);
                return false;
            }
        }
        true
    }

    pub fn zoom_in(&mut self, now: Instant) {
        self.view.zoom_by(
            self.options.zoom_delta,
            now,
            self.options.zoom_duration(),
            self.options.zoom_easing,
        );
    }

    pub fn zoom_out(&mut self, now: Instant) {
        self.view.zoom_by(
            -self.options.zoom_delta,
            now,
            self.options.zoom_duration(),
            self.options.zoom_easing,
        );
    }

    pub fn fit_extent(&mut self) {
        self.view.fit_extent();
    }

    /// Advances animations. Returns true while another frame is needed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.view.tick(now)
    }

    /// Tiles and styled markers for the current view
    pub fn frame(&mut self) -> RenderFrame {
        RenderFrame {
            size: self.view.size(),
            zoom: self.view.zoom(),
            tiles: self.tiles.visible_tiles(&self.projection, &self.view),
            markers: self.markers.styled(self.controller.state(), &self.view),
        }
    }

    pub fn render<R: SceneRenderer>(&mut self, renderer: &mut R) -> std::result::Result<(), R::Error> {
        let frame = self.frame();
        renderer.render(&frame)
    }

    /// What the side panel should show
    pub fn panel(&self) -> Panel<'_> {
        match &self.form {
            Some(FormState::New(form)) => Panel::NewLocation(form),
            Some(FormState::Edit(id, form)) => match self.controller.location(id) {
                Some(location) => Panel::EditLocation { location, form },
                None => Panel::Empty,
            },
            None => self
                .controller
                .state()
                .selected()
                .and_then(|id| self.controller.location(&id))
                .map_or(Panel::Empty, Panel::Details),
        }
    }

    fn refresh(&mut self) {
        let transition = self.controller.sync_locations(&self.locations);
        self.markers.reconcile(&self.locations, &self.controller.overrides());
        self.apply(transition);
    }

    /// Pushes a controller transition out to the markers, form and queue
    fn apply(&mut self, transition: Transition) {
        for rollback in &transition.rollbacks {
            self.markers.set_position(&rollback.id, rollback.restored);
        }
        self.markers.set_preview(self.controller.state().preview());
        self.events.extend(transition.events);
        self.sync_form();
    }

    fn sync_form(&mut self) {
        let state = self.controller.state();
        self.form = match (self.controller.mode(), self.form.take()) {
            _ if !self.options.editable => None,
            (Mode::EditMode(id) | Mode::Dragging(id), Some(FormState::Edit(editing, form)))
                if editing == id =>
            {
                Some(FormState::Edit(id, form))
            }
            (Mode::EditMode(id) | Mode::Dragging(id), _) => {
                self.controller.location(&id).map(|location| {
                    let mut form = LocationForm::from_location(location);
                    if let Some(position) = self.controller.effective_position(&id) {
                        form.set_coordinate(position);
                    }
                    FormState::Edit(id, form)
                })
            }
            (Mode::AddMode, previous) => state.preview().map(|coordinate| match previous {
                Some(FormState::New(mut form)) => {
                    form.set_coordinate(coordinate);
                    FormState::New(form)
                }
                _ => FormState::New(LocationForm::for_coordinate(coordinate)),
            }),
            (Mode::Idle, _) => None,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MapId;
    use std::time::Duration;

    fn map() -> MapDescriptor {
        MapDescriptor::new(MapId::new_v4(), "Westeros").with_tiles(1024, 1024, 2)
    }

    fn location(map: &MapDescriptor, x: f64, y: f64) -> Location {
        Location {
            id: LocationId::new_v4(),
            map_id: map.id,
            kind: "city".into(),
            name: "Lannisport".into(),
            description_md: String::new(),
            x,
            y,
            metadata: None,
        }
    }

    /// 1:1 editor whose canvas exactly covers the map
    fn editor() -> MapEditor {
        let options = ViewerOptions {
            fit_padding_px: 0.0,
            ..ViewerOptions::default()
        };
        MapEditor::new(map(), options, Point::new(1024.0, 1024.0)).unwrap()
    }

    #[test]
    fn test_map_without_tiles_is_rejected() {
        let map = MapDescriptor::new(MapId::new_v4(), "Draft");
        assert!(MapEditor::new(map, ViewerOptions::default(), Point::new(100.0, 100.0)).is_err());
    }

    #[test]
    fn test_initial_view_fits_with_padding() {
        let editor = MapEditor::new(map(), ViewerOptions::default(), Point::new(552.0, 552.0)).unwrap();
        assert_eq!(editor.view().center(), Point::new(512.0, 512.0));
        // 1024 map px into 512 screen px
        assert!((editor.view().resolution() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_click_selects_and_opens_form() {
        let mut editor = editor();
        let a = location(editor.map(), 100.0, 100.0);
        editor.set_locations(vec![a.clone()]);

        editor.handle_input(
            InputEvent::Click {
                position: Point::new(100.0, 90.0),
                button: MouseButton::Left,
            },
            Instant::now(),
        );
        assert_eq!(editor.mode(), Mode::EditMode(a.id));
        assert!(matches!(editor.panel(), Panel::EditLocation { .. }));
        assert_eq!(
            editor.drain_events(),
            vec![ViewerEvent::SelectLocation { location: a }]
        );
    }

    #[test]
    fn test_read_only_shows_details() {
        let map = map();
        let a = location(&map, 100.0, 100.0);
        let mut editor = MapEditor::read_only(map, ViewerOptions::default(), Point::new(1024.0, 1024.0)).unwrap();
        editor.set_locations(vec![a.clone()]);
        editor.select_location(a.id).unwrap();

        assert_eq!(editor.panel(), Panel::Details(&a));
        assert!(editor.submit_form().is_err());
        assert!(editor.delete_selected().is_err());
    }

    #[test]
    fn test_add_flow_creates_location() {
        let mut editor = editor();
        let now = Instant::now();
        editor.toggle_add_mode();
        editor.handle_input(
            InputEvent::Click {
                position: Point::new(300.0, 400.0),
                button: MouseButton::Left,
            },
            now,
        );
        assert_eq!(editor.markers().preview().position, Point::new(300.0, 400.0));
        assert!(editor.markers().preview().visible);

        let form = editor.form_mut().unwrap();
        form.name = "Casterly Rock".into();
        form.kind = "castle".into();
        let token = editor.submit_form().unwrap();

        let events = editor.drain_events();
        let data = match events.last() {
            Some(ViewerEvent::AddLocation { data, .. }) => data.clone(),
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!((data.x, data.y), (300.0, 400.0));

        let created = data.into_location(LocationId::new_v4());
        assert!(editor.resolve_request(token, RequestOutcome::Created(created.clone())));
        assert_eq!(editor.mode(), Mode::Idle);
        assert!(!editor.markers().preview().visible);
        assert_eq!(editor.markers().position(&created.id), Some(Point::new(300.0, 400.0)));
        assert_eq!(editor.panel(), Panel::Empty);
    }

    #[test]
    fn test_failed_request_keeps_state() {
        let mut editor = editor();
        let a = location(editor.map(), 100.0, 100.0);
        editor.set_locations(vec![a.clone()]);
        editor.select_location(a.id).unwrap();

        let token = editor.delete_selected().unwrap();
        assert!(editor.resolve_request(token, RequestOutcome::Failed("boom".into())));
        assert_eq!(editor.notice(), Some("boom"));
        assert_eq!(editor.mode(), Mode::EditMode(a.id));
        assert_eq!(editor.locations().len(), 1);
    }

    #[test]
    fn test_wheel_zoom_keeps_cursor_point() {
        let mut editor = MapEditor::new(map(), ViewerOptions::default(), Point::new(256.0, 256.0)).unwrap();
        editor.view_mut().set_zoom(1.0);
        let cursor = Point::new(100.0, 200.0);
        let before = editor.view().screen_to_map(&cursor);

        editor.handle_input(InputEvent::Scroll { delta: 1.0, position: cursor }, Instant::now());
        assert_eq!(editor.view().zoom(), 1.5);
        assert!(editor.view().screen_to_map(&cursor).approx_eq(&before));
    }

    #[test]
    fn test_zoom_controls_animate() {
        let mut editor = editor();
        let now = Instant::now();
        editor.zoom_out(now);
        assert!(editor.view().is_animating());
        assert!(!editor.tick(now + Duration::from_secs(1)));
        assert_eq!(editor.view().zoom(), 1.0);
    }
}
