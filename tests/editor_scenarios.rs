use fablemap::prelude::*;

/// End-to-end interaction scenarios driven through pointer events, the way a
/// canvas host feeds the editor.
#[cfg(test)]
mod editor_scenarios {
    use super::*;

    /// 1024×1024 map on a canvas of the same size, so screen and map
    /// coordinates coincide
    fn editor_with(locations: &[Location]) -> MapEditor {
        let map = MapDescriptor::new(MapId::new_v4(), "The Reach").with_tiles(1024, 1024, 2);
        let options = ViewerOptions {
            fit_padding_px: 0.0,
            ..ViewerOptions::default()
        };
        let mut editor = MapEditor::new(map, options, Point::new(1024.0, 1024.0)).unwrap();
        editor.set_locations(locations.to_vec());
        editor
    }

    fn location(name: &str, x: f64, y: f64) -> Location {
        Location {
            id: LocationId::new_v4(),
            map_id: MapId::new_v4(),
            kind: "town".into(),
            name: name.into(),
            description_md: String::new(),
            x,
            y,
            metadata: None,
        }
    }

    fn click(editor: &mut MapEditor, x: f64, y: f64) {
        editor.handle_input(
            InputEvent::Click {
                position: Point::new(x, y),
                button: MouseButton::Left,
            },
            Instant::now(),
        );
    }

    /// Presses on the marker body just above its anchor at `from` and
    /// releases at `to`
    fn drag_marker(editor: &mut MapEditor, from: Point, to: Point) {
        let grab = Point::new(from.x, from.y - 10.0);
        let drop = to;
        let now = Instant::now();
        editor.handle_input(InputEvent::DragStart { position: grab }, now);
        editor.handle_input(
            InputEvent::Drag {
                position: drop,
                delta: drop.subtract(&grab),
            },
            now,
        );
        editor.handle_input(InputEvent::DragEnd { position: drop }, now);
    }

    fn marker_at(editor: &MapEditor, id: &LocationId) -> Point {
        editor.markers().position(id).unwrap()
    }

    #[test]
    fn test_drag_then_deselect_reverts_marker() {
        let a = location("Bitterbridge", 100.0, 100.0);
        let mut editor = editor_with(&[a.clone()]);
        click(&mut editor, 100.0, 90.0);
        editor.drain_events();

        drag_marker(&mut editor, Point::new(100.0, 100.0), Point::new(150.0, 120.0));
        let dropped = Point::new(150.0, 120.0);
        assert_eq!(marker_at(&editor, &a.id), dropped);
        assert_eq!(editor.state().pending(&a.id), Some(dropped));
        assert_eq!(
            editor.drain_events(),
            vec![ViewerEvent::MoveLocation {
                id: a.id,
                x: dropped.x,
                y: dropped.y
            }]
        );
        assert_eq!(editor.form().unwrap().x, "150");

        editor.deselect();
        assert_eq!(marker_at(&editor, &a.id), Point::new(100.0, 100.0));
        assert_eq!(editor.mode(), Mode::Idle);
    }

    #[test]
    fn test_empty_click_without_add_mode_emits_nothing() {
        let mut editor = editor_with(&[location("Goldengrove", 100.0, 100.0)]);
        click(&mut editor, 600.0, 600.0);
        assert!(editor.drain_events().is_empty());
        assert_eq!(editor.mode(), Mode::Idle);
    }

    #[test]
    fn test_select_a_then_b_rolls_back_a_once() {
        let a = location("Cider Hall", 100.0, 100.0);
        let b = location("Ashford", 400.0, 400.0);
        let mut editor = editor_with(&[a.clone(), b.clone()]);

        click(&mut editor, 100.0, 90.0);
        drag_marker(&mut editor, Point::new(100.0, 100.0), Point::new(200.0, 200.0));
        assert_ne!(marker_at(&editor, &a.id), a.position());

        click(&mut editor, 400.0, 390.0);
        assert_eq!(editor.mode(), Mode::EditMode(b.id));
        assert_eq!(marker_at(&editor, &a.id), a.position());
        assert_eq!(marker_at(&editor, &b.id), b.position());
        assert!(editor.state().pending_coordinates().is_empty());

        // a second selection change finds nothing left to roll back
        click(&mut editor, 100.0, 90.0);
        assert_eq!(marker_at(&editor, &a.id), a.position());
        assert_eq!(marker_at(&editor, &b.id), b.position());
    }

    #[test]
    fn test_entering_add_mode_discards_pending_drag() {
        let a = location("Horn Hill", 300.0, 300.0);
        let mut editor = editor_with(&[a.clone()]);
        click(&mut editor, 300.0, 290.0);
        drag_marker(&mut editor, Point::new(300.0, 300.0), Point::new(350.0, 350.0));

        editor.toggle_add_mode();
        assert_eq!(editor.mode(), Mode::AddMode);
        assert_eq!(marker_at(&editor, &a.id), a.position());
        assert_eq!(editor.state().selected(), None);
        assert_eq!(editor.panel(), Panel::Empty);
    }

    #[test]
    fn test_matching_list_clears_pending() {
        let mut a = location("Highgarden", 500.0, 500.0);
        let mut editor = editor_with(&[a.clone()]);
        click(&mut editor, 500.0, 490.0);
        drag_marker(&mut editor, Point::new(500.0, 500.0), Point::new(520.0, 540.0));
        let dropped = editor.state().pending(&a.id).unwrap();

        a.x = dropped.x;
        a.y = dropped.y;
        editor.set_locations(vec![a.clone()]);
        assert!(editor.state().pending_coordinates().is_empty());

        // the confirmed position survives deselection
        editor.deselect();
        assert_eq!(marker_at(&editor, &a.id), dropped);
    }

    #[test]
    fn test_reconcile_is_idempotent_through_editor() {
        let locations = vec![location("Oldtown", 10.0, 10.0), location("Tumbleton", 20.0, 20.0)];
        let mut editor = editor_with(&locations);
        let before: Vec<(u64, u64)> = editor
            .markers()
            .features()
            .iter()
            .map(|f| (f.feature_id, f.revision))
            .collect();

        editor.set_locations(locations.clone());
        let after: Vec<(u64, u64)> = editor
            .markers()
            .features()
            .iter()
            .map(|f| (f.feature_id, f.revision))
            .collect();
        assert_eq!(before, after);
        assert_eq!(editor.markers().len(), 2);
    }

    #[test]
    fn test_hover_follows_pointer() {
        let a = location("Longtable", 200.0, 200.0);
        let mut editor = editor_with(&[a.clone()]);
        let now = Instant::now();

        editor.handle_input(InputEvent::PointerMove { position: Point::new(200.0, 185.0) }, now);
        assert_eq!(editor.state().hovered(), Some(a.id));
        let frame = editor.frame();
        assert_eq!(
            frame.marker(&FeatureKind::Location(a.id)).unwrap().variant,
            MarkerVariant::Hovered
        );

        editor.handle_input(InputEvent::PointerLeave, now);
        assert_eq!(editor.state().hovered(), None);
    }

    #[test]
    fn test_unselected_marker_drag_pans_view() {
        let a = location("Brightwater Keep", 1000.0, 1000.0);
        let map = MapDescriptor::new(MapId::new_v4(), "The Reach").with_tiles(2048, 2048, 3);
        let mut editor = MapEditor::new(map, ViewerOptions::default(), Point::new(512.0, 512.0)).unwrap();
        editor.set_locations(vec![a.clone()]);
        editor.view_mut().set_zoom(3.0);
        editor.view_mut().set_center(Point::new(1024.0, 1024.0));

        let now = Instant::now();
        let screen = editor.view().map_to_screen(&a.position());
        let grab = Point::new(screen.x, screen.y - 10.0);
        editor.handle_input(InputEvent::DragStart { position: grab }, now);
        editor.handle_input(
            InputEvent::Drag {
                position: grab.add(&Point::new(-40.0, 0.0)),
                delta: Point::new(-40.0, 0.0),
            },
            now,
        );
        editor.handle_input(InputEvent::DragEnd { position: grab }, now);

        assert_eq!(editor.view().center(), Point::new(1064.0, 1024.0));
        assert_eq!(marker_at(&editor, &a.id), a.position());
        assert!(editor.drain_events().is_empty());
    }

    #[test]
    fn test_read_only_viewer_selects_but_never_drags() {
        let a = location("Three Towers", 100.0, 100.0);
        let map = MapDescriptor::new(MapId::new_v4(), "The Reach").with_tiles(1024, 1024, 2);
        let options = ViewerOptions {
            fit_padding_px: 0.0,
            ..ViewerProfile::ReadOnly.resolve()
        };
        let mut editor = MapEditor::new(map, options, Point::new(1024.0, 1024.0)).unwrap();
        editor.set_locations(vec![a.clone()]);

        editor.toggle_add_mode();
        assert_eq!(editor.mode(), Mode::Idle);

        click(&mut editor, 100.0, 90.0);
        assert_eq!(editor.panel(), Panel::Details(&a));
        drag_marker(&mut editor, Point::new(100.0, 100.0), Point::new(300.0, 300.0));
        assert_eq!(marker_at(&editor, &a.id), a.position());
        assert!(editor
            .drain_events()
            .iter()
            .all(|e| matches!(e, ViewerEvent::SelectLocation { .. })));
    }

    #[test]
    fn test_placement_outside_map_is_ignored() {
        let map = MapDescriptor::new(MapId::new_v4(), "The Reach").with_tiles(512, 512, 1);
        let mut editor = MapEditor::new(map, ViewerOptions::default(), Point::new(1024.0, 1024.0)).unwrap();
        editor.toggle_add_mode();

        // fitted 512px map leaves a wide empty margin on a 1024px canvas
        click(&mut editor, 5.0, 5.0);
        assert_eq!(editor.state().preview(), None);
        click(&mut editor, 512.0, 512.0);
        assert!(editor.state().preview().is_some());
    }

    #[test]
    fn test_drag_aborted_by_response_keeps_confirmed_position() {
        let a = location("Stonehelm", 100.0, 100.0);
        let mut editor = editor_with(&[a.clone()]);
        editor.select_location(a.id).unwrap();
        let token = editor.submit_form().unwrap();
        editor.drain_events();

        let now = Instant::now();
        let grab = Point::new(100.0, 90.0);
        let drop = Point::new(300.0, 300.0);
        editor.handle_input(InputEvent::DragStart { position: grab }, now);
        editor.handle_input(
            InputEvent::Drag {
                position: drop,
                delta: drop.subtract(&grab),
            },
            now,
        );
        assert_eq!(editor.mode(), Mode::Dragging(a.id));

        // the save lands mid-drag and deselects
        assert!(editor.resolve_request(token, RequestOutcome::Updated(a.clone())));
        assert_eq!(editor.mode(), Mode::Idle);
        editor.handle_input(InputEvent::DragEnd { position: drop }, now);

        assert_eq!(marker_at(&editor, &a.id), a.position());
        assert_eq!(editor.state().pending(&a.id), None);
        assert!(!editor
            .drain_events()
            .iter()
            .any(|e| matches!(e, ViewerEvent::MoveLocation { .. })));
    }

    #[test]
    fn test_late_create_keeps_unsaved_edits() {
        let b = location("Blackhaven", 600.0, 600.0);
        let mut editor = editor_with(&[b.clone()]);

        editor.toggle_add_mode();
        click(&mut editor, 200.0, 200.0);
        let form = editor.form_mut().unwrap();
        form.name = "Summerhall".into();
        form.kind = "castle".into();
        let token = editor.submit_form().unwrap();

        // the user moves on before the backend answers
        click(&mut editor, 600.0, 590.0);
        assert_eq!(editor.mode(), Mode::EditMode(b.id));
        editor.form_mut().unwrap().name = "Blackhaven (unsaved)".into();

        let created = Location {
            name: "Summerhall".into(),
            kind: "castle".into(),
            ..location("", 200.0, 200.0)
        };
        assert!(editor.resolve_request(token, RequestOutcome::Created(created.clone())));

        assert_eq!(editor.mode(), Mode::EditMode(b.id));
        assert_eq!(editor.form().unwrap().name, "Blackhaven (unsaved)");
        assert_eq!(editor.locations().len(), 2);
        assert_eq!(marker_at(&editor, &created.id), created.position());
        assert!(!editor.markers().preview().visible);
    }
}
