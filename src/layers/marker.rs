use crate::{
    constants::MARKER_ICON_SIZE,
    core::{bounds::Bounds, geo::Point, viewport::View},
    data::{Location, LocationId},
    interaction::state::InteractionState,
    layers::{
        base::{Layer, LayerKind, LayerProperties},
        style::{MarkerStyle, MarkerVariant, StyleCache},
    },
    prelude::{HashMap, HashSet},
    rendering::MarkerDraw,
    spatial::{SpatialIndex, SpatialItem},
};

/// What a marker feature stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Location(LocationId),
    /// The reserved placement preview
    Preview,
}

/// One renderable point in the marker layer
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerFeature {
    /// Allocated once when the feature is created, never reused
    pub feature_id: u64,
    pub kind: FeatureKind,
    pub position: Point,
    pub visible: bool,
    /// Bumped on every geometry change
    pub revision: u64,
}

impl MarkerFeature {
    fn new(feature_id: u64, kind: FeatureKind, position: Point) -> Self {
        Self {
            feature_id,
            kind,
            position,
            visible: true,
            revision: 0,
        }
    }

    fn move_to(&mut self, position: Point) -> bool {
        if self.position.approx_eq(&position) {
            return false;
        }
        self.position = position;
        self.revision += 1;
        true
    }
}

/// Summary of one reconcile pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub added: Vec<LocationId>,
    pub removed: Vec<LocationId>,
    pub moved: Vec<LocationId>,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.moved.is_empty()
    }
}

/// Feature registry holding one marker per location plus the preview marker
///
/// Features are keyed by location id and updated in place, so a refreshed
/// location list never recreates markers that merely moved.
pub struct MarkerLayer {
    properties: LayerProperties,
    features: HashMap<LocationId, MarkerFeature>,
    preview: MarkerFeature,
    next_feature_id: u64,
    icon_url: String,
    preview_icon_url: String,
    styles: StyleCache,
    index: SpatialIndex<LocationId>,
    index_dirty: bool,
}

impl MarkerLayer {
    pub fn new(icon_url: impl Into<String>, preview_icon_url: impl Into<String>) -> Self {
        Self {
            properties: LayerProperties::new("markers", LayerKind::Marker).interactive(),
            features: HashMap::default(),
            preview: MarkerFeature {
                visible: false,
                ..MarkerFeature::new(0, FeatureKind::Preview, Point::default())
            },
            next_feature_id: 1,
            icon_url: icon_url.into(),
            preview_icon_url: preview_icon_url.into(),
            styles: StyleCache::new(),
            index: SpatialIndex::new(),
            index_dirty: false,
        }
    }

    /// Brings the registry in line with `locations`. Positions in
    /// `overrides` (pending drags) win over the record's own coordinate.
    pub fn reconcile(
        &mut self,
        locations: &[Location],
        overrides: &HashMap<LocationId, Point>,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let incoming: HashSet<LocationId> = locations.iter().map(|l| l.id).collect();

        self.features.retain(|id, _| {
            let keep = incoming.contains(id);
            if !keep {
                report.removed.push(*id);
            }
            keep
        });

        for location in locations {
            let position = overrides
                .get(&location.id)
                .copied()
                .unwrap_or_else(|| location.position());

            match self.features.get_mut(&location.id) {
                Some(feature) => {
                    if feature.move_to(position) {
                        report.moved.push(location.id);
                    }
                }
                None => {
                    let feature_id = self.next_feature_id;
                    self.next_feature_id += 1;
                    self.features.insert(
                        location.id,
                        MarkerFeature::new(feature_id, FeatureKind::Location(location.id), position),
                    );
                    report.added.push(location.id);
                }
            }
        }

        if !report.is_noop() {
            self.index_dirty = true;
            log::debug!(
                "markers reconciled: +{} -{} ~{}",
                report.added.len(),
                report.removed.len(),
                report.moved.len()
            );
        }
        report
    }

    /// Moves one marker. Returns false for unknown ids.
    pub fn set_position(&mut self, id: &LocationId, position: Point) -> bool {
        match self.features.get_mut(id) {
            Some(feature) => {
                if feature.move_to(position) {
                    self.index_dirty = true;
                }
                true
            }
            None => false,
        }
    }

    /// Shows the preview marker at `position`, or hides it on `None`. The
    /// preview feature itself is never removed.
    pub fn set_preview(&mut self, position: Option<Point>) {
        match position {
            Some(position) => {
                self.preview.move_to(position);
                self.preview.visible = true;
            }
            None => self.preview.visible = false,
        }
    }

    pub fn feature(&self, id: &LocationId) -> Option<&MarkerFeature> {
        self.features.get(id)
    }

    pub fn position(&self, id: &LocationId) -> Option<Point> {
        self.features.get(id).map(|f| f.position)
    }

    pub fn preview(&self) -> &MarkerFeature {
        &self.preview
    }

    /// Location features in creation order
    pub fn features(&self) -> Vec<&MarkerFeature> {
        let mut features: Vec<_> = self.features.values().collect();
        features.sort_by_key(|f| f.feature_id);
        features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn styles(&self) -> &StyleCache {
        &self.styles
    }

    /// Picks the variant for a feature from the interaction state:
    /// dragging, then selected, then hovered.
    pub fn resolve_variant(kind: FeatureKind, state: &InteractionState) -> MarkerVariant {
        let id = match kind {
            FeatureKind::Preview => return MarkerVariant::Preview,
            FeatureKind::Location(id) => Some(id),
        };
        if state.dragging() == id {
            MarkerVariant::Dragging
        } else if state.selected() == id {
            MarkerVariant::Selected
        } else if state.hovered() == id {
            MarkerVariant::Hovered
        } else {
            MarkerVariant::Normal
        }
    }

    fn style_for(&mut self, kind: FeatureKind, variant: MarkerVariant) -> std::sync::Arc<MarkerStyle> {
        let icon = match kind {
            FeatureKind::Preview => &self.preview_icon_url,
            FeatureKind::Location(_) => &self.icon_url,
        };
        self.styles.get(icon, variant)
    }

    /// Draw list for the current state, bottom to top
    pub fn styled(&mut self, state: &InteractionState, view: &View) -> Vec<MarkerDraw> {
        if !self.properties.visible {
            return Vec::new();
        }

        let mut visible: Vec<(u64, FeatureKind, Point)> = self
            .features
            .values()
            .filter(|f| f.visible)
            .map(|f| (f.feature_id, f.kind, f.position))
            .collect();
        visible.sort_by_key(|(feature_id, _, _)| *feature_id);
        if self.preview.visible {
            visible.push((u64::MAX, FeatureKind::Preview, self.preview.position));
        }

        let mut draws: Vec<MarkerDraw> = visible
            .into_iter()
            .map(|(_, kind, position)| {
                let variant = Self::resolve_variant(kind, state);
                MarkerDraw {
                    kind,
                    anchor: view.map_to_screen(&position),
                    variant,
                    style: self.style_for(kind, variant),
                }
            })
            .collect();
        // stable sort keeps creation order within a variant
        draws.sort_by_key(|d| d.style.z_order);
        draws
    }

    /// Topmost feature whose icon, grown by `tolerance` pixels, contains the
    /// screen point.
    pub fn hit_test(
        &mut self,
        state: &InteractionState,
        view: &View,
        screen: Point,
        tolerance: f64,
    ) -> Option<FeatureKind> {
        if !self.properties.visible || !self.properties.interactive {
            return None;
        }
        self.refresh_index();

        // Anchors sit at the icon's bottom edge, so candidates lie below the
        // pointer by up to one (largest) icon height.
        let (max_w, max_h) = (MARKER_ICON_SIZE.0 * 1.5, MARKER_ICON_SIZE.1 * 1.5);
        let search = Bounds::new(
            view.screen_to_map(&Point::new(screen.x - max_w / 2.0 - tolerance, screen.y - tolerance)),
            view.screen_to_map(&Point::new(
                screen.x + max_w / 2.0 + tolerance,
                screen.y + max_h + tolerance,
            )),
        );

        let candidates: Vec<(u64, FeatureKind, Point)> = self
            .index
            .query(&search)
            .into_iter()
            .filter_map(|item| self.features.get(&item.data))
            .filter(|f| f.visible)
            .map(|f| (f.feature_id, f.kind, f.position))
            .chain(
                self.preview
                    .visible
                    .then_some((u64::MAX, FeatureKind::Preview, self.preview.position)),
            )
            .collect();

        let mut best: Option<((i32, u64), FeatureKind)> = None;
        for (feature_id, kind, position) in candidates {
            let variant = Self::resolve_variant(kind, state);
            let style = self.style_for(kind, variant);
            let hit_box = style
                .icon_box(view.map_to_screen(&position))
                .expanded(tolerance);
            if !hit_box.contains(&screen) {
                continue;
            }
            let rank = (style.z_order, feature_id);
            if best.map_or(true, |(top, _)| rank > top) {
                best = Some((rank, kind));
            }
        }
        best.map(|(_, kind)| kind)
    }

    fn refresh_index(&mut self) {
        if !self.index_dirty {
            return;
        }
        let items = self
            .features
            .iter()
            .map(|(id, f)| SpatialItem::from_point(f.position, *id))
            .collect();
        self.index = SpatialIndex::bulk_load(items);
        self.index_dirty = false;
    }
}

impl Layer for MarkerLayer {
    crate::impl_layer!(properties);

    fn bounds(&self) -> Option<Bounds> {
        let mut positions = self.features.values().map(|f| f.position);
        let first = positions.next()?;
        Some(positions.fold(Bounds::new(first, first), |b, p| {
            Bounds::from_coords(b.min.x.min(p.x), b.min.y.min(p.y), b.max.x.max(p.x), b.max.y.max(p.y))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::projection::PixelProjection, data::MapId};

    fn location(x: f64, y: f64) -> Location {
        Location {
            id: LocationId::new_v4(),
            map_id: MapId::new_v4(),
            kind: "city".into(),
            name: "Somewhere".into(),
            description_md: String::new(),
            x,
            y,
            metadata: None,
        }
    }

    /// 1:1 view where screen and map coordinates coincide
    fn identity_view() -> View {
        let projection = PixelProjection::new(800, 600, 0).unwrap();
        View::new(&projection, Point::new(800.0, 600.0), 0.0)
    }

    fn layer() -> MarkerLayer {
        MarkerLayer::new("pin.png", "pin-preview.png")
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let mut layer = layer();
        let locations = vec![location(10.0, 10.0), location(20.0, 20.0)];
        let none = HashMap::default();

        let first = layer.reconcile(&locations, &none);
        assert_eq!(first.added.len(), 2);
        let ids: Vec<u64> = layer.features().iter().map(|f| f.feature_id).collect();

        let second = layer.reconcile(&locations, &none);
        assert!(second.is_noop());
        assert_eq!(layer.len(), 2);
        let again: Vec<u64> = layer.features().iter().map(|f| f.feature_id).collect();
        assert_eq!(ids, again);
    }

    #[test]
    fn test_reconcile_updates_in_place() {
        let mut layer = layer();
        let mut locations = vec![location(10.0, 10.0), location(20.0, 20.0)];
        let none = HashMap::default();
        layer.reconcile(&locations, &none);
        let moved_id = locations[0].id;
        let before = layer.feature(&moved_id).unwrap().clone();

        locations[0].x = 15.0;
        let gone = locations.remove(1);
        let report = layer.reconcile(&locations, &none);

        assert_eq!(report.moved, vec![moved_id]);
        assert_eq!(report.removed, vec![gone.id]);
        let after = layer.feature(&moved_id).unwrap();
        assert_eq!(after.feature_id, before.feature_id);
        assert_eq!(after.revision, before.revision + 1);
        assert_eq!(after.position, Point::new(15.0, 10.0));
    }

    #[test]
    fn test_overrides_win() {
        let mut layer = layer();
        let locations = vec![location(10.0, 10.0)];
        let mut overrides = HashMap::default();
        overrides.insert(locations[0].id, Point::new(99.0, 98.0));

        layer.reconcile(&locations, &overrides);
        assert_eq!(layer.position(&locations[0].id), Some(Point::new(99.0, 98.0)));
    }

    #[test]
    fn test_preview_is_hidden_not_removed() {
        let mut layer = layer();
        layer.set_preview(Some(Point::new(5.0, 6.0)));
        assert!(layer.preview().visible);
        let feature_id = layer.preview().feature_id;

        layer.set_preview(None);
        assert!(!layer.preview().visible);
        assert_eq!(layer.preview().feature_id, feature_id);
        assert_eq!(layer.preview().position, Point::new(5.0, 6.0));
    }

    #[test]
    fn test_variant_precedence() {
        let id = LocationId::new_v4();
        let kind = FeatureKind::Location(id);
        let mut state = InteractionState::new();
        assert_eq!(MarkerLayer::resolve_variant(kind, &state), MarkerVariant::Normal);

        state.hovered = Some(id);
        assert_eq!(MarkerLayer::resolve_variant(kind, &state), MarkerVariant::Hovered);
        state.selected = Some(id);
        assert_eq!(MarkerLayer::resolve_variant(kind, &state), MarkerVariant::Selected);
        state.dragging = Some(id);
        assert_eq!(MarkerLayer::resolve_variant(kind, &state), MarkerVariant::Dragging);

        assert_eq!(
            MarkerLayer::resolve_variant(FeatureKind::Preview, &state),
            MarkerVariant::Preview
        );
    }

    #[test]
    fn test_hit_test_uses_icon_box_and_tolerance() {
        let mut layer = layer();
        let view = identity_view();
        let state = InteractionState::new();
        let loc = location(100.0, 100.0);
        layer.reconcile(std::slice::from_ref(&loc), &HashMap::default());

        // middle of the pin body, above the anchor
        let hit = layer.hit_test(&state, &view, Point::new(100.0, 80.0), 4.0);
        assert_eq!(hit, Some(FeatureKind::Location(loc.id)));

        // just below the anchor, inside tolerance
        assert!(layer.hit_test(&state, &view, Point::new(100.0, 103.0), 4.0).is_some());
        assert!(layer.hit_test(&state, &view, Point::new(100.0, 110.0), 4.0).is_none());
        assert!(layer.hit_test(&state, &view, Point::new(130.0, 80.0), 4.0).is_none());
    }

    #[test]
    fn test_hit_test_picks_topmost() {
        let mut layer = layer();
        let view = identity_view();
        let mut state = InteractionState::new();
        let a = location(100.0, 100.0);
        let b = location(104.0, 100.0);
        layer.reconcile(&[a.clone(), b.clone()], &HashMap::default());

        // later feature draws on top
        let hit = layer.hit_test(&state, &view, Point::new(102.0, 90.0), 0.0);
        assert_eq!(hit, Some(FeatureKind::Location(b.id)));

        // selection lifts a marker above the rest
        state.selected = Some(a.id);
        let hit = layer.hit_test(&state, &view, Point::new(102.0, 90.0), 0.0);
        assert_eq!(hit, Some(FeatureKind::Location(a.id)));
    }

    #[test]
    fn test_hit_test_follows_moves() {
        let mut layer = layer();
        let view = identity_view();
        let state = InteractionState::new();
        let loc = location(100.0, 100.0);
        layer.reconcile(std::slice::from_ref(&loc), &HashMap::default());
        assert!(layer.hit_test(&state, &view, Point::new(100.0, 90.0), 0.0).is_some());

        layer.set_position(&loc.id, Point::new(400.0, 400.0));
        assert!(layer.hit_test(&state, &view, Point::new(100.0, 90.0), 0.0).is_none());
        assert!(layer.hit_test(&state, &view, Point::new(400.0, 390.0), 0.0).is_some());
    }

    #[test]
    fn test_layer_surface() {
        let mut layer = layer();
        let view = identity_view();
        let state = InteractionState::new();
        let a = location(100.0, 100.0);
        layer.reconcile(&[a.clone(), location(300.0, 50.0)], &HashMap::default());

        assert_eq!(layer.id(), "markers");
        assert_eq!(layer.kind(), LayerKind::Marker);
        assert!(layer.is_interactive());
        assert_eq!(layer.bounds(), Some(Bounds::from_coords(100.0, 50.0, 300.0, 100.0)));

        layer.set_visible(false);
        assert!(!layer.is_visible());
        assert!(layer.styled(&state, &view).is_empty());
        assert!(layer.hit_test(&state, &view, Point::new(100.0, 90.0), 4.0).is_none());
    }

    #[test]
    fn test_styled_orders_by_variant() {
        let mut layer = layer();
        let view = identity_view();
        let a = location(10.0, 10.0);
        let b = location(20.0, 20.0);
        layer.reconcile(&[a.clone(), b.clone()], &HashMap::default());
        layer.set_preview(Some(Point::new(30.0, 30.0)));

        let mut state = InteractionState::new();
        state.selected = Some(a.id);
        let draws = layer.styled(&state, &view);

        let kinds: Vec<FeatureKind> = draws.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                FeatureKind::Location(b.id),
                FeatureKind::Location(a.id),
                FeatureKind::Preview
            ]
        );
        assert_eq!(draws[1].variant, MarkerVariant::Selected);
        assert_eq!(draws[2].style.icon_url, "pin-preview.png");
        assert_eq!(draws[0].anchor, Point::new(20.0, 20.0));
    }
}
