use crate::{
    animation::{easing::EasingType, zoom::ZoomAnimation},
    constants::ZOOM_SNAP,
    core::{bounds::Bounds, geo::Point, projection::PixelProjection},
};
use std::time::{Duration, Instant};

/// Manages the current view of the map: center, zoom, and canvas size
///
/// The center is kept inside the map extent (with `padding` screen pixels of
/// slack) so panning stops at the image edges instead of drifting into the
/// void. Screen and map space share orientation (`y` down), so the transform
/// between them is a uniform scale plus translation.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    /// The center of the view in map pixel coordinates
    center: Point,
    /// The current (possibly fractional) zoom level
    zoom: f64,
    /// The size of the canvas in screen pixels
    size: Point,
    max_zoom: f64,
    extent: Bounds,
    /// Screen pixels of tolerance past the extent edges
    padding: f64,
    animation: Option<ZoomAnimation>,
}

impl View {
    /// Creates a view fitted to the whole map extent.
    pub fn new(projection: &PixelProjection, size: Point, padding: f64) -> Self {
        let mut view = Self {
            center: projection.extent().center(),
            zoom: 0.0,
            size,
            max_zoom: f64::from(projection.max_zoom()),
            extent: projection.extent(),
            padding,
            animation: None,
        };
        view.fit_extent();
        view
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn size(&self) -> Point {
        self.size
    }

    pub fn max_zoom(&self) -> f64 {
        self.max_zoom
    }

    /// Map pixels per screen pixel at the current zoom.
    pub fn resolution(&self) -> f64 {
        2_f64.powf(self.max_zoom - self.zoom)
    }

    /// Integer zoom level whose tiles should be drawn.
    pub fn tile_zoom(&self) -> i32 {
        (self.zoom.round() as i32).clamp(0, self.max_zoom as i32)
    }

    /// Converts a map coordinate to screen pixel coordinates (canvas relative)
    pub fn map_to_screen(&self, point: &Point) -> Point {
        let res = self.resolution();
        Point::new(
            (point.x - self.center.x) / res + self.size.x / 2.0,
            (point.y - self.center.y) / res + self.size.y / 2.0,
        )
    }

    /// Converts screen pixel coordinates back to map coordinates
    pub fn screen_to_map(&self, pixel: &Point) -> Point {
        let res = self.resolution();
        Point::new(
            (pixel.x - self.size.x / 2.0) * res + self.center.x,
            (pixel.y - self.size.y / 2.0) * res + self.center.y,
        )
    }

    /// Map-space box currently covered by the canvas
    pub fn visible_extent(&self) -> Bounds {
        let res = self.resolution();
        Bounds::from_center_and_size(self.center, self.size.x * res, self.size.y * res)
    }

    pub fn set_size(&mut self, size: Point) {
        self.size = size;
        self.constrain_center();
    }

    pub fn set_center(&mut self, center: Point) {
        self.center = center;
        self.constrain_center();
    }

    /// Sets the zoom level, clamping to `[0, max_zoom]`
    pub fn set_zoom(&mut self, zoom: f64) {
        self.animation = None;
        self.zoom = zoom.clamp(0.0, self.max_zoom);
        self.constrain_center();
    }

    /// Pans by a screen-pixel delta (dragging the canvas by `delta` moves the
    /// content with the pointer)
    pub fn pan_by(&mut self, delta: Point) {
        let res = self.resolution();
        self.center = self.center.subtract(&delta.multiply(res));
        self.constrain_center();
    }

    /// Zooms keeping the map point under `focus` (screen pixels) stationary
    pub fn zoom_at(&mut self, zoom: f64, focus: Point) {
        let new_zoom = zoom.clamp(0.0, self.max_zoom);
        if (new_zoom - self.zoom).abs() < 1e-9 {
            return;
        }
        let anchor = self.screen_to_map(&focus);
        self.animation = None;
        self.zoom = new_zoom;

        // Re-derive the center so `anchor` lands back under `focus`
        let res = self.resolution();
        self.center = Point::new(
            anchor.x - (focus.x - self.size.x / 2.0) * res,
            anchor.y - (focus.y - self.size.y / 2.0) * res,
        );
        self.constrain_center();
    }

    /// Fits the whole extent into the canvas, keeping `padding` pixels free
    pub fn fit_extent(&mut self) {
        let avail_w = (self.size.x - 2.0 * self.padding).max(1.0);
        let avail_h = (self.size.y - 2.0 * self.padding).max(1.0);
        let res = (self.extent.width() / avail_w).max(self.extent.height() / avail_h);

        self.animation = None;
        self.zoom = (self.max_zoom - res.log2()).clamp(0.0, self.max_zoom);
        self.center = self.extent.center();
        self.constrain_center();
    }

    /// Zoom the animation is heading to, or the current zoom when idle.
    pub fn target_zoom(&self) -> f64 {
        self.animation.as_ref().map_or(self.zoom, |a| a.to)
    }

    /// Nearest integer-or-half step, clamped to the zoom range.
    pub fn snap_zoom(&self, zoom: f64) -> f64 {
        ((zoom / ZOOM_SNAP).round() * ZOOM_SNAP).clamp(0.0, self.max_zoom)
    }

    /// Starts an animated zoom around the view center
    pub fn animate_zoom_to(&mut self, target: f64, now: Instant, duration: Duration, easing: EasingType) {
        let target = target.clamp(0.0, self.max_zoom);
        if (target - self.zoom).abs() < 1e-9 {
            self.animation = None;
            return;
        }
        log::debug!("animating zoom {:.2} -> {:.2}", self.zoom, target);
        self.animation = Some(ZoomAnimation::new(self.zoom, target, now, duration, easing));
    }

    /// Zoom control step: animates to the snapped level `delta` away from
    /// the current target
    pub fn zoom_by(&mut self, delta: f64, now: Instant, duration: Duration, easing: EasingType) {
        let target = self.snap_zoom(self.target_zoom() + delta);
        self.animate_zoom_to(target, now, duration, easing);
    }

    /// Advances a running animation. Returns true while still animating.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(animation) = self.animation.as_ref() else {
            return false;
        };

        let (zoom, finished) = animation.sample(now);
        self.zoom = zoom.clamp(0.0, self.max_zoom);
        if finished {
            self.animation = None;
            self.constrain_center();
        }
        !finished
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    fn constrain_center(&mut self) {
        let res = self.resolution();
        let tolerance = self.padding * res;
        self.center = Point::new(
            constrain_axis(
                self.center.x,
                self.extent.min.x,
                self.extent.max.x,
                self.size.x / 2.0 * res,
                tolerance,
            ),
            constrain_axis(
                self.center.y,
                self.extent.min.y,
                self.extent.max.y,
                self.size.y / 2.0 * res,
                tolerance,
            ),
        );
    }
}

/// Keeps the visible span `[value - half, value + half]` inside
/// `[min - tolerance, max + tolerance]`; when the span is wider than the
/// extent the axis is centered instead.
fn constrain_axis(value: f64, min: f64, max: f64, half: f64, tolerance: f64) -> f64 {
    let low = min + half - tolerance;
    let high = max - half + tolerance;
    if low > high {
        (min + max) / 2.0
    } else {
        value.clamp(low, high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view_2048() -> View {
        let projection = PixelProjection::new(2048, 2048, 4).unwrap();
        View::new(&projection, Point::new(800.0, 600.0), 20.0)
    }

    #[test]
    fn test_fit_extent() {
        let view = view_2048();
        assert_eq!(view.center(), Point::new(1024.0, 1024.0));
        // limiting axis is the 600px height: 2048 / 560 map px per screen px
        assert!((view.resolution() - 2048.0 / 560.0).abs() < 1e-9);
        let extent = view.visible_extent();
        assert!(extent.min.y < 0.0 && extent.max.y > 2048.0);
    }

    #[test]
    fn test_coordinate_round_trip() {
        let mut view = view_2048();
        view.set_zoom(3.0);
        view.set_center(Point::new(700.0, 900.0));

        let map_point = Point::new(650.0, 880.0);
        let screen = view.map_to_screen(&map_point);
        let back = view.screen_to_map(&screen);
        assert!(back.approx_eq(&map_point));

        assert_eq!(
            view.map_to_screen(&view.center()),
            Point::new(400.0, 300.0)
        );
    }

    #[test]
    fn test_pan_stops_at_extent() {
        let mut view = view_2048();
        view.set_zoom(4.0);
        view.pan_by(Point::new(1.0e6, 1.0e6));

        // at 1:1 the left/top edges may show at most `padding` pixels of void
        let extent = view.visible_extent();
        assert!((extent.min.x - -20.0).abs() < 1e-9);
        assert!((extent.min.y - -20.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_limits() {
        let mut view = view_2048();
        view.set_zoom(-2.0);
        assert_eq!(view.zoom(), 0.0);
        view.set_zoom(9.0);
        assert_eq!(view.zoom(), 4.0);
    }

    #[test]
    fn test_zoom_at_keeps_focus() {
        let mut view = view_2048();
        view.set_zoom(3.0);
        let focus = Point::new(420.0, 310.0);
        let before = view.screen_to_map(&focus);
        view.zoom_at(3.5, focus);
        let after = view.screen_to_map(&focus);
        assert!(before.approx_eq(&after));
    }

    #[test]
    fn test_zoom_by_snaps_to_half_steps() {
        let mut view = view_2048();
        let start = Instant::now();
        let duration = Duration::from_millis(250);

        // fitted zoom is ~2.13, one step in snaps to 3.0
        view.zoom_by(1.0, start, duration, EasingType::EaseOut);
        assert_eq!(view.target_zoom(), 3.0);
        assert!(view.tick(start + Duration::from_millis(100)));
        assert!(!view.tick(start + duration));
        assert_eq!(view.zoom(), 3.0);

        view.zoom_by(5.0, start, duration, EasingType::EaseOut);
        assert_eq!(view.target_zoom(), 4.0);

        view.set_zoom(1.3);
        view.zoom_by(-1.0, start, duration, EasingType::Linear);
        assert_eq!(view.target_zoom(), 0.5);
    }
}
