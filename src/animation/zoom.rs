use crate::{animation::easing::EasingType, traits::Lerp};
use std::time::{Duration, Instant};

/// A zoom transition between two levels, sampled against wall-clock time.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomAnimation {
    pub from: f64,
    pub to: f64,
    pub start_time: Instant,
    pub duration: Duration,
    pub easing: EasingType,
}

impl ZoomAnimation {
    pub fn new(from: f64, to: f64, start_time: Instant, duration: Duration, easing: EasingType) -> Self {
        Self {
            from,
            to,
            start_time,
            duration,
            easing,
        }
    }

    /// Zoom level at `now`, plus whether the animation has finished.
    pub fn sample(&self, now: Instant) -> (f64, bool) {
        let elapsed = now.saturating_duration_since(self.start_time);
        if self.duration.is_zero() || elapsed >= self.duration {
            return (self.to, true);
        }
        let progress = self
            .easing
            .apply(elapsed.as_secs_f64() / self.duration.as_secs_f64());
        (self.from.lerp(&self.to, progress), false)
    }
}
