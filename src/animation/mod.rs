pub mod easing;
pub mod zoom;

pub use easing::{ease_out_cubic, EasingType};
pub use zoom::ZoomAnimation;
