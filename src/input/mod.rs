pub mod events;
pub mod handler;

// Re-export the essential types
pub use events::{InputEvent, MouseButton, ViewerEvent};
pub use handler::{EventCallback, EventQueue};
