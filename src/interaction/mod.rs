pub mod controller;
pub mod state;

pub use controller::{Hit, InteractionController, Rollback, Transition};
pub use state::{InteractionState, Mode};
