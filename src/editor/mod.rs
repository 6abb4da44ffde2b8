//! The viewer/editor shell and the pieces around it: side-panel model,
//! location form and request bookkeeping.

pub mod form;
pub mod panel;
pub mod requests;
pub mod shell;

pub use form::{FormError, LocationForm, ValidatedLocation};
pub use panel::Panel;
pub use requests::{RequestKey, RequestOutcome, RequestToken, RequestTracker};
pub use shell::MapEditor;
