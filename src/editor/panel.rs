use crate::{data::Location, editor::form::LocationForm};

/// What the side panel shows
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Panel<'a> {
    Empty,
    /// Read-only details of the selected location
    Details(&'a Location),
    EditLocation {
        location: &'a Location,
        form: &'a LocationForm,
    },
    NewLocation(&'a LocationForm),
}

impl Panel<'_> {
    pub fn title(&self) -> &str {
        match self {
            Panel::Empty => "",
            Panel::Details(location) => &location.name,
            Panel::EditLocation { .. } => "Edit location",
            Panel::NewLocation(_) => "New location",
        }
    }

    pub fn form(&self) -> Option<&LocationForm> {
        match self {
            Panel::EditLocation { form, .. } | Panel::NewLocation(form) => Some(form),
            _ => None,
        }
    }
}
