use crate::{
    core::geo::Point,
    data::{Location, LocationPatch, MapId, NewLocation},
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("{0} is required")]
    EmptyField(&'static str),

    #[error("{field} must be a number, got {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

/// Location fields parsed out of a [`LocationForm`]
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedLocation {
    pub name: String,
    pub kind: String,
    pub description_md: String,
    pub position: Point,
}

/// Text-field model behind the create and edit panels
///
/// Fields stay raw strings while the user types; nothing is parsed until
/// [`validate`](Self::validate).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationForm {
    pub name: String,
    pub kind: String,
    pub description_md: String,
    pub x: String,
    pub y: String,
}

impl LocationForm {
    pub fn from_location(location: &Location) -> Self {
        Self {
            name: location.name.clone(),
            kind: location.kind.clone(),
            description_md: location.description_md.clone(),
            x: format_coordinate(location.x),
            y: format_coordinate(location.y),
        }
    }

    /// Blank form for a new location at `coordinate`
    pub fn for_coordinate(coordinate: Point) -> Self {
        let mut form = Self::default();
        form.set_coordinate(coordinate);
        form
    }

    pub fn set_coordinate(&mut self, coordinate: Point) {
        self.x = format_coordinate(coordinate.x);
        self.y = format_coordinate(coordinate.y);
    }

    /// Coordinate typed into the form, if both fields parse
    pub fn coordinate(&self) -> Option<Point> {
        Some(Point::new(parse_number("x", &self.x).ok()?, parse_number("y", &self.y).ok()?))
    }

    pub fn validate(&self) -> Result<ValidatedLocation, FormError> {
        let name = required("name", &self.name)?;
        let kind = required("type", &self.kind)?;
        let x = parse_number("x", &self.x)?;
        let y = parse_number("y", &self.y)?;
        Ok(ValidatedLocation {
            name,
            kind,
            description_md: self.description_md.clone(),
            position: Point::new(x, y),
        })
    }

    pub fn to_new_location(&self, map_id: MapId) -> Result<NewLocation, FormError> {
        let valid = self.validate()?;
        Ok(NewLocation {
            map_id,
            kind: valid.kind,
            name: valid.name,
            description_md: valid.description_md,
            x: valid.position.x,
            y: valid.position.y,
        })
    }

    /// Full patch of every editable field
    pub fn to_patch(&self) -> Result<LocationPatch, FormError> {
        let valid = self.validate()?;
        Ok(LocationPatch {
            kind: Some(valid.kind),
            name: Some(valid.name),
            description_md: Some(valid.description_md),
            x: Some(valid.position.x),
            y: Some(valid.position.y),
            metadata: None,
        })
    }
}

fn required(field: &'static str, value: &str) -> Result<String, FormError> {
    let value = value.trim();
    if value.is_empty() {
        Err(FormError::EmptyField(field))
    } else {
        Ok(value.to_string())
    }
}

fn parse_number(field: &'static str, value: &str) -> Result<f64, FormError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FormError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

/// Whole pixels print without a fraction, the rest with two decimals
fn format_coordinate(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value)
    } else {
        format!("{:.2}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::LocationId;

    fn filled() -> LocationForm {
        LocationForm {
            name: " Ironrath ".into(),
            kind: "castle".into(),
            description_md: "# Keep".into(),
            x: "120".into(),
            y: "88.5".into(),
        }
    }

    #[test]
    fn test_validate_trims_and_parses() {
        let valid = filled().validate().unwrap();
        assert_eq!(valid.name, "Ironrath");
        assert_eq!(valid.position, Point::new(120.0, 88.5));
    }

    #[test]
    fn test_rejects_non_numeric_coordinates() {
        let mut form = filled();
        form.x = "12a".into();
        assert_eq!(
            form.validate(),
            Err(FormError::InvalidNumber {
                field: "x",
                value: "12a".into()
            })
        );
        form.x = "NaN".into();
        assert!(form.validate().is_err());
        assert_eq!(form.coordinate(), None);
    }

    #[test]
    fn test_requires_name_and_type() {
        let mut form = filled();
        form.name = "   ".into();
        assert_eq!(form.validate(), Err(FormError::EmptyField("name")));
        form.name = "A".into();
        form.kind.clear();
        assert_eq!(form.validate(), Err(FormError::EmptyField("type")));
    }

    #[test]
    fn test_round_trip_through_location() {
        let map_id = MapId::new_v4();
        let new = filled().to_new_location(map_id).unwrap();
        let location = new.into_location(LocationId::new_v4());

        let form = LocationForm::from_location(&location);
        assert_eq!(form.x, "120");
        assert_eq!(form.y, "88.50");
        let patch = form.to_patch().unwrap();
        assert_eq!(patch.x, Some(120.0));
        assert_eq!(patch.name.as_deref(), Some("Ironrath"));
    }

    #[test]
    fn test_for_coordinate() {
        let form = LocationForm::for_coordinate(Point::new(7.0, 9.25));
        assert_eq!((form.x.as_str(), form.y.as_str()), ("7", "9.25"));
        assert!(form.name.is_empty());
    }
}
