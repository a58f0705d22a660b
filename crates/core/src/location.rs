use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// Where a camp takes place. Embedded in the camp row, it has no key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub venue_name: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub address3: Option<String>,
    pub city_town: Option<String>,
    pub state_province: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

impl ValueObject for Location {
    fn is_blank(&self) -> bool {
        [
            &self.venue_name,
            &self.address1,
            &self.address2,
            &self.address3,
            &self.city_town,
            &self.state_province,
            &self.postal_code,
            &self.country,
        ]
        .iter()
        .all(|f| f.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_location_is_blank() {
        assert!(Location::default().is_blank());
    }

    #[test]
    fn any_field_makes_location_non_blank() {
        let loc = Location {
            postal_code: Some("12345".to_string()),
            ..Location::default()
        };
        assert!(!loc.is_blank());
    }
}
