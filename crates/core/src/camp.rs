use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::id::CampId;
use crate::location::Location;
use crate::talk::Talk;

/// Default event date for camps created without one (`0001-01-01`).
///
/// This is the earliest calendar date every supported store can hold.
pub const EARLIEST_EVENT_DATE: NaiveDate = match NaiveDate::from_ymd_opt(1, 1, 1) {
    Some(d) => d,
    None => panic!("0001-01-01 is a valid date"),
};

/// A conference event, addressed externally by its unique `moniker`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Camp {
    pub camp_id: CampId,
    pub name: String,
    pub moniker: String,
    pub location: Location,
    pub event_date: NaiveDate,
    /// Duration in days.
    pub length: i32,
    /// Only populated when the read asked for talks.
    pub talks: Vec<Talk>,
}

impl Camp {
    pub fn new(name: impl Into<String>, moniker: impl Into<String>) -> Self {
        Self {
            camp_id: CampId::UNASSIGNED,
            name: name.into(),
            moniker: moniker.into(),
            location: Location::default(),
            event_date: EARLIEST_EVENT_DATE,
            length: 1,
            talks: Vec::new(),
        }
    }
}

impl Default for Camp {
    fn default() -> Self {
        Self::new(String::new(), String::new())
    }
}

impl Entity for Camp {
    type Id = CampId;

    fn id(&self) -> &Self::Id {
        &self.camp_id
    }

    fn is_persisted(&self) -> bool {
        self.camp_id.is_assigned()
    }
}
