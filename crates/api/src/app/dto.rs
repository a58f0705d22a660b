//! Wire-facing view models and their validation rules.
//!
//! Output uses camelCase field names. Input also accepts the PascalCase
//! spelling of every field (`Name`, `Moniker`, ...).

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use codecamp_core::{DomainError, DomainResult, SpeakerId, TalkId, EARLIEST_EVENT_DATE};

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_TITLE_LEN: usize = 100;
pub const ABSTRACT_LEN: core::ops::RangeInclusive<usize> = 20..=4000;
pub const CAMP_LENGTH_DAYS: core::ops::RangeInclusive<i32> = 1..=100;
pub const TALK_LEVEL: core::ops::RangeInclusive<i32> = 100..=300;

/// Constraint check run on request bodies before any handler logic.
pub trait Validate {
    fn validate(&self) -> DomainResult<()>;
}

// -------------------------
// View models
// -------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampModel {
    #[serde(default, alias = "Name")]
    pub name: String,
    #[serde(default, alias = "Moniker")]
    pub moniker: String,
    #[serde(default, alias = "Location")]
    pub location: Option<LocationModel>,
    #[serde(
        default = "default_event_date",
        alias = "EventDate",
        deserialize_with = "deserialize_event_date"
    )]
    pub event_date: NaiveDate,
    #[serde(default = "default_length", alias = "Length")]
    pub length: i32,
    #[serde(default, alias = "Talks", deserialize_with = "null_as_default")]
    pub talks: Vec<TalkModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationModel {
    #[serde(default, alias = "VenueName")]
    pub venue_name: Option<String>,
    #[serde(default, alias = "Address1")]
    pub address1: Option<String>,
    #[serde(default, alias = "Address2")]
    pub address2: Option<String>,
    #[serde(default, alias = "Address3")]
    pub address3: Option<String>,
    #[serde(default, alias = "CityTown")]
    pub city_town: Option<String>,
    #[serde(default, alias = "StateProvince")]
    pub state_province: Option<String>,
    #[serde(default, alias = "PostalCode")]
    pub postal_code: Option<String>,
    #[serde(default, alias = "Country")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TalkModel {
    #[serde(default, alias = "TalkId")]
    pub talk_id: TalkId,
    #[serde(default, alias = "Title")]
    pub title: String,
    #[serde(default, alias = "Abstract")]
    pub r#abstract: String,
    #[serde(default, alias = "Level")]
    pub level: i32,
    #[serde(default, alias = "Speaker")]
    pub speaker: Option<SpeakerModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakerModel {
    #[serde(default, alias = "SpeakerId")]
    pub speaker_id: SpeakerId,
    #[serde(default, alias = "FirstName", deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(default, alias = "LastName", deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(default, alias = "MiddleName")]
    pub middle_name: Option<String>,
    #[serde(default, alias = "Company")]
    pub company: Option<String>,
    #[serde(default, alias = "CompanyUrl")]
    pub company_url: Option<String>,
    #[serde(default, alias = "BlogUrl")]
    pub blog_url: Option<String>,
    #[serde(default, alias = "Twitter")]
    pub twitter: Option<String>,
    #[serde(default, rename = "gitHub", alias = "GitHub")]
    pub github: Option<String>,
}

// -------------------------
// Validation
// -------------------------

impl Validate for CampModel {
    fn validate(&self) -> DomainResult<()> {
        let mut violations = Vec::new();
        require_text(&mut violations, "Name", &self.name, MAX_NAME_LEN);
        if self.moniker.trim().is_empty() {
            violations.push("The Moniker field is required.".to_string());
        }
        if !CAMP_LENGTH_DAYS.contains(&self.length) {
            violations.push(format!(
                "The field Length must be between {} and {}.",
                CAMP_LENGTH_DAYS.start(),
                CAMP_LENGTH_DAYS.end()
            ));
        }
        finish(violations)
    }
}

impl Validate for TalkModel {
    fn validate(&self) -> DomainResult<()> {
        let mut violations = Vec::new();
        require_text(&mut violations, "Title", &self.title, MAX_TITLE_LEN);

        let abstract_len = self.r#abstract.chars().count();
        if self.r#abstract.trim().is_empty() {
            violations.push("The Abstract field is required.".to_string());
        } else if !ABSTRACT_LEN.contains(&abstract_len) {
            violations.push(format!(
                "The field Abstract must be between {} and {} characters.",
                ABSTRACT_LEN.start(),
                ABSTRACT_LEN.end()
            ));
        }

        if !TALK_LEVEL.contains(&self.level) {
            violations.push(format!(
                "The field Level must be between {} and {}.",
                TALK_LEVEL.start(),
                TALK_LEVEL.end()
            ));
        }
        finish(violations)
    }
}

fn require_text(violations: &mut Vec<String>, field: &str, value: &str, max: usize) {
    if value.trim().is_empty() {
        violations.push(format!("The {field} field is required."));
    } else if value.chars().count() > max {
        violations.push(format!(
            "The field {field} must be a string with a maximum length of {max}."
        ));
    }
}

fn finish(violations: Vec<String>) -> DomainResult<()> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(DomainError::validation(violations.join(" ")))
    }
}

// -------------------------
// Serde helpers
// -------------------------

fn default_event_date() -> NaiveDate {
    EARLIEST_EVENT_DATE
}

fn default_length() -> i32 {
    1
}

/// Parse a calendar date from `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS[.f]` or RFC 3339.
///
/// Timestamps keep only their date part.
pub fn parse_event_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}

fn deserialize_event_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        None => Ok(default_event_date()),
        Some(s) => parse_event_date(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid event date '{s}'"))),
    }
}

/// Read a query-string flag: `true`/`false` in any case, `1`/`0`, or empty for false.
pub fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" | "" => Some(false),
        _ => None,
    }
}

pub fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_flag(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("'{raw}' is not a valid boolean")))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
