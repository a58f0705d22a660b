//! `codecamp-core`: persistence-shaped records for the conference domain.
//!
//! This crate contains **pure data** (no HTTP, no storage). The repository in
//! `codecamp-infra` stores these records, and the API maps them to wire models.

pub mod camp;
pub mod entity;
pub mod error;
pub mod id;
pub mod location;
pub mod speaker;
pub mod talk;
pub mod value_object;

pub use camp::{Camp, EARLIEST_EVENT_DATE};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{CampId, SpeakerId, TalkId};
pub use location::Location;
pub use speaker::Speaker;
pub use talk::Talk;
pub use value_object::ValueObject;
