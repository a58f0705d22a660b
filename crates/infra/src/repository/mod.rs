//! Persistent storage for camps, talks and speakers.
//!
//! Handlers read through [`CampRepository`] and write by staging a
//! [`ChangeSet`] that [`CampRepository::save_changes`] commits atomically.
//! Staging is owned by the caller, so concurrent requests never share
//! pending changes.

pub mod change_set;
pub mod in_memory;
pub mod postgres;
pub mod schema;
pub mod r#trait;

pub use change_set::{Change, ChangeKind, ChangeSet, Commit, Record};
pub use in_memory::InMemoryCampRepository;
pub use postgres::PostgresCampRepository;
pub use r#trait::{CampRepository, RepositoryError, RepositoryResult};
