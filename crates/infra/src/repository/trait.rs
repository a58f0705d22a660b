use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use codecamp_core::{Camp, Speaker, SpeakerId, Talk, TalkId};

use super::change_set::{ChangeSet, Commit};

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Store failure.
///
/// Callers treat every variant as terminal for the current request; nothing
/// here is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The backing store failed (connection, query, poisoned lock, ...).
    #[error("database error: {0}")]
    Database(String),

    /// A relational constraint rejected the commit (dangling camp or speaker key).
    #[error("constraint violated: {0}")]
    Constraint(String),

    /// A uniqueness constraint rejected the commit (duplicate moniker).
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Repository over camps, their talks and the speakers those talks reference.
///
/// ## Ordering
///
/// - camps: event date, newest first
/// - talks: title
/// - speakers: last name, then first name
///
/// Camps loaded with talks always carry each talk's speaker.
#[async_trait]
pub trait CampRepository: Send + Sync {
    async fn get_all_camps(&self, include_talks: bool) -> RepositoryResult<Vec<Camp>>;

    async fn get_camp(&self, moniker: &str, include_talks: bool) -> RepositoryResult<Option<Camp>>;

    /// Camps whose event falls on `date`.
    async fn get_camps_by_event_date(
        &self,
        date: NaiveDate,
        include_talks: bool,
    ) -> RepositoryResult<Vec<Camp>>;

    async fn get_talks_by_moniker(
        &self,
        moniker: &str,
        include_speakers: bool,
    ) -> RepositoryResult<Vec<Talk>>;

    /// A talk, but only if it belongs to the camp named by `moniker`.
    async fn get_talk_by_moniker(
        &self,
        moniker: &str,
        talk_id: TalkId,
        include_speaker: bool,
    ) -> RepositoryResult<Option<Talk>>;

    /// Distinct speakers giving talks at the camp.
    async fn get_speakers_by_moniker(&self, moniker: &str) -> RepositoryResult<Vec<Speaker>>;

    async fn get_speaker(&self, speaker_id: SpeakerId) -> RepositoryResult<Option<Speaker>>;

    async fn get_all_speakers(&self) -> RepositoryResult<Vec<Speaker>>;

    /// Commit staged changes in one transaction.
    ///
    /// Either every change applies or none does. The returned [`Commit`]
    /// reports how many rows were affected and hands back added records with
    /// their store-assigned keys.
    async fn save_changes(&self, changes: ChangeSet) -> RepositoryResult<Commit>;
}
