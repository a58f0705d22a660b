//! Infrastructure layer: the repository contract and its stores.

pub mod repository;
pub mod seed;

pub use repository::{
    CampRepository, Change, ChangeKind, ChangeSet, Commit, InMemoryCampRepository,
    PostgresCampRepository, Record, RepositoryError, RepositoryResult,
};
