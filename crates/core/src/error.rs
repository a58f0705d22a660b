//! Input errors raised before anything touches a store.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Rejected client input.
///
/// Storage failures are reported by the repository layer instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// One or more field constraints on a wire model were broken.
    #[error("{0}")]
    Validation(String),

    /// A key in a path or body could not be read as a number.
    #[error("invalid id: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
