use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use codecamp_core::DomainError;
use codecamp_infra::RepositoryError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Failure of a single request, translated to a status code at the handler boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad input shape, a violated field constraint, or an unusable reference.
    #[error("{0}")]
    Validation(String),

    /// A path id that is not a number.
    #[error("{0}")]
    InvalidId(String),

    #[error("{0}")]
    NotFound(String),

    /// The store accepted the commit but no row changed.
    #[error("{0}")]
    Commit(String),

    #[error(transparent)]
    Store(#[from] RepositoryError),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn commit(msg: impl Into<String>) -> Self {
        Self::Commit(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidId(_) | ApiError::Commit(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => ApiError::Validation(msg),
            DomainError::InvalidId(msg) => ApiError::InvalidId(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Validation(msg) => json_error(status, "validation_error", msg),
            ApiError::InvalidId(msg) => json_error(status, "invalid_id", msg),
            ApiError::NotFound(msg) => json_error(status, "not_found", msg),
            ApiError::Commit(msg) => json_error(status, "commit_failed", msg),
            ApiError::Store(err) => {
                tracing::error!(error = %err, "store failure");
                json_error(status, "database_failure", "Database Failure")
            }
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
