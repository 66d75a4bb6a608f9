//! Service-level error type.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors produced by engine operations.
///
/// Messages are caller-facing; `Repository` failures are collapsed to a
/// generic server error at the HTTP boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Referenced entity does not exist or does not belong to the caller.
    #[error("{0}")]
    NotFound(String),

    /// Caller lacks the role or ownership for the operation.
    #[error("{0}")]
    Forbidden(String),

    /// Operation is invalid in the aggregate's current state.
    #[error("{0}")]
    Conflict(String),

    /// Malformed input, rejected before any persistence call.
    #[error("{0}")]
    Validation(String),

    /// Underlying repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
