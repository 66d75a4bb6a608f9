//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`; no error crosses the service boundary as a
//! panic or an untyped failure.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::EngineError;

/// Application-level error type for the order engine.
///
/// The taxonomy mirrors the operation contracts: validation is rejected
/// before persistence, ownership/role failures are `Forbidden`, missing
/// or foreign rows are `NotFound`, illegal state transitions are
/// `Conflict`, and unexpected persistence failures surface as a generic
/// server error.
#[derive(Debug, Error)]
pub enum AppError {
    /// No authenticated account.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but lacking role or ownership.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Referenced entity does not exist or does not belong to the caller.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid state transition attempt.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Malformed input, rejected before any persistence call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Engine operation failed.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Collapse the layered engine error into the flat taxonomy.
    fn flatten(self) -> Self {
        match self {
            Self::Engine(err) => match err {
                EngineError::NotFound(msg) => Self::NotFound(msg),
                EngineError::Forbidden(msg) => Self::Forbidden(msg),
                EngineError::Conflict(msg) => Self::Conflict(msg),
                EngineError::Validation(msg) => Self::Validation(msg),
                EngineError::Repository(err) => Self::Database(err),
            },
            other => other,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let err = self.flatten();

        // Capture server errors to Sentry
        if matches!(err, AppError::Database(_) | AppError::Internal(_)) {
            let event_id = sentry::capture_error(&err);
            tracing::error!(
                error = %err,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &err {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Database(_) | AppError::Internal(_) | AppError::Engine(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Don't expose internal error details to clients
        let message = match &err {
            AppError::Database(_) | AppError::Internal(_) | AppError::Engine(_) => {
                "Internal server error".to_owned()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from an account ID.
///
/// Called after token resolution to associate errors with accounts.
pub fn set_sentry_user(account_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(account_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}
