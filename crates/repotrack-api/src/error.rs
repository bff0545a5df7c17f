//! API error handling.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use repotrack_core::hosting::EnumerationError;
use repotrack_db::DbError;
use repotrack_lifecycle::LifecycleError;
use serde_json::json;
use tracing::error;

/// API error type.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    UnprocessableEntity(String),
    /// Carries the cause for the log; the client only sees a generic message.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::Internal(cause) => {
                error!(error = %cause, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<repotrack_core::Error> for ApiError {
    fn from(err: repotrack_core::Error) -> Self {
        match err {
            repotrack_core::Error::Validation(msg) => {
                ApiError::UnprocessableEntity(format!("error when creating repository: {}", msg))
            }
            repotrack_core::Error::IncorrectFullName(_) => {
                ApiError::BadRequest("incorrect full name".to_string())
            }
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(msg) => ApiError::NotFound(msg),
            DbError::InvalidInput(e) => e.into(),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<LifecycleError> for ApiError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::Invalid(e) => e.into(),
            LifecycleError::Store(e) => e.into(),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<EnumerationError> for ApiError {
    fn from(err: EnumerationError) -> Self {
        match err {
            EnumerationError::UnknownUser(user) => {
                ApiError::NotFound(format!("no such user: {}", user))
            }
            _ => ApiError::Internal(err.to_string()),
        }
    }
}
