//! Unified error handling for the API.
//!
//! Every failure leaves the server as the standard response envelope
//! (`{statusCode, message, data: null}`), see [`crate::response`].

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::response::ApiResponse;

pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized: Access token is missing or invalid.";
pub const FORBIDDEN_MESSAGE: &str =
    "Forbidden: You do not have permission to access this resource.";
pub const INTERNAL_MESSAGE: &str = "An unexpected error occurred.";

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed unexpectedly.
    #[error("Database error: {0}")]
    Database(#[source] RepositoryError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness violation or delete blocked by a reference.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Malformed input, invalid range, or a rejected self-service change.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid bearer token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Valid token, insufficient role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }

    /// Message shown to the client. Internal details are never exposed.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) => INTERNAL_MESSAGE.to_string(),
            Self::Unauthorized(_) => UNAUTHORIZED_MESSAGE.to_string(),
            Self::Forbidden(_) => FORBIDDEN_MESSAGE.to_string(),
            Self::NotFound(msg) | Self::Conflict(msg) | Self::BadRequest(msg) => msg.clone(),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            RepositoryError::NotFound => Self::NotFound("Resource not found".to_string()),
            other => Self::Database(other),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request failed"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        ApiResponse::<()>::failure(self.status_code(), self.client_message()).into_response()
    }
}
