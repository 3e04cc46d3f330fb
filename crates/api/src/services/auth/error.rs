//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::error::AppError;

/// Message returned for any failed sign-in.
pub const WRONG_CREDENTIALS: &str = "Wrong email or password.";

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email/password did not match any account or the configured admin.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Bearer token could not be created.
    #[error("token creation failed: {0}")]
    TokenCreation(String),

    /// Bearer token is malformed, expired, or signed by someone else.
    #[error("token rejected: {0}")]
    InvalidToken(String),

    /// Password hashing failed.
    #[error("password hashing failed")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::BadRequest(WRONG_CREDENTIALS.to_string()),
            AuthError::InvalidToken(reason) => Self::Unauthorized(reason),
            AuthError::TokenCreation(reason) => Self::Internal(reason),
            AuthError::PasswordHash => Self::Internal("password hashing failed".to_string()),
            AuthError::Repository(e) => e.into(),
        }
    }
}
