//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] mise_core::EmailError),

    /// Wrong password, unknown email or inactive employee.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Bearer token is malformed, badly signed or for another issuer.
    #[error("invalid token")]
    InvalidToken,

    /// Bearer token has expired.
    #[error("token expired")]
    TokenExpired,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error: {0}")]
    PasswordHash(String),

    /// Token signing error.
    #[error("token encoding error: {0}")]
    TokenEncoding(String),
}
