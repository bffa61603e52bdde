// --- File: crates/pixify_users/src/error.rs ---
use pixify_common::{ApiError, HttpStatusCode};
use pixify_db::DbError;
use thiserror::Error;

/// Account and auth error types.
#[derive(Error, Debug)]
pub enum UsersError {
    /// Request payload failed validation
    #[error("{0}")]
    Validation(String),

    /// An account with this email already exists
    #[error("An account with this email already exists")]
    DuplicateEmail,

    /// Wrong email or password; deliberately does not say which
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Missing, malformed or expired bearer token
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The token's account no longer exists
    #[error("Account not found")]
    AccountNotFound,

    /// Store failure
    #[error("Database error: {0}")]
    Store(#[from] DbError),

    /// Internal processing error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convert UsersError to ApiError
impl From<UsersError> for ApiError {
    fn from(err: UsersError) -> Self {
        match err {
            UsersError::Validation(msg) => ApiError::ValidationError(msg),
            UsersError::DuplicateEmail => {
                ApiError::ConflictError("An account with this email already exists".to_string())
            }
            UsersError::InvalidCredentials => {
                ApiError::AuthError("Invalid email or password".to_string())
            }
            UsersError::InvalidToken => ApiError::AuthError("Invalid or expired token".to_string()),
            UsersError::AccountNotFound => ApiError::NotFoundError("Account not found".to_string()),
            UsersError::Store(e) => ApiError::DatabaseError(e.to_string()),
            UsersError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl HttpStatusCode for UsersError {
    fn status_code(&self) -> u16 {
        match self {
            UsersError::Validation(_) => 400,
            UsersError::DuplicateEmail => 409,
            UsersError::InvalidCredentials | UsersError::InvalidToken => 401,
            UsersError::AccountNotFound => 404,
            UsersError::Store(_) | UsersError::Internal(_) => 500,
        }
    }
}
