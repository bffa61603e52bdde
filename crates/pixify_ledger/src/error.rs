// --- File: crates/pixify_ledger/src/error.rs ---
use pixify_common::{ApiError, HttpStatusCode};
use pixify_db::DbError;
use thiserror::Error;

/// Ledger-specific error types.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The account had no credit left; nothing was changed.
    #[error("Insufficient credit balance for account {0}")]
    InsufficientBalance(String),

    /// The account does not exist.
    #[error("Unknown account: {0}")]
    UnknownAccount(String),

    /// Underlying store failure
    #[error("Ledger store error: {0}")]
    StoreError(#[from] DbError),
}

/// Convert LedgerError to ApiError
impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientBalance(account_id) => ApiError::PaymentRequiredError(
                format!("Insufficient credit balance for account {}", account_id),
            ),
            LedgerError::UnknownAccount(account_id) => {
                ApiError::NotFoundError(format!("Unknown account: {}", account_id))
            }
            LedgerError::StoreError(e) => ApiError::DatabaseError(e.to_string()),
        }
    }
}

impl HttpStatusCode for LedgerError {
    fn status_code(&self) -> u16 {
        match self {
            LedgerError::InsufficientBalance(_) => 402,
            LedgerError::UnknownAccount(_) => 404,
            LedgerError::StoreError(_) => 500,
        }
    }
}
