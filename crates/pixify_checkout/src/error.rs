// --- File: crates/pixify_checkout/src/error.rs ---
use pixify_common::{ApiError, HttpStatusCode};
use pixify_db::DbError;
use pixify_ledger::LedgerError;
use thiserror::Error;

/// Checkout-specific error types.
#[derive(Error, Debug)]
pub enum CheckoutError {
    /// The requested plan id is not in the plan table
    #[error("Unknown plan: {0}")]
    InvalidPlan(String),

    /// The gateway rejected or failed the order-create call. The pending
    /// transaction has already been deleted by the time this is returned.
    #[error("Payment gateway error: {0}")]
    PaymentGatewayError(String),

    /// The payment signature did not match; nothing was changed
    #[error("Payment verification failed")]
    VerificationFailed,

    /// No transaction for this account and order id
    #[error("Transaction not found")]
    TransactionNotFound,

    /// Ledger failure during the credit grant
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Store failure
    #[error("Database error: {0}")]
    Store(#[from] DbError),

    /// Internal processing error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convert CheckoutError to ApiError
impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::InvalidPlan(plan) => {
                ApiError::ValidationError(format!("Unknown plan: {plan}"))
            }
            CheckoutError::PaymentGatewayError(msg) => ApiError::ExternalServiceError {
                service_name: "payment gateway".to_string(),
                message: msg,
            },
            CheckoutError::VerificationFailed => {
                ApiError::ValidationError("Payment verification failed".to_string())
            }
            CheckoutError::TransactionNotFound => {
                ApiError::NotFoundError("Transaction not found".to_string())
            }
            CheckoutError::Ledger(e) => e.into(),
            CheckoutError::Store(e) => ApiError::DatabaseError(e.to_string()),
            CheckoutError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl HttpStatusCode for CheckoutError {
    fn status_code(&self) -> u16 {
        match self {
            CheckoutError::InvalidPlan(_) | CheckoutError::VerificationFailed => 400,
            CheckoutError::PaymentGatewayError(_) => 502,
            CheckoutError::TransactionNotFound => 404,
            CheckoutError::Ledger(e) => e.status_code(),
            CheckoutError::Store(_) | CheckoutError::Internal(_) => 500,
        }
    }
}
