// --- File: crates/pixify_generation/src/error.rs ---
use pixify_common::{ApiError, HttpStatusCode};
use pixify_ledger::LedgerError;
use thiserror::Error;

/// How the upstream generation API failed, mapped from its HTTP outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamFailure {
    /// Upstream rejected the prompt (HTTP 400)
    InvalidPrompt,
    /// Upstream auth or availability problem (HTTP 401/403)
    ServiceUnavailable,
    /// Deadline exceeded
    Timeout,
    /// Anything else: 5xx, oversized body, network error
    GenerationFailed,
}

/// Generation-specific error types.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The prompt was rejected before any ledger mutation.
    #[error("Invalid prompt: {0}")]
    InvalidInput(String),

    /// The account has no credit left; no upstream call was made.
    #[error("Insufficient credit balance")]
    InsufficientCredit,

    /// The upstream call failed after the debit. `credit_refunded` records
    /// whether the compensating refund went through, and `credit_balance`
    /// is the balance after the refund when it did.
    #[error("Image generation failed upstream")]
    Upstream {
        kind: UpstreamFailure,
        credit_refunded: bool,
        credit_balance: Option<i64>,
    },

    /// Ledger failure outside the insufficient-balance case
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Internal processing error
    #[error("Internal processing error: {0}")]
    InternalError(String),
}

impl GenerationError {
    /// User-facing message, stating whether a credit was consumed.
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::InvalidInput(msg) => msg.clone(),
            GenerationError::InsufficientCredit => "Insufficient credit balance".to_string(),
            GenerationError::Upstream {
                kind,
                credit_refunded,
                ..
            } => {
                let base = match kind {
                    UpstreamFailure::InvalidPrompt => {
                        "Invalid prompt. Please try a different description."
                    }
                    UpstreamFailure::ServiceUnavailable => "Service temporarily unavailable.",
                    UpstreamFailure::Timeout => "Request timeout. Please try again.",
                    UpstreamFailure::GenerationFailed => "Image generation failed.",
                };
                if *credit_refunded {
                    format!("{} Credit refunded.", base)
                } else {
                    format!("{} Credit refund pending.", base)
                }
            }
            GenerationError::Ledger(e) => e.to_string(),
            GenerationError::InternalError(_) => "Internal server error".to_string(),
        }
    }
}

/// Convert GenerationError to ApiError
impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::InvalidInput(msg) => ApiError::ValidationError(msg),
            GenerationError::InsufficientCredit => {
                ApiError::PaymentRequiredError("Insufficient credit balance".to_string())
            }
            GenerationError::Upstream { kind, .. } => match kind {
                UpstreamFailure::Timeout => {
                    ApiError::TimeoutError("Image generation timed out".to_string())
                }
                _ => ApiError::ExternalServiceError {
                    service_name: "generation API".to_string(),
                    message: "image generation failed".to_string(),
                },
            },
            GenerationError::Ledger(e) => e.into(),
            GenerationError::InternalError(msg) => ApiError::InternalError(msg),
        }
    }
}

impl HttpStatusCode for GenerationError {
    fn status_code(&self) -> u16 {
        match self {
            GenerationError::InvalidInput(_) => 400,
            GenerationError::InsufficientCredit => 402,
            GenerationError::Upstream { kind, .. } => match kind {
                UpstreamFailure::InvalidPrompt => 400,
                UpstreamFailure::ServiceUnavailable => 503,
                UpstreamFailure::Timeout => 504,
                UpstreamFailure::GenerationFailed => 502,
            },
            GenerationError::Ledger(e) => e.status_code(),
            GenerationError::InternalError(_) => 500,
        }
    }
}
