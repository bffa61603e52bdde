// --- File: crates/pixify_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type for all Pixify errors.
///
/// This enum provides a common set of error variants that can be used across all crates.
/// Each crate can extend this by implementing From<SpecificError> for ApiError.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Error occurred during an HTTP request
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error occurred during authentication or authorization
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Business rule rejected the request (e.g. not enough credits)
    #[error("Payment required: {0}")]
    PaymentRequiredError(String),

    /// Error occurred during database operation
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Error occurred during external service call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// Error occurred due to a conflict (e.g., resource already exists)
    #[error("Conflict: {0}")]
    ConflictError(String),

    /// Error occurred due to a resource not being found
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Error occurred due to a timeout
    #[error("Timeout: {0}")]
    TimeoutError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
///
/// This trait can be implemented by error types to provide a consistent way
/// to convert errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for ApiError {
    fn status_code(&self) -> u16 {
        match self {
            ApiError::HttpError(_) => 500,
            ApiError::ParseError(_) => 400,
            ApiError::ConfigError(_) => 500,
            ApiError::AuthError(_) => 401,
            ApiError::ValidationError(_) => 400,
            ApiError::PaymentRequiredError(_) => 402,
            ApiError::DatabaseError(_) => 500,
            ApiError::ExternalServiceError { .. } => 502,
            ApiError::ConflictError(_) => 409,
            ApiError::NotFoundError(_) => 404,
            ApiError::TimeoutError(_) => 504,
            ApiError::InternalError(_) => 500,
        }
    }
}

// Common error conversions
impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::TimeoutError(err.to_string())
        } else {
            ApiError::HttpError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> ApiError {
    ApiError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> ApiError {
    ApiError::ValidationError(message.to_string())
}

pub fn auth_error<T: fmt::Display>(message: T) -> ApiError {
    ApiError::AuthError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> ApiError {
    ApiError::NotFoundError(message.to_string())
}

pub fn conflict<T: fmt::Display>(message: T) -> ApiError {
    ApiError::ConflictError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> ApiError {
    ApiError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

pub fn internal_error<T: fmt::Display>(message: T) -> ApiError {
    ApiError::InternalError(message.to_string())
}
