// --- File: crates/pixify_generation/src/client.rs ---
//! HTTP client for the external text-to-image API.
//!
//! The upstream contract: POST the prompt with an API-key header, get the
//! rendered image bytes back on 200. The client enforces the request
//! deadline and the response-size cap; interpreting failures is left to the
//! orchestrator.

use pixify_common::{config_error, ApiError, BoxFuture};
use pixify_config::GenerationConfig;
use serde::Serialize;
use std::env;
use thiserror::Error;
use tracing::debug;

/// Errors from a single upstream generation call.
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// Deadline exceeded
    #[error("generation request timed out")]
    Timeout,

    /// Upstream answered with a non-success status
    #[error("generation API returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body exceeded the configured size cap
    #[error("generation response exceeded {limit} bytes")]
    TooLarge { limit: u64 },

    /// Connection-level failure
    #[error("generation request failed: {0}")]
    Network(String),
}

impl From<reqwest::Error> for GeneratorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GeneratorError::Timeout
        } else {
            GeneratorError::Network(err.to_string())
        }
    }
}

/// A rendered image returned by the upstream API.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// The upstream text-to-image service, behind a trait so the orchestrator
/// can be exercised without network access.
pub trait ImageGenerator: Send + Sync {
    /// Render one image for the prompt. `idempotency_key` lets the upstream
    /// dedupe transport-level retries of the same request.
    fn generate(
        &self,
        prompt: &str,
        idempotency_key: &str,
    ) -> BoxFuture<'_, GeneratedImage, GeneratorError>;
}

#[derive(Serialize)]
struct GenerateRequestBody<'a> {
    prompt: &'a str,
}

/// reqwest-backed implementation against the configured upstream.
pub struct HttpImageGenerator {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    max_response_bytes: u64,
}

impl HttpImageGenerator {
    /// Build a client from config. The API key comes from the
    /// `GENERATION_API_KEY` environment variable, never the config file.
    pub fn from_config(config: &GenerationConfig) -> Result<Self, ApiError> {
        let api_key = env::var("GENERATION_API_KEY")
            .map_err(|_| config_error("GENERATION_API_KEY environment variable not set"))?;

        let client = pixify_common::create_client(config.timeout_secs, true)
            .map_err(|e| config_error(format!("failed to build generation client: {e}")))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key,
            max_response_bytes: config.max_response_bytes,
        })
    }
}

impl ImageGenerator for HttpImageGenerator {
    fn generate(
        &self,
        prompt: &str,
        idempotency_key: &str,
    ) -> BoxFuture<'_, GeneratedImage, GeneratorError> {
        let prompt = prompt.to_string();
        let idempotency_key = idempotency_key.to_string();
        Box::pin(async move {
            debug!("Sending generation request to {}", self.api_url);

            let response = self
                .client
                .post(&self.api_url)
                .header("x-api-key", &self.api_key)
                .header("X-Idempotency-Key", &idempotency_key)
                .json(&GenerateRequestBody { prompt: &prompt })
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(GeneratorError::Status {
                    status: status.as_u16(),
                    message,
                });
            }

            if let Some(len) = response.content_length() {
                if len > self.max_response_bytes {
                    return Err(GeneratorError::TooLarge {
                        limit: self.max_response_bytes,
                    });
                }
            }

            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("image/png")
                .to_string();

            // Content-Length is advisory; cap the bytes actually read too.
            let mut bytes: Vec<u8> = Vec::new();
            let mut response = response;
            while let Some(chunk) = response.chunk().await? {
                if (bytes.len() + chunk.len()) as u64 > self.max_response_bytes {
                    return Err(GeneratorError::TooLarge {
                        limit: self.max_response_bytes,
                    });
                }
                bytes.extend_from_slice(&chunk);
            }

            Ok(GeneratedImage {
                bytes,
                content_type,
            })
        })
    }
}
