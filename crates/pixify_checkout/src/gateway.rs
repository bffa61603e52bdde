// --- File: crates/pixify_checkout/src/gateway.rs ---
//! Payment gateway order-create client.
//!
//! The gateway contract: POST an order with the charge amount in minor
//! units and a receipt reference, get back an order id the client-side
//! payment widget uses to collect the payment.

use pixify_common::{config_error, ApiError, BoxFuture};
use pixify_config::PaymentConfig;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use tracing::debug;

/// Errors from the gateway order-create call.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Gateway answered with a non-success status
    #[error("gateway returned status {status}: {message}")]
    Api { status: u16, message: String },

    /// Connection-level failure or timeout
    #[error("gateway request failed: {0}")]
    Network(String),

    /// Gateway response did not parse
    #[error("failed to parse gateway response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Network(err.to_string())
    }
}

/// An order accepted by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

/// The payment gateway, behind a trait so checkout logic can be exercised
/// without network access.
pub trait PaymentGateway: Send + Sync {
    /// Create an order for `amount_minor` minor currency units. `receipt`
    /// is an opaque reference echoed back in gateway dashboards and
    /// webhooks; checkout passes the transaction id.
    fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> BoxFuture<'_, GatewayOrder, GatewayError>;
}

#[derive(Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

/// reqwest-backed gateway client authenticating with the key id and the
/// secret from the `PAYMENT_KEY_SECRET` environment variable.
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    api_url: String,
    key_id: String,
    key_secret: String,
}

impl HttpPaymentGateway {
    pub fn from_config(config: &PaymentConfig) -> Result<Self, ApiError> {
        let key_secret = env::var("PAYMENT_KEY_SECRET")
            .map_err(|_| config_error("PAYMENT_KEY_SECRET environment variable not set"))?;

        Ok(Self {
            client: pixify_common::HTTP_CLIENT.clone(),
            api_url: config.api_url.clone(),
            key_id: config.key_id.clone(),
            key_secret,
        })
    }
}

impl PaymentGateway for HttpPaymentGateway {
    fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> BoxFuture<'_, GatewayOrder, GatewayError> {
        let currency = currency.to_string();
        let receipt = receipt.to_string();
        Box::pin(async move {
            let url = format!("{}/orders", self.api_url.trim_end_matches('/'));
            debug!(%url, amount_minor, "creating gateway order");

            let response = self
                .client
                .post(&url)
                .basic_auth(&self.key_id, Some(&self.key_secret))
                .json(&CreateOrderBody {
                    amount: amount_minor,
                    currency: &currency,
                    receipt: &receipt,
                })
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(GatewayError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            response
                .json::<GatewayOrder>()
                .await
                .map_err(|e| GatewayError::Parse(e.to_string()))
        })
    }
}
