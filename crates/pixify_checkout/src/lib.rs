// --- File: crates/pixify_checkout/src/lib.rs ---
//! Credit purchase checkout for Pixify.
//!
//! Order creation against the payment gateway with a
//! transaction-before-order write and a compensating delete, HMAC
//! signature verification of the payment result, and an idempotent credit
//! grant gated by the transaction's one-time credited claim.

pub mod doc;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod logic;
pub mod plans;
pub mod routes;
pub mod signature;

// Re-export for main backend
pub use error::CheckoutError;
pub use gateway::{GatewayError, GatewayOrder, HttpPaymentGateway, PaymentGateway};
pub use handlers::CheckoutState;
pub use logic::{
    CheckoutOrchestrator, CreateOrderRequest, CreateOrderResponse, VerifyPaymentRequest,
    VerifyPaymentResponse,
};
pub use plans::Plan;
pub use routes::routes;
pub use signature::verify_payment_signature;
