// --- File: crates/pixify_checkout/src/routes.rs ---
use axum::{routing::post, Router};
use std::sync::Arc;

use crate::handlers::{create_order_handler, verify_payment_handler, CheckoutState};

/// Creates a router containing the checkout routes.
/// Nested under `/api` by the backend service.
pub fn routes(state: Arc<CheckoutState>) -> Router {
    Router::new()
        .route("/payment/create-order", post(create_order_handler))
        .route("/payment/verify", post(verify_payment_handler))
        .with_state(state)
}
