// --- File: crates/pixify_checkout/src/handlers.rs ---
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use pixify_common::HttpStatusCode;
use pixify_users::auth::{AuthedAccount, HasTokenAuthority, TokenAuthority};
use serde_json::json;
use std::sync::Arc;
use tracing::error;

use crate::error::CheckoutError;
use crate::logic::{CheckoutOrchestrator, CreateOrderRequest, VerifyPaymentRequest};

/// Shared state for checkout handlers.
#[derive(Clone)]
pub struct CheckoutState {
    pub orchestrator: CheckoutOrchestrator,
    pub auth: Arc<TokenAuthority>,
}

impl HasTokenAuthority for CheckoutState {
    fn token_authority(&self) -> &TokenAuthority {
        &self.auth
    }
}

/// Axum handler for order creation.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/payment/create-order", // Path relative to /api
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Gateway order created", body = crate::logic::CreateOrderResponse),
        (status = 400, description = "Unknown plan"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 502, description = "Gateway order creation failed; nothing persisted")
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
))]
pub async fn create_order_handler(
    State(state): State<Arc<CheckoutState>>,
    auth: AuthedAccount,
    Json(payload): Json<CreateOrderRequest>,
) -> Response {
    let orchestrator = state.orchestrator.clone();
    let account_id = auth.account_id;

    // Detached so a client disconnect cannot cancel the compensating
    // delete of the pending transaction.
    let joined = tokio::spawn(async move {
        orchestrator.create_order(&account_id, &payload).await
    })
    .await;

    respond(joined)
}

/// Axum handler for payment verification.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/payment/verify", // Path relative to /api
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Payment verified; credits granted (or already granted)", body = crate::logic::VerifyPaymentResponse),
        (status = 400, description = "Signature mismatch; nothing changed"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "No transaction for this account and order")
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
))]
pub async fn verify_payment_handler(
    State(state): State<Arc<CheckoutState>>,
    auth: AuthedAccount,
    Json(payload): Json<VerifyPaymentRequest>,
) -> Response {
    let orchestrator = state.orchestrator.clone();
    let account_id = auth.account_id;

    // Detached so the grant still lands if the client goes away between
    // claiming the credited flag and the balance update.
    let joined = tokio::spawn(async move {
        orchestrator.verify_payment(&account_id, &payload).await
    })
    .await;

    respond(joined)
}

fn respond<T: serde::Serialize>(
    joined: Result<Result<T, CheckoutError>, tokio::task::JoinError>,
) -> Response {
    match joined {
        Ok(Ok(body)) => (StatusCode::OK, Json(body)).into_response(),
        Ok(Err(err)) => checkout_error_response(err),
        Err(join_err) => {
            error!(%join_err, "checkout task panicked");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": { "message": "Internal server error" } })),
            )
                .into_response()
        }
    }
}

fn checkout_error_response(err: CheckoutError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let message = match &err {
        CheckoutError::Store(_) | CheckoutError::Internal(_) => {
            error!(%err, "checkout operation failed");
            "Internal server error".to_string()
        }
        other => other.to_string(),
    };
    (status, Json(json!({ "error": { "message": message } }))).into_response()
}
