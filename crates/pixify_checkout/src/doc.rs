// --- File: crates/pixify_checkout/src/doc.rs ---
#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::logic::{
    CreateOrderRequest, CreateOrderResponse, VerifyPaymentRequest, VerifyPaymentResponse,
};
use crate::plans::Plan;

#[utoipa::path(
    post,
    path = "/payment/create-order", // Path relative to /api
    request_body(content = CreateOrderRequest, example = json!({
        "plan_id": "Advanced"
    })),
    responses(
        (status = 200, description = "Gateway order created", body = CreateOrderResponse),
        (status = 400, description = "Unknown plan"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 502, description = "Gateway order creation failed; nothing persisted")
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
fn doc_create_order_handler() {}

#[utoipa::path(
    post,
    path = "/payment/verify", // Path relative to /api
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Payment verified; credits granted (or already granted)", body = VerifyPaymentResponse),
        (status = 400, description = "Signature mismatch; nothing changed"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "No transaction for this account and order")
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
fn doc_verify_payment_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(doc_create_order_handler, doc_verify_payment_handler),
    components(schemas(
        CreateOrderRequest,
        CreateOrderResponse,
        VerifyPaymentRequest,
        VerifyPaymentResponse,
        Plan
    )),
    tags((name = "Checkout", description = "Credit purchase and payment verification"))
)]
pub struct CheckoutApiDoc;
