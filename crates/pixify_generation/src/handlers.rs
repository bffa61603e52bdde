// --- File: crates/pixify_generation/src/handlers.rs ---
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

use crate::error::GenerationError;
use crate::logic::{GenerateImageRequest, GenerationOrchestrator};

/// Shared state for generation handlers.
#[derive(Clone)]
pub struct GenerationState {
    pub orchestrator: GenerationOrchestrator,
    pub auth: Arc<TokenAuthority>,
}

impl HasTokenAuthority for GenerationState {
    fn token_authority(&self) -> &TokenAuthority {
        &self.auth
    }
}

/// Axum handler for image generation.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/image/generate", // Path relative to /api
    request_body = GenerateImageRequest,
    responses(
        (status = 200, description = "Image generated, one credit consumed", body = crate::logic::GenerateImageResponse),
        (status = 400, description = "Empty or oversized prompt, or prompt rejected upstream"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 402, description = "No credit left; nothing was charged"),
        (status = 502, description = "Upstream generation failure; credit refunded"),
        (status = 504, description = "Upstream timeout; credit refunded")
    ),
    security(("bearer_auth" = [])),
    tag = "Generation"
))]
pub async fn generate_image_handler(
    State(state): State<Arc<GenerationState>>,
    auth: AuthedAccount,
    Json(payload): Json<GenerateImageRequest>,
) -> Response {
    let orchestrator = state.orchestrator.clone();
    let account_id = auth.account_id;

    // Run detached so a client disconnect cannot cancel the flow between
    // the debit and its compensating refund.
    let joined = tokio::spawn(async move {
        orchestrator.generate(&account_id, &payload).await
    })
    .await;

    match joined {
        Ok(Ok(response)) => (StatusCode::OK, Json(response)).into_response(),
        Ok(Err(err)) => generation_error_response(err),
        Err(join_err) => {
            error!(%join_err, "generation task panicked");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": { "message": "Internal server error" } })),
            )
                .into_response()
        }
    }
}

fn generation_error_response(err: GenerationError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut body = json!({ "error": { "message": err.user_message() } });
    if let GenerationError::Upstream {
        credit_balance: Some(balance),
        ..
    } = &err
    {
        body["credit_balance"] = json!(balance);
    }

    (status, Json(body)).into_response()
}
