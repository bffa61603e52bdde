// --- File: crates/pixify_generation/src/routes.rs ---
use axum::{routing::post, Router};
use std::sync::Arc;

use crate::handlers::{generate_image_handler, GenerationState};

/// Creates a router containing the generation routes.
/// Nested under `/api` by the backend service.
pub fn routes(state: Arc<GenerationState>) -> Router {
    Router::new()
        .route("/image/generate", post(generate_image_handler))
        .with_state(state)
}
