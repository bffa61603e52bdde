// --- File: crates/pixify_generation/src/doc.rs ---
#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::logic::{GenerateImageRequest, GenerateImageResponse};

#[utoipa::path(
    post,
    path = "/image/generate", // Path relative to /api
    request_body(content = GenerateImageRequest, example = json!({
        "prompt": "a watercolor fox in a snowy forest"
    })),
    responses(
        (status = 200, description = "Image generated, one credit consumed", body = GenerateImageResponse),
        (status = 400, description = "Empty or oversized prompt, or prompt rejected upstream"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 402, description = "No credit left; nothing was charged"),
        (status = 502, description = "Upstream generation failure; credit refunded"),
        (status = 504, description = "Upstream timeout; credit refunded")
    ),
    security(("bearer_auth" = [])),
    tag = "Generation"
)]
fn doc_generate_image_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(doc_generate_image_handler),
    components(schemas(GenerateImageRequest, GenerateImageResponse)),
    tags((name = "Generation", description = "Text-to-image generation endpoints"))
)]
pub struct GenerationApiDoc;
