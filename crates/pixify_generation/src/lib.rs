// --- File: crates/pixify_generation/src/lib.rs ---
//! Image generation proxy for Pixify.
//!
//! Fronts the external text-to-image API with the credit flow around it:
//! one credit is debited before the upstream call and refunded when the
//! call fails, so a successful image always costs exactly one credit.

pub mod client;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod routes;

// Re-export for main backend
pub use client::{GeneratedImage, GeneratorError, HttpImageGenerator, ImageGenerator};
pub use error::{GenerationError, UpstreamFailure};
pub use handlers::GenerationState;
pub use logic::{GenerateImageRequest, GenerateImageResponse, GenerationOrchestrator};
pub use routes::routes;
