// --- File: crates/pixify_users/src/routes.rs ---
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers::{credits_handler, login_handler, register_handler, UsersState};

/// Creates a router containing the user routes.
/// Nested under `/api` by the backend service.
pub fn routes(state: Arc<UsersState>) -> Router {
    Router::new()
        .route("/user/register", post(register_handler))
        .route("/user/login", post(login_handler))
        .route("/user/credits", get(credits_handler))
        .with_state(state)
}
