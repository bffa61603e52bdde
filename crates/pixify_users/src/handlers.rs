// --- File: crates/pixify_users/src/handlers.rs ---
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use pixify_common::HttpStatusCode;
use serde_json::json;
use std::sync::Arc;

use crate::auth::{AuthedAccount, HasTokenAuthority, TokenAuthority};
use crate::error::UsersError;
use crate::logic::{
    AuthResponse, CreditBalanceResponse, LoginRequest, RegisterRequest, UserService,
};

/// Shared state for user handlers.
#[derive(Clone)]
pub struct UsersState {
    pub service: UserService,
    pub auth: Arc<TokenAuthority>,
}

impl HasTokenAuthority for UsersState {
    fn token_authority(&self) -> &TokenAuthority {
        &self.auth
    }
}

/// Axum handler for account registration.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/user/register", // Path relative to /api
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created, token issued", body = AuthResponse),
        (status = 400, description = "Validation failure"),
        (status = 409, description = "Email already registered")
    ),
    tag = "Users"
))]
pub async fn register_handler(
    State(state): State<Arc<UsersState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, Response> {
    state
        .service
        .register(payload)
        .await
        .map(Json)
        .map_err(users_error_response)
}

/// Axum handler for login.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/user/login", // Path relative to /api
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted, token issued", body = AuthResponse),
        (status = 401, description = "Wrong email or password")
    ),
    tag = "Users"
))]
pub async fn login_handler(
    State(state): State<Arc<UsersState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, Response> {
    state
        .service
        .login(payload)
        .await
        .map(Json)
        .map_err(users_error_response)
}

/// Axum handler for the authenticated balance lookup.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/user/credits", // Path relative to /api
    responses(
        (status = 200, description = "Current balance", body = CreditBalanceResponse),
        (status = 401, description = "Missing or invalid bearer token")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
))]
pub async fn credits_handler(
    State(state): State<Arc<UsersState>>,
    auth: AuthedAccount,
) -> Result<Json<CreditBalanceResponse>, Response> {
    state
        .service
        .credits(&auth.account_id)
        .await
        .map(Json)
        .map_err(users_error_response)
}

fn users_error_response(err: UsersError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let message = match &err {
        // Store details stay in the logs
        UsersError::Store(_) | UsersError::Internal(_) => {
            tracing::error!(%err, "user operation failed");
            "Internal server error".to_string()
        }
        other => other.to_string(),
    };
    (status, Json(json!({ "error": { "message": message } }))).into_response()
}
