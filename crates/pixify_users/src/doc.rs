// --- File: crates/pixify_users/src/doc.rs ---
#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::logic::{
    AccountSummary, AuthResponse, CreditBalanceResponse, LoginRequest, RegisterRequest,
};

#[utoipa::path(
    post,
    path = "/user/register", // Path relative to /api
    request_body(content = RegisterRequest, example = json!({
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "password": "difference engine"
    })),
    responses(
        (status = 200, description = "Account created, token issued", body = AuthResponse),
        (status = 400, description = "Validation failure"),
        (status = 409, description = "Email already registered")
    ),
    tag = "Users"
)]
fn doc_register_handler() {}

#[utoipa::path(
    post,
    path = "/user/login", // Path relative to /api
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted, token issued", body = AuthResponse),
        (status = 401, description = "Wrong email or password")
    ),
    tag = "Users"
)]
fn doc_login_handler() {}

#[utoipa::path(
    get,
    path = "/user/credits", // Path relative to /api
    responses(
        (status = 200, description = "Current balance", body = CreditBalanceResponse),
        (status = 401, description = "Missing or invalid bearer token")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
fn doc_credits_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(doc_register_handler, doc_login_handler, doc_credits_handler),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        AuthResponse,
        AccountSummary,
        CreditBalanceResponse
    )),
    tags((name = "Users", description = "Account registration, login and balance"))
)]
pub struct UsersApiDoc;
