// --- File: crates/pixify_users/src/auth.rs ---
//! JWT issue/verify and the bearer-token request extractor.
//!
//! The extractor is the only source of request identity in the API:
//! handlers never read an account id out of a request body.

use crate::error::UsersError;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::env;
use std::sync::Arc;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account id)
    pub sub: String,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

/// Issues and validates bearer tokens for the API.
///
/// Construct once at startup from the `JWT_SECRET` environment variable and
/// share via `Arc`.
pub struct TokenAuthority {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
}

impl TokenAuthority {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    /// Build from the `JWT_SECRET` environment variable.
    pub fn from_env(ttl_secs: u64) -> Result<Self, UsersError> {
        let secret = env::var("JWT_SECRET")
            .map_err(|_| UsersError::Internal("JWT_SECRET environment variable not set".into()))?;
        Ok(Self::new(&secret, ttl_secs))
    }

    /// Create a signed token for the account.
    pub fn issue(&self, account_id: &str) -> Result<String, UsersError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.ttl_secs as i64);

        let claims = Claims {
            sub: account_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| UsersError::Internal(format!("failed to sign token: {e}")))
    }

    /// Validate a token's signature and expiry, returning its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, UsersError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| UsersError::InvalidToken)
    }
}

/// Implemented by router states whose requests carry bearer tokens.
pub trait HasTokenAuthority {
    fn token_authority(&self) -> &TokenAuthority;
}

/// The authenticated caller, extracted from `Authorization: Bearer <jwt>`.
#[derive(Debug, Clone)]
pub struct AuthedAccount {
    pub account_id: String,
}

impl<S> FromRequestParts<Arc<S>> for AuthedAccount
where
    S: HasTokenAuthority + Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<S>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| unauthorized("Missing bearer token"))?;

        let claims = state
            .token_authority()
            .verify(token)
            .map_err(|_| unauthorized("Invalid or expired token"))?;

        Ok(AuthedAccount {
            account_id: claims.sub,
        })
    }
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": { "message": message } })),
    )
        .into_response()
}
