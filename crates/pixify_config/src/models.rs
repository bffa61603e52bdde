// --- File: crates/pixify_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. DATABASE_URL loaded via PIXIFY__DATABASE__URL or DATABASE_URL
}

// --- Auth Config ---
// Holds non-secret auth parameters. Signing secret loaded from env var: JWT_SECRET.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    /// Token lifetime in seconds.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
}

fn default_token_ttl_secs() -> u64 {
    60 * 60 * 24 // 24h, matching the session length the web client expects
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl_secs: default_token_ttl_secs(),
        }
    }
}

// --- Generation Config ---
// Holds non-secret generation upstream config. API key loaded from env var: GENERATION_API_KEY.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GenerationConfig {
    pub api_url: String, // Mandatory
    #[serde(default = "default_generation_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: u64,
}

fn default_generation_timeout_secs() -> u64 {
    30
}

fn default_max_response_bytes() -> u64 {
    50 * 1024 * 1024
}

// --- Payment Config ---
// Holds non-secret payment gateway config. Secret loaded from env var: PAYMENT_KEY_SECRET.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PaymentConfig {
    pub api_url: String, // Mandatory
    pub key_id: String,  // Publishable key id, returned to the client with each order
    pub currency: Option<String>,
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_generation: bool,
    #[serde(default)]
    pub use_payment: bool,

    // --- Feature Configurations ---
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub auth: Option<AuthConfig>,
    #[serde(default)]
    pub generation: Option<GenerationConfig>,
    #[serde(default)]
    pub payment: Option<PaymentConfig>,
}
