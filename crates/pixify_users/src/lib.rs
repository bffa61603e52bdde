// --- File: crates/pixify_users/src/lib.rs ---
//! Accounts and auth for Pixify.
//!
//! Registration and login over the account repository, salted password
//! digests, JWT issue/verify, and the bearer-token extractor the other
//! feature crates use for request identity.

pub mod auth;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod password;
pub mod routes;

// Re-export for main backend
pub use auth::{AuthedAccount, Claims, HasTokenAuthority, TokenAuthority};
pub use error::UsersError;
pub use handlers::UsersState;
pub use logic::{UserService, INITIAL_CREDIT_BALANCE};
pub use password::PasswordHasher;
pub use routes::routes;
