//! Account records and the account repository trait
//!
//! The account row carries the credit balance. The balance is only ever
//! mutated through the conditional single-statement updates below, never by
//! reading a value and writing it back.

use crate::error::DbError;
use chrono::{DateTime, Utc};
use pixify_common::BoxFuture;
use serde::{Deserialize, Serialize};

/// A persisted user account with its credit balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_digest: String,
    pub password_salt: String,
    pub credit_balance: i64,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// The fields needed to create a new account. The id and timestamps are
/// assigned by the repository.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password_digest: String,
    pub password_salt: String,
    pub initial_balance: i64,
}

/// Repository for account records.
///
/// Dyn-compatible so services can hold an `Arc<dyn AccountRepository>` and
/// tests can substitute an in-memory implementation.
pub trait AccountRepository: Send + Sync {
    /// Create the accounts table if it does not exist.
    fn init_schema(&self) -> BoxFuture<'_, (), DbError>;

    /// Insert a new account, returning the stored record.
    fn create(&self, account: NewAccount) -> BoxFuture<'_, Account, DbError>;

    /// Look up an account by id.
    fn find_by_id(&self, id: &str) -> BoxFuture<'_, Option<Account>, DbError>;

    /// Look up an account by (lowercased) email.
    fn find_by_email(&self, email: &str) -> BoxFuture<'_, Option<Account>, DbError>;

    /// Atomically decrement the balance by one if at least one credit is
    /// available. Returns the post-decrement balance, or `None` if no row
    /// matched the filter (balance was zero or the account is unknown).
    ///
    /// Implementations must use a single conditional update; two concurrent
    /// callers must never both succeed when only one credit remains.
    fn debit_one(&self, id: &str) -> BoxFuture<'_, Option<i64>, DbError>;

    /// Atomically increment the balance by `amount`. Returns the new
    /// balance, or `None` if the account is unknown.
    fn credit(&self, id: &str, amount: i64) -> BoxFuture<'_, Option<i64>, DbError>;
}
