//! Payment transaction records and the transaction repository trait
//!
//! A transaction is one payment attempt. It is created `pending`, gets an
//! order id once the gateway accepts the order, and moves to `completed`
//! when the payment signature verifies. The `credited` flag records whether
//! the credits have been added to the account; it is the idempotency gate
//! that keeps a transaction from granting twice.

use crate::error::DbError;
use chrono::{DateTime, Utc};
use pixify_common::BoxFuture;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a transaction. A transaction leaves `Pending` at most
/// once; there is no transition out of a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TransactionStatus::Pending),
            "completed" => Some(TransactionStatus::Completed),
            "failed" => Some(TransactionStatus::Failed),
            _ => None,
        }
    }
}

/// A persisted payment transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditTransaction {
    pub id: String,
    pub account_id: String,
    pub plan: String,
    pub amount: i64,
    pub credits: i64,
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
    pub signature: Option<String>,
    pub status: TransactionStatus,
    pub credited: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// The fields needed to create a pending transaction.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub account_id: String,
    pub plan: String,
    pub amount: i64,
    pub credits: i64,
}

/// Repository for payment transactions.
pub trait TransactionRepository: Send + Sync {
    /// Create the transactions table if it does not exist.
    fn init_schema(&self) -> BoxFuture<'_, (), DbError>;

    /// Insert a new pending transaction, returning the stored record.
    fn create(&self, transaction: NewTransaction) -> BoxFuture<'_, CreditTransaction, DbError>;

    /// Attach the gateway order id to a transaction.
    fn set_order_id(&self, id: &str, order_id: &str) -> BoxFuture<'_, bool, DbError>;

    /// Remove a transaction. Used to compensate when order creation fails so
    /// a pending transaction never outlives a failed order.
    fn delete(&self, id: &str) -> BoxFuture<'_, bool, DbError>;

    /// Secondary lookup by owning account and gateway order id.
    fn find_by_account_and_order(
        &self,
        account_id: &str,
        order_id: &str,
    ) -> BoxFuture<'_, Option<CreditTransaction>, DbError>;

    /// Record the verified payment and move the transaction to `completed`.
    /// Conditional on the current status being `pending`, so the transition
    /// happens at most once; returns whether a row was updated.
    fn mark_completed(
        &self,
        id: &str,
        payment_id: &str,
        signature: &str,
    ) -> BoxFuture<'_, bool, DbError>;

    /// Claim the one-time right to grant this transaction's credits.
    /// Conditional on `credited` being false; exactly one caller across all
    /// retries observes `true` and performs the balance grant.
    fn claim_credit(&self, id: &str) -> BoxFuture<'_, bool, DbError>;
}
