//! Database integration for Pixify
//!
//! This crate provides a database client that is designed to be database
//! agnostic, using SQLx as the underlying database library (SQLite by
//! default, PostgreSQL behind a feature flag), together with the account and
//! transaction repositories.
//!
//! The repositories expose the two conditional updates the rest of the
//! system leans on for correctness: the balance-guarded debit on accounts
//! and the one-shot `credited` claim on transactions. Both are single
//! statements so concurrent callers race in the database, not in the
//! application.

pub mod client;
pub mod error;
pub mod repositories;

pub use client::DbClient;
pub use error::DbError;
pub use repositories::{
    Account, AccountRepository, CreditTransaction, NewAccount, NewTransaction,
    SqlAccountRepository, SqlTransactionRepository, TransactionRepository, TransactionStatus,
};
