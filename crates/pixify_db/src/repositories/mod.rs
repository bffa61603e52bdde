//! Repositories for the Pixify stores
//!
//! Each store has a dyn-compatible trait plus a SQL implementation over the
//! shared `DbClient`.

pub mod accounts;
pub mod accounts_sql;
pub mod transactions;
pub mod transactions_sql;

pub use accounts::{Account, AccountRepository, NewAccount};
pub use accounts_sql::SqlAccountRepository;
pub use transactions::{
    CreditTransaction, NewTransaction, TransactionRepository, TransactionStatus,
};
pub use transactions_sql::SqlTransactionRepository;
