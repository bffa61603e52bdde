// --- File: crates/pixify_ledger/src/service.rs ---
//! The credit ledger service.
//!
//! Owns every balance mutation in the system. All three operations map to a
//! single conditional update in the account repository, so the ledger is
//! race-free under concurrent callers without any application-level locking.

use crate::error::LedgerError;
use pixify_db::AccountRepository;
use std::sync::Arc;
use tracing::{info, warn};

/// Atomic debit/credit operations against the account store.
#[derive(Clone)]
pub struct CreditLedger {
    accounts: Arc<dyn AccountRepository>,
}

impl CreditLedger {
    pub fn new(accounts: Arc<dyn AccountRepository>) -> Self {
        Self { accounts }
    }

    /// Atomically take one credit from the account.
    ///
    /// Returns the post-decrement balance. Fails with
    /// `InsufficientBalance` when the conditional update matched no row,
    /// which is how the store reports a zero balance; in that case nothing
    /// was changed.
    pub async fn debit_one(&self, account_id: &str) -> Result<i64, LedgerError> {
        match self.accounts.debit_one(account_id).await? {
            Some(balance) => {
                info!(account_id, balance, "debited one credit");
                Ok(balance)
            }
            None => {
                // The filter can also miss because the account id is
                // unknown; distinguish so callers don't tell a missing
                // account it is out of credit.
                match self.accounts.find_by_id(account_id).await? {
                    Some(_) => Err(LedgerError::InsufficientBalance(account_id.to_string())),
                    None => Err(LedgerError::UnknownAccount(account_id.to_string())),
                }
            }
        }
    }

    /// Give back `n` credits after a failed downstream step.
    ///
    /// Compensating and best-effort: callers log a failure of the refund
    /// itself and surface a server error, but keep the original failed
    /// outcome of the request they were compensating for.
    pub async fn refund(&self, account_id: &str, n: i64) -> Result<i64, LedgerError> {
        match self.accounts.credit(account_id, n).await? {
            Some(balance) => {
                info!(account_id, n, balance, "refunded credits");
                Ok(balance)
            }
            None => {
                warn!(account_id, n, "refund target account not found");
                Err(LedgerError::UnknownAccount(account_id.to_string()))
            }
        }
    }

    /// Add `n` purchased credits as the terminal step of a completed
    /// payment. The caller must hold the transaction's one-time credited
    /// claim; the ledger itself applies the increment unconditionally.
    pub async fn grant(&self, account_id: &str, n: i64) -> Result<i64, LedgerError> {
        match self.accounts.credit(account_id, n).await? {
            Some(balance) => {
                info!(account_id, n, balance, "granted purchased credits");
                Ok(balance)
            }
            None => Err(LedgerError::UnknownAccount(account_id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixify_common::BoxFuture;
    use pixify_db::{Account, DbError, NewAccount};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory account repository with the same conditional-update
    /// semantics as the SQL implementation.
    #[derive(Default)]
    struct MemoryAccounts {
        rows: Mutex<HashMap<String, Account>>,
    }

    impl MemoryAccounts {
        fn with_account(id: &str, balance: i64) -> Arc<Self> {
            let repo = Self::default();
            repo.rows.lock().unwrap().insert(
                id.to_string(),
                Account {
                    id: id.to_string(),
                    name: "Tester".into(),
                    email: format!("{id}@example.com"),
                    password_digest: String::new(),
                    password_salt: String::new(),
                    credit_balance: balance,
                    is_active: true,
                    created_at: None,
                    updated_at: None,
                },
            );
            Arc::new(repo)
        }

        fn balance(&self, id: &str) -> i64 {
            self.rows.lock().unwrap()[id].credit_balance
        }
    }

    impl pixify_db::AccountRepository for MemoryAccounts {
        fn init_schema(&self) -> BoxFuture<'_, (), DbError> {
            Box::pin(async { Ok(()) })
        }

        fn create(&self, account: NewAccount) -> BoxFuture<'_, Account, DbError> {
            Box::pin(async move {
                let row = Account {
                    id: format!("acct-{}", account.email),
                    name: account.name,
                    email: account.email,
                    password_digest: account.password_digest,
                    password_salt: account.password_salt,
                    credit_balance: account.initial_balance,
                    is_active: true,
                    created_at: None,
                    updated_at: None,
                };
                self.rows
                    .lock()
                    .unwrap()
                    .insert(row.id.clone(), row.clone());
                Ok(row)
            })
        }

        fn find_by_id(&self, id: &str) -> BoxFuture<'_, Option<Account>, DbError> {
            let id = id.to_string();
            Box::pin(async move { Ok(self.rows.lock().unwrap().get(&id).cloned()) })
        }

        fn find_by_email(&self, email: &str) -> BoxFuture<'_, Option<Account>, DbError> {
            let email = email.to_string();
            Box::pin(async move {
                Ok(self
                    .rows
                    .lock()
                    .unwrap()
                    .values()
                    .find(|a| a.email == email)
                    .cloned())
            })
        }

        fn debit_one(&self, id: &str) -> BoxFuture<'_, Option<i64>, DbError> {
            let id = id.to_string();
            Box::pin(async move {
                // filter and decrement under one lock, like the single
                // UPDATE statement in SQL
                let mut rows = self.rows.lock().unwrap();
                match rows.get_mut(&id) {
                    Some(row) if row.credit_balance >= 1 => {
                        row.credit_balance -= 1;
                        Ok(Some(row.credit_balance))
                    }
                    _ => Ok(None),
                }
            })
        }

        fn credit(&self, id: &str, amount: i64) -> BoxFuture<'_, Option<i64>, DbError> {
            let id = id.to_string();
            Box::pin(async move {
                let mut rows = self.rows.lock().unwrap();
                match rows.get_mut(&id) {
                    Some(row) => {
                        row.credit_balance += amount;
                        Ok(Some(row.credit_balance))
                    }
                    None => Ok(None),
                }
            })
        }
    }

    #[tokio::test]
    async fn debit_returns_post_decrement_balance() {
        let repo = MemoryAccounts::with_account("a1", 5);
        let ledger = CreditLedger::new(repo.clone());

        let balance = ledger.debit_one("a1").await.unwrap();
        assert_eq!(balance, 4);
        assert_eq!(repo.balance("a1"), 4);
    }

    #[tokio::test]
    async fn debit_at_zero_is_insufficient_and_leaves_balance_alone() {
        let repo = MemoryAccounts::with_account("a1", 0);
        let ledger = CreditLedger::new(repo.clone());

        let err = ledger.debit_one("a1").await.unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance(_)));
        assert_eq!(repo.balance("a1"), 0);
    }

    #[tokio::test]
    async fn debit_unknown_account_is_not_insufficient() {
        let repo = MemoryAccounts::with_account("a1", 3);
        let ledger = CreditLedger::new(repo);

        let err = ledger.debit_one("missing").await.unwrap_err();
        assert!(matches!(err, LedgerError::UnknownAccount(_)));
    }

    #[tokio::test]
    async fn concurrent_debits_succeed_at_most_balance_times() {
        let balance = 5;
        let repo = MemoryAccounts::with_account("a1", balance);
        let ledger = CreditLedger::new(repo.clone());

        let mut handles = Vec::new();
        for _ in 0..(balance + 3) {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(
                async move { ledger.debit_one("a1").await },
            ));
        }

        let mut successes = 0;
        let mut insufficient = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(LedgerError::InsufficientBalance(_)) => insufficient += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(successes, balance);
        assert_eq!(insufficient, 3);
        assert_eq!(repo.balance("a1"), 0);
    }

    #[tokio::test]
    async fn refund_restores_debited_credit() {
        let repo = MemoryAccounts::with_account("a1", 5);
        let ledger = CreditLedger::new(repo.clone());

        ledger.debit_one("a1").await.unwrap();
        let balance = ledger.refund("a1", 1).await.unwrap();
        assert_eq!(balance, 5);
    }

    #[tokio::test]
    async fn grant_adds_purchased_credits() {
        let repo = MemoryAccounts::with_account("a1", 2);
        let ledger = CreditLedger::new(repo.clone());

        let balance = ledger.grant("a1", 500).await.unwrap();
        assert_eq!(balance, 502);
        assert_eq!(repo.balance("a1"), 502);
    }
}
