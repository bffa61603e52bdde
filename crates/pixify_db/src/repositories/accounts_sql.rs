//! SQL implementation of the account repository

use crate::error::DbError;
use crate::repositories::accounts::{Account, AccountRepository, NewAccount};
use crate::DbClient;
use pixify_common::BoxFuture;
use sqlx::Row;
use tracing::{debug, error, info};

/// SQL implementation of the account repository
#[derive(Debug, Clone)]
pub struct SqlAccountRepository {
    /// The database client
    db_client: DbClient,
}

impl SqlAccountRepository {
    /// Create a new SQL account repository
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

fn row_to_account(row: &sqlx::any::AnyRow) -> Account {
    Account {
        id: row.try_get("id").unwrap_or_default(),
        name: row.try_get("name").unwrap_or_default(),
        email: row.try_get("email").unwrap_or_default(),
        password_digest: row.try_get("password_digest").unwrap_or_default(),
        password_salt: row.try_get("password_salt").unwrap_or_default(),
        credit_balance: row.try_get::<i64, _>("credit_balance").unwrap_or_default(),
        is_active: row.try_get::<i64, _>("is_active").map(|v| v != 0).unwrap_or(true),
        created_at: None, // DateTime<Utc> doesn't implement Decode for sqlx::Any
        updated_at: None, // DateTime<Utc> doesn't implement Decode for sqlx::Any
    }
}

const ACCOUNT_COLUMNS: &str =
    "id, name, email, password_digest, password_salt, credit_balance, is_active";

impl AccountRepository for SqlAccountRepository {
    fn init_schema(&self) -> BoxFuture<'_, (), DbError> {
        Box::pin(async move {
            debug!("Initializing accounts schema");

            let query = r#"
                CREATE TABLE IF NOT EXISTS accounts (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    email TEXT NOT NULL UNIQUE,
                    password_digest TEXT NOT NULL,
                    password_salt TEXT NOT NULL,
                    credit_balance BIGINT NOT NULL DEFAULT 5 CHECK (credit_balance >= 0),
                    is_active BIGINT NOT NULL DEFAULT 1,
                    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
                )
            "#;

            self.db_client.execute(query).await?;

            info!("Accounts schema initialized successfully");
            Ok(())
        })
    }

    fn create(&self, account: NewAccount) -> BoxFuture<'_, Account, DbError> {
        Box::pin(async move {
            let id = uuid::Uuid::new_v4().to_string();
            debug!("Creating account {} for email: {}", id, account.email);

            let query = format!(
                r#"
                INSERT INTO accounts (id, name, email, password_digest, password_salt, credit_balance)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING {ACCOUNT_COLUMNS}
                "#
            );

            let row = sqlx::query(&query)
                .bind(&id)
                .bind(&account.name)
                .bind(&account.email)
                .bind(&account.password_digest)
                .bind(&account.password_salt)
                .bind(account.initial_balance)
                .fetch_one(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to insert account: {}", e);
                    DbError::QueryError(e.to_string())
                })?;

            Ok(row_to_account(&row))
        })
    }

    fn find_by_id(&self, id: &str) -> BoxFuture<'_, Option<Account>, DbError> {
        let id = id.to_string();
        Box::pin(async move {
            let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");

            let result = sqlx::query(&query)
                .bind(&id)
                .fetch_optional(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to find account: {}", e);
                    DbError::QueryError(e.to_string())
                })?;

            Ok(result.map(|row| row_to_account(&row)))
        })
    }

    fn find_by_email(&self, email: &str) -> BoxFuture<'_, Option<Account>, DbError> {
        let email = email.to_string();
        Box::pin(async move {
            let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1");

            let result = sqlx::query(&query)
                .bind(&email)
                .fetch_optional(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to find account by email: {}", e);
                    DbError::QueryError(e.to_string())
                })?;

            Ok(result.map(|row| row_to_account(&row)))
        })
    }

    fn debit_one(&self, id: &str) -> BoxFuture<'_, Option<i64>, DbError> {
        let id = id.to_string();
        Box::pin(async move {
            debug!("Debiting one credit from account: {}", id);

            // The WHERE clause is the whole race-safety story: the row only
            // matches while a credit is available, so concurrent debits past
            // zero match nothing and return no row.
            let query = r#"
                UPDATE accounts
                SET credit_balance = credit_balance - 1, updated_at = CURRENT_TIMESTAMP
                WHERE id = $1 AND credit_balance >= 1
                RETURNING credit_balance
            "#;

            let result = sqlx::query(query)
                .bind(&id)
                .fetch_optional(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to debit account: {}", e);
                    DbError::QueryError(e.to_string())
                })?;

            Ok(result.and_then(|row| row.try_get::<i64, _>("credit_balance").ok()))
        })
    }

    fn credit(&self, id: &str, amount: i64) -> BoxFuture<'_, Option<i64>, DbError> {
        let id = id.to_string();
        Box::pin(async move {
            debug!("Crediting {} to account: {}", amount, id);

            let query = r#"
                UPDATE accounts
                SET credit_balance = credit_balance + $2, updated_at = CURRENT_TIMESTAMP
                WHERE id = $1
                RETURNING credit_balance
            "#;

            let result = sqlx::query(query)
                .bind(&id)
                .bind(amount)
                .fetch_optional(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to credit account: {}", e);
                    DbError::QueryError(e.to_string())
                })?;

            Ok(result.and_then(|row| row.try_get::<i64, _>("credit_balance").ok()))
        })
    }
}
