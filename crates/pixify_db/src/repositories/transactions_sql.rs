//! SQL implementation of the transaction repository

use crate::error::DbError;
use crate::repositories::transactions::{
    CreditTransaction, NewTransaction, TransactionRepository, TransactionStatus,
};
use crate::DbClient;
use pixify_common::BoxFuture;
use sqlx::Row;
use tracing::{debug, error, info};

/// SQL implementation of the transaction repository
#[derive(Debug, Clone)]
pub struct SqlTransactionRepository {
    /// The database client
    db_client: DbClient,
}

impl SqlTransactionRepository {
    /// Create a new SQL transaction repository
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

fn row_to_transaction(row: &sqlx::any::AnyRow) -> CreditTransaction {
    let status = row
        .try_get::<String, _>("status")
        .ok()
        .and_then(|s| TransactionStatus::parse(&s))
        .unwrap_or(TransactionStatus::Pending);

    CreditTransaction {
        id: row.try_get("id").unwrap_or_default(),
        account_id: row.try_get("account_id").unwrap_or_default(),
        plan: row.try_get("plan").unwrap_or_default(),
        amount: row.try_get::<i64, _>("amount").unwrap_or_default(),
        credits: row.try_get::<i64, _>("credits").unwrap_or_default(),
        order_id: row.try_get("order_id").ok(),
        payment_id: row.try_get("payment_id").ok(),
        signature: row.try_get("signature").ok(),
        status,
        credited: row.try_get::<i64, _>("credited").map(|v| v != 0).unwrap_or(false),
        created_at: None, // DateTime<Utc> doesn't implement Decode for sqlx::Any
        updated_at: None, // DateTime<Utc> doesn't implement Decode for sqlx::Any
    }
}

const TRANSACTION_COLUMNS: &str =
    "id, account_id, plan, amount, credits, order_id, payment_id, signature, status, credited";

impl TransactionRepository for SqlTransactionRepository {
    fn init_schema(&self) -> BoxFuture<'_, (), DbError> {
        Box::pin(async move {
            debug!("Initializing transactions schema");

            let query = r#"
                CREATE TABLE IF NOT EXISTS transactions (
                    id TEXT PRIMARY KEY,
                    account_id TEXT NOT NULL,
                    plan TEXT NOT NULL,
                    amount BIGINT NOT NULL CHECK (amount >= 0),
                    credits BIGINT NOT NULL CHECK (credits >= 0),
                    order_id TEXT,
                    payment_id TEXT,
                    signature TEXT,
                    status TEXT NOT NULL DEFAULT 'pending',
                    credited BIGINT NOT NULL DEFAULT 0,
                    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                    UNIQUE(account_id, order_id)
                )
            "#;

            self.db_client.execute(query).await?;

            info!("Transactions schema initialized successfully");
            Ok(())
        })
    }

    fn create(&self, transaction: NewTransaction) -> BoxFuture<'_, CreditTransaction, DbError> {
        Box::pin(async move {
            let id = uuid::Uuid::new_v4().to_string();
            debug!(
                "Creating pending transaction {} for account: {}",
                id, transaction.account_id
            );

            let query = format!(
                r#"
                INSERT INTO transactions (id, account_id, plan, amount, credits)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING {TRANSACTION_COLUMNS}
                "#
            );

            let row = sqlx::query(&query)
                .bind(&id)
                .bind(&transaction.account_id)
                .bind(&transaction.plan)
                .bind(transaction.amount)
                .bind(transaction.credits)
                .fetch_one(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to insert transaction: {}", e);
                    DbError::QueryError(e.to_string())
                })?;

            Ok(row_to_transaction(&row))
        })
    }

    fn set_order_id(&self, id: &str, order_id: &str) -> BoxFuture<'_, bool, DbError> {
        let id = id.to_string();
        let order_id = order_id.to_string();
        Box::pin(async move {
            debug!("Attaching order {} to transaction: {}", order_id, id);

            let query = r#"
                UPDATE transactions
                SET order_id = $2, updated_at = CURRENT_TIMESTAMP
                WHERE id = $1
            "#;

            let result = sqlx::query(query)
                .bind(&id)
                .bind(&order_id)
                .execute(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to set order id: {}", e);
                    DbError::QueryError(e.to_string())
                })?;

            Ok(result.rows_affected() > 0)
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, bool, DbError> {
        let id = id.to_string();
        Box::pin(async move {
            debug!("Deleting transaction: {}", id);

            let query = "DELETE FROM transactions WHERE id = $1";

            let result = sqlx::query(query)
                .bind(&id)
                .execute(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to delete transaction: {}", e);
                    DbError::QueryError(e.to_string())
                })?;

            Ok(result.rows_affected() > 0)
        })
    }

    fn find_by_account_and_order(
        &self,
        account_id: &str,
        order_id: &str,
    ) -> BoxFuture<'_, Option<CreditTransaction>, DbError> {
        let account_id = account_id.to_string();
        let order_id = order_id.to_string();
        Box::pin(async move {
            let query = format!(
                r#"
                SELECT {TRANSACTION_COLUMNS}
                FROM transactions
                WHERE account_id = $1 AND order_id = $2
                "#
            );

            let result = sqlx::query(&query)
                .bind(&account_id)
                .bind(&order_id)
                .fetch_optional(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to find transaction: {}", e);
                    DbError::QueryError(e.to_string())
                })?;

            Ok(result.map(|row| row_to_transaction(&row)))
        })
    }

    fn mark_completed(
        &self,
        id: &str,
        payment_id: &str,
        signature: &str,
    ) -> BoxFuture<'_, bool, DbError> {
        let id = id.to_string();
        let payment_id = payment_id.to_string();
        let signature = signature.to_string();
        Box::pin(async move {
            debug!("Marking transaction completed: {}", id);

            // Status filter keeps the pending -> completed transition
            // one-way; a repeat verification matches no row here.
            let query = r#"
                UPDATE transactions
                SET status = 'completed', payment_id = $2, signature = $3,
                    updated_at = CURRENT_TIMESTAMP
                WHERE id = $1 AND status = 'pending'
            "#;

            let result = sqlx::query(query)
                .bind(&id)
                .bind(&payment_id)
                .bind(&signature)
                .execute(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to mark transaction completed: {}", e);
                    DbError::QueryError(e.to_string())
                })?;

            Ok(result.rows_affected() > 0)
        })
    }

    fn claim_credit(&self, id: &str) -> BoxFuture<'_, bool, DbError> {
        let id = id.to_string();
        Box::pin(async move {
            debug!("Claiming credit grant for transaction: {}", id);

            let query = r#"
                UPDATE transactions
                SET credited = 1, updated_at = CURRENT_TIMESTAMP
                WHERE id = $1 AND credited = 0
            "#;

            let result = sqlx::query(query)
                .bind(&id)
                .execute(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to claim credit grant: {}", e);
                    DbError::QueryError(e.to_string())
                })?;

            Ok(result.rows_affected() > 0)
        })
    }
}
