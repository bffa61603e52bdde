// --- File: crates/services/pixify_backend/src/app_state.rs ---
//! Startup wiring: one place where concrete repositories, clients and
//! orchestrators are constructed and injected. Nothing below this layer
//! reaches for globals or environment variables at request time.

use pixify_checkout::{CheckoutOrchestrator, CheckoutState, HttpPaymentGateway, PaymentGateway};
use pixify_common::{config_error, ApiError};
use pixify_config::AppConfig;
use pixify_db::{
    AccountRepository, DbClient, SqlAccountRepository, SqlTransactionRepository,
    TransactionRepository,
};
use pixify_generation::{GenerationOrchestrator, GenerationState, HttpImageGenerator, ImageGenerator};
use pixify_ledger::CreditLedger;
use pixify_users::{TokenAuthority, UserService, UsersState};
use std::env;
use std::sync::Arc;
use tracing::info;

/// Everything the routers need, built once at startup.
pub struct AppState {
    pub users: Arc<UsersState>,
    /// Present when `use_generation` is set and configured
    pub generation: Option<Arc<GenerationState>>,
    /// Present when `use_payment` is set and configured
    pub checkout: Option<Arc<CheckoutState>>,
}

impl AppState {
    /// Connect the database, run schema init and wire all services.
    pub async fn init(config: Arc<AppConfig>) -> Result<Self, ApiError> {
        let db = DbClient::new(&config)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        let accounts: Arc<dyn AccountRepository> =
            Arc::new(SqlAccountRepository::new(db.clone()));
        let transactions: Arc<dyn TransactionRepository> =
            Arc::new(SqlTransactionRepository::new(db));

        accounts
            .init_schema()
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        transactions
            .init_schema()
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        let auth_config = config.auth.clone().unwrap_or_default();
        let auth = Arc::new(TokenAuthority::from_env(auth_config.token_ttl_secs)?);
        let ledger = CreditLedger::new(accounts.clone());

        let users = Arc::new(UsersState {
            service: UserService::new(accounts, auth.clone()),
            auth: auth.clone(),
        });

        let generation = if config.use_generation {
            let generation_config = config
                .generation
                .as_ref()
                .ok_or_else(|| config_error("use_generation is set but [generation] is missing"))?;
            let generator: Arc<dyn ImageGenerator> =
                Arc::new(HttpImageGenerator::from_config(generation_config)?);
            info!(api_url = %generation_config.api_url, "generation enabled");
            Some(Arc::new(GenerationState {
                orchestrator: GenerationOrchestrator::new(ledger.clone(), generator),
                auth: auth.clone(),
            }))
        } else {
            None
        };

        let checkout = if config.use_payment {
            let payment_config = config
                .payment
                .as_ref()
                .ok_or_else(|| config_error("use_payment is set but [payment] is missing"))?;
            let gateway: Arc<dyn PaymentGateway> =
                Arc::new(HttpPaymentGateway::from_config(payment_config)?);
            let key_secret = env::var("PAYMENT_KEY_SECRET")
                .map_err(|_| config_error("PAYMENT_KEY_SECRET environment variable not set"))?;
            let currency = payment_config
                .currency
                .clone()
                .unwrap_or_else(|| "USD".to_string());
            info!(api_url = %payment_config.api_url, %currency, "payment enabled");
            Some(Arc::new(CheckoutState {
                orchestrator: CheckoutOrchestrator::new(
                    transactions,
                    ledger,
                    gateway,
                    payment_config.key_id.clone(),
                    key_secret,
                    currency,
                ),
                auth,
            }))
        } else {
            None
        };

        Ok(Self {
            users,
            generation,
            checkout,
        })
    }
}
