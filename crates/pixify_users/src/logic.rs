// --- File: crates/pixify_users/src/logic.rs ---
//! Registration, login and balance lookup.

use crate::auth::TokenAuthority;
use crate::error::UsersError;
use crate::password::PasswordHasher;
use pixify_db::{Account, AccountRepository, NewAccount};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Credits every new account starts with.
pub const INITIAL_CREDIT_BALANCE: i64 = 5;

const MIN_NAME_CHARS: usize = 2;
const MAX_NAME_CHARS: usize = 50;
const MIN_PASSWORD_CHARS: usize = 8;

/// Request body for registration.
#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Request body for login.
#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Account fields safe to return to the client.
#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AccountSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub credit_balance: i64,
}

impl From<Account> for AccountSummary {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            name: account.name,
            email: account.email,
            credit_balance: account.credit_balance,
        }
    }
}

/// Successful register/login result.
#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AuthResponse {
    pub token: String,
    pub account: AccountSummary,
}

/// Balance lookup result.
#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreditBalanceResponse {
    pub name: String,
    pub credit_balance: i64,
}

/// Account registration and login over the account repository.
#[derive(Clone)]
pub struct UserService {
    accounts: Arc<dyn AccountRepository>,
    auth: Arc<TokenAuthority>,
}

impl UserService {
    pub fn new(accounts: Arc<dyn AccountRepository>, auth: Arc<TokenAuthority>) -> Self {
        Self { accounts, auth }
    }

    /// Create an account and sign the caller in.
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, UsersError> {
        let name = request.name.trim().to_string();
        let email = request.email.trim().to_lowercase();
        validate_registration(&name, &email, &request.password)?;

        if self.accounts.find_by_email(&email).await?.is_some() {
            return Err(UsersError::DuplicateEmail);
        }

        let hashed = PasswordHasher::hash(&request.password);
        let account = self
            .accounts
            .create(NewAccount {
                name,
                email,
                password_digest: hashed.digest,
                password_salt: hashed.salt,
                initial_balance: INITIAL_CREDIT_BALANCE,
            })
            .await
            .map_err(|e| {
                // A concurrent register with the same email loses the unique
                // index race here rather than at the pre-check.
                if e.to_string().to_lowercase().contains("unique") {
                    UsersError::DuplicateEmail
                } else {
                    UsersError::Store(e)
                }
            })?;

        info!(account_id = %account.id, "account registered");
        let token = self.auth.issue(&account.id)?;
        Ok(AuthResponse {
            token,
            account: account.into(),
        })
    }

    /// Verify credentials and sign the caller in.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, UsersError> {
        let email = request.email.trim().to_lowercase();

        let Some(account) = self.accounts.find_by_email(&email).await? else {
            return Err(UsersError::InvalidCredentials);
        };

        if !PasswordHasher::verify(
            &request.password,
            &account.password_salt,
            &account.password_digest,
        ) {
            return Err(UsersError::InvalidCredentials);
        }

        let token = self.auth.issue(&account.id)?;
        Ok(AuthResponse {
            token,
            account: account.into(),
        })
    }

    /// Current balance for an authenticated account.
    pub async fn credits(&self, account_id: &str) -> Result<CreditBalanceResponse, UsersError> {
        let Some(account) = self.accounts.find_by_id(account_id).await? else {
            return Err(UsersError::AccountNotFound);
        };
        Ok(CreditBalanceResponse {
            name: account.name,
            credit_balance: account.credit_balance,
        })
    }
}

fn validate_registration(name: &str, email: &str, password: &str) -> Result<(), UsersError> {
    let name_chars = name.chars().count();
    if !(MIN_NAME_CHARS..=MAX_NAME_CHARS).contains(&name_chars) {
        return Err(UsersError::Validation(format!(
            "Name must be between {MIN_NAME_CHARS} and {MAX_NAME_CHARS} characters"
        )));
    }
    if !is_plausible_email(email) {
        return Err(UsersError::Validation(
            "Email address is not valid".to_string(),
        ));
    }
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(UsersError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_CHARS} characters"
        )));
    }
    Ok(())
}

/// Shape check only: one `@` with a dotted domain. Deliverability is out of
/// scope.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixify_common::BoxFuture;
    use pixify_db::DbError;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    struct MemoryAccounts {
        rows: Mutex<HashMap<String, Account>>,
    }

    impl AccountRepository for MemoryAccounts {
        fn init_schema(&self) -> BoxFuture<'_, (), DbError> {
            Box::pin(async { Ok(()) })
        }

        fn create(&self, account: NewAccount) -> BoxFuture<'_, Account, DbError> {
            Box::pin(async move {
                let mut rows = self.rows.lock().unwrap();
                if rows.values().any(|a| a.email == account.email) {
                    return Err(DbError::QueryError(
                        "UNIQUE constraint failed: accounts.email".into(),
                    ));
                }
                let row = Account {
                    id: Uuid::new_v4().to_string(),
                    name: account.name,
                    email: account.email,
                    password_digest: account.password_digest,
                    password_salt: account.password_salt,
                    credit_balance: account.initial_balance,
                    is_active: true,
                    created_at: None,
                    updated_at: None,
                };
                rows.insert(row.id.clone(), row.clone());
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

    fn service() -> UserService {
        UserService::new(
            Arc::new(MemoryAccounts::default()),
            Arc::new(TokenAuthority::new("test-secret", 3600)),
        )
    }

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            name: "Ada Lovelace".into(),
            email: "Ada@Example.com".into(),
            password: "difference engine".into(),
        }
    }

    #[tokio::test]
    async fn register_then_login_round_trip() {
        let service = service();
        let registered = service.register(register_request()).await.unwrap();
        assert_eq!(registered.account.credit_balance, INITIAL_CREDIT_BALANCE);
        assert_eq!(registered.account.email, "ada@example.com");

        let logged_in = service
            .login(LoginRequest {
                email: "ada@example.com".into(),
                password: "difference engine".into(),
            })
            .await
            .unwrap();
        assert_eq!(logged_in.account.id, registered.account.id);
    }

    #[tokio::test]
    async fn login_case_insensitive_email() {
        let service = service();
        service.register(register_request()).await.unwrap();

        let result = service
            .login(LoginRequest {
                email: "ADA@example.COM".into(),
                password: "difference engine".into(),
            })
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let service = service();
        service.register(register_request()).await.unwrap();

        let err = service.register(register_request()).await.unwrap_err();
        assert!(matches!(err, UsersError::DuplicateEmail));
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let service = service();
        service.register(register_request()).await.unwrap();

        let err = service
            .login(LoginRequest {
                email: "ada@example.com".into(),
                password: "analytical engine".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, UsersError::InvalidCredentials));
    }

    #[tokio::test]
    async fn unknown_email_is_same_error_as_wrong_password() {
        let service = service();
        let err = service
            .login(LoginRequest {
                email: "nobody@example.com".into(),
                password: "whatever123".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, UsersError::InvalidCredentials));
    }

    #[tokio::test]
    async fn registration_validation() {
        let service = service();

        let short_name = RegisterRequest {
            name: "A".into(),
            ..register_request()
        };
        assert!(matches!(
            service.register(short_name).await.unwrap_err(),
            UsersError::Validation(_)
        ));

        let bad_email = RegisterRequest {
            email: "not-an-email".into(),
            ..register_request()
        };
        assert!(matches!(
            service.register(bad_email).await.unwrap_err(),
            UsersError::Validation(_)
        ));

        let short_password = RegisterRequest {
            password: "short".into(),
            ..register_request()
        };
        assert!(matches!(
            service.register(short_password).await.unwrap_err(),
            UsersError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn credits_returns_name_and_balance() {
        let service = service();
        let registered = service.register(register_request()).await.unwrap();

        let credits = service.credits(&registered.account.id).await.unwrap();
        assert_eq!(credits.name, "Ada Lovelace");
        assert_eq!(credits.credit_balance, INITIAL_CREDIT_BALANCE);
    }
}
