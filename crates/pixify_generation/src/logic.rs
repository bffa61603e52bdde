// --- File: crates/pixify_generation/src/logic.rs ---
//! Core logic for the generation flow: validate, debit, call upstream,
//! refund on failure.

use crate::client::{GeneratorError, ImageGenerator};
use crate::error::{GenerationError, UpstreamFailure};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use pixify_ledger::{CreditLedger, LedgerError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Longest accepted prompt, in characters.
pub const MAX_PROMPT_CHARS: usize = 1000;

/// Request body for the generation endpoint.
#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GenerateImageRequest {
    /// Text description of the image to generate
    pub prompt: String,
}

/// Successful generation result.
#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GenerateImageResponse {
    /// The image as a `data:` URL, ready for an `<img>` src attribute
    pub image: String,
    /// Credit balance after the debit for this generation
    pub credit_balance: i64,
}

/// Orchestrates one generation: debit first, call the upstream API, refund
/// the debit when the call fails.
#[derive(Clone)]
pub struct GenerationOrchestrator {
    ledger: CreditLedger,
    generator: Arc<dyn ImageGenerator>,
}

impl GenerationOrchestrator {
    pub fn new(ledger: CreditLedger, generator: Arc<dyn ImageGenerator>) -> Self {
        Self { ledger, generator }
    }

    /// Run the full generation flow for one account.
    ///
    /// The debit happens before the upstream call, so a crash mid-flight
    /// can at worst cost the account one credit, never produce an unpaid
    /// image. Any upstream failure triggers a compensating refund of that
    /// one credit.
    pub async fn generate(
        &self,
        account_id: &str,
        request: &GenerateImageRequest,
    ) -> Result<GenerateImageResponse, GenerationError> {
        let prompt = validate_prompt(&request.prompt)?;

        let balance_after_debit = match self.ledger.debit_one(account_id).await {
            Ok(balance) => balance,
            Err(LedgerError::InsufficientBalance(_)) => {
                return Err(GenerationError::InsufficientCredit)
            }
            Err(e) => return Err(GenerationError::Ledger(e)),
        };

        // Fresh key per debited attempt; a refunded retry is a new charge
        // and must not be deduped upstream.
        let idempotency_key = Uuid::new_v4().to_string();

        match self.generator.generate(prompt, &idempotency_key).await {
            Ok(image) => {
                info!(
                    account_id,
                    bytes = image.bytes.len(),
                    "image generated"
                );
                let data_url = format!(
                    "data:{};base64,{}",
                    image.content_type,
                    BASE64.encode(&image.bytes)
                );
                Ok(GenerateImageResponse {
                    image: data_url,
                    credit_balance: balance_after_debit,
                })
            }
            Err(upstream_err) => {
                let kind = classify_failure(&upstream_err);
                warn!(account_id, %upstream_err, "generation failed upstream, refunding credit");

                let (credit_refunded, credit_balance) =
                    match self.ledger.refund(account_id, 1).await {
                        Ok(balance) => (true, Some(balance)),
                        Err(refund_err) => {
                            // Keep the upstream failure as the outcome; the
                            // stuck refund is an operator problem.
                            error!(
                                account_id,
                                %refund_err,
                                "refund after failed generation did not apply"
                            );
                            (false, None)
                        }
                    };

                Err(GenerationError::Upstream {
                    kind,
                    credit_refunded,
                    credit_balance,
                })
            }
        }
    }
}

/// Reject empty or oversized prompts before touching the ledger.
fn validate_prompt(prompt: &str) -> Result<&str, GenerationError> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err(GenerationError::InvalidInput(
            "Prompt must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_PROMPT_CHARS {
        return Err(GenerationError::InvalidInput(format!(
            "Prompt must be at most {MAX_PROMPT_CHARS} characters"
        )));
    }
    Ok(trimmed)
}

/// Map the transport-level failure to the upstream taxonomy the API
/// reports to users.
fn classify_failure(err: &GeneratorError) -> UpstreamFailure {
    match err {
        GeneratorError::Timeout => UpstreamFailure::Timeout,
        GeneratorError::Status { status: 400, .. } => UpstreamFailure::InvalidPrompt,
        GeneratorError::Status {
            status: 401 | 403, ..
        } => UpstreamFailure::ServiceUnavailable,
        GeneratorError::Status { .. } | GeneratorError::TooLarge { .. } => {
            UpstreamFailure::GenerationFailed
        }
        GeneratorError::Network(_) => UpstreamFailure::GenerationFailed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::GeneratedImage;
    use pixify_common::BoxFuture;
    use pixify_db::{Account, AccountRepository, DbError, NewAccount};
    use std::collections::HashMap;
    use std::sync::Mutex;

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

    impl AccountRepository for MemoryAccounts {
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

    /// Scripted generator returning a fixed outcome per call.
    struct FakeGenerator {
        outcome: Mutex<Option<Result<GeneratedImage, GeneratorError>>>,
        calls: Mutex<u32>,
    }

    impl FakeGenerator {
        fn succeeding() -> Arc<Self> {
            Arc::new(Self {
                outcome: Mutex::new(Some(Ok(GeneratedImage {
                    bytes: vec![0x89, 0x50, 0x4e, 0x47],
                    content_type: "image/png".into(),
                }))),
                calls: Mutex::new(0),
            })
        }

        fn failing(err: GeneratorError) -> Arc<Self> {
            Arc::new(Self {
                outcome: Mutex::new(Some(Err(err))),
                calls: Mutex::new(0),
            })
        }

        fn call_count(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    impl ImageGenerator for FakeGenerator {
        fn generate(
            &self,
            _prompt: &str,
            _idempotency_key: &str,
        ) -> BoxFuture<'_, GeneratedImage, GeneratorError> {
            Box::pin(async move {
                *self.calls.lock().unwrap() += 1;
                self.outcome
                    .lock()
                    .unwrap()
                    .take()
                    .expect("generator called more than scripted")
            })
        }
    }

    fn orchestrator(
        repo: &Arc<MemoryAccounts>,
        generator: Arc<FakeGenerator>,
    ) -> GenerationOrchestrator {
        GenerationOrchestrator::new(CreditLedger::new(repo.clone()), generator)
    }

    fn request(prompt: &str) -> GenerateImageRequest {
        GenerateImageRequest {
            prompt: prompt.to_string(),
        }
    }

    #[tokio::test]
    async fn success_costs_exactly_one_credit() {
        let repo = MemoryAccounts::with_account("a1", 5);
        let orch = orchestrator(&repo, FakeGenerator::succeeding());

        let resp = orch.generate("a1", &request("a cat")).await.unwrap();
        assert_eq!(resp.credit_balance, 4);
        assert_eq!(repo.balance("a1"), 4);
        assert!(resp.image.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn upstream_rejection_refunds_the_debit() {
        let repo = MemoryAccounts::with_account("a1", 5);
        let orch = orchestrator(
            &repo,
            FakeGenerator::failing(GeneratorError::Status {
                status: 400,
                message: "bad prompt".into(),
            }),
        );

        let err = orch.generate("a1", &request("a cat")).await.unwrap_err();
        match err {
            GenerationError::Upstream {
                kind,
                credit_refunded,
                credit_balance,
            } => {
                assert_eq!(kind, UpstreamFailure::InvalidPrompt);
                assert!(credit_refunded);
                assert_eq!(credit_balance, Some(5));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(repo.balance("a1"), 5);
    }

    #[tokio::test]
    async fn timeout_maps_to_timeout_failure() {
        let repo = MemoryAccounts::with_account("a1", 3);
        let orch = orchestrator(&repo, FakeGenerator::failing(GeneratorError::Timeout));

        let err = orch.generate("a1", &request("a cat")).await.unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Upstream {
                kind: UpstreamFailure::Timeout,
                credit_refunded: true,
                ..
            }
        ));
        assert_eq!(repo.balance("a1"), 3);
    }

    #[tokio::test]
    async fn zero_balance_never_calls_upstream() {
        let repo = MemoryAccounts::with_account("a1", 0);
        let generator = FakeGenerator::succeeding();
        let orch = orchestrator(&repo, generator.clone());

        let err = orch.generate("a1", &request("a cat")).await.unwrap_err();
        assert!(matches!(err, GenerationError::InsufficientCredit));
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn blank_prompt_rejected_before_debit() {
        let repo = MemoryAccounts::with_account("a1", 5);
        let generator = FakeGenerator::succeeding();
        let orch = orchestrator(&repo, generator.clone());

        let err = orch.generate("a1", &request("   ")).await.unwrap_err();
        assert!(matches!(err, GenerationError::InvalidInput(_)));
        assert_eq!(repo.balance("a1"), 5);
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn prompt_length_boundary() {
        let repo = MemoryAccounts::with_account("a1", 5);
        let orch = orchestrator(&repo, FakeGenerator::succeeding());

        let at_limit = "x".repeat(MAX_PROMPT_CHARS);
        assert!(orch.generate("a1", &request(&at_limit)).await.is_ok());

        let over_limit = "x".repeat(MAX_PROMPT_CHARS + 1);
        let err = orch
            .generate("a1", &request(&over_limit))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::InvalidInput(_)));
    }
}
