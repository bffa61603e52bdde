// --- File: crates/pixify_checkout/src/logic.rs ---
//! Core checkout logic: order creation and payment verification.
//!
//! Order creation writes the pending transaction before calling the
//! gateway, so a verified payment can always be matched to a local record.
//! Verification is idempotent end to end: the status transition and the
//! credit grant are each gated by their own conditional update.

use crate::error::CheckoutError;
use crate::gateway::PaymentGateway;
use crate::plans::Plan;
use crate::signature::verify_payment_signature;
use pixify_db::{NewTransaction, TransactionRepository, TransactionStatus};
use pixify_ledger::CreditLedger;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Request body for order creation.
#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateOrderRequest {
    /// Plan id: "Basic", "Advanced" or "Business"
    pub plan_id: String,
}

/// Order handed back to the client-side payment widget.
#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateOrderResponse {
    pub order_id: String,
    /// Charge amount in minor currency units
    pub amount: i64,
    pub currency: String,
    pub credits: i64,
    /// Publishable gateway key id the widget initializes with
    pub key_id: String,
}

/// Request body for payment verification.
#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct VerifyPaymentRequest {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

/// Result of a successful (or repeated) verification.
#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct VerifyPaymentResponse {
    pub credits: i64,
    /// Balance after the grant; absent when this call repeated an already
    /// credited verification
    pub credit_balance: Option<i64>,
    /// True when the credits were already granted by an earlier call
    pub already_credited: bool,
}

/// Orchestrates credit purchases against the gateway and the ledger.
#[derive(Clone)]
pub struct CheckoutOrchestrator {
    transactions: Arc<dyn TransactionRepository>,
    ledger: CreditLedger,
    gateway: Arc<dyn PaymentGateway>,
    key_id: String,
    key_secret: String,
    currency: String,
}

impl CheckoutOrchestrator {
    pub fn new(
        transactions: Arc<dyn TransactionRepository>,
        ledger: CreditLedger,
        gateway: Arc<dyn PaymentGateway>,
        key_id: String,
        key_secret: String,
        currency: String,
    ) -> Self {
        Self {
            transactions,
            ledger,
            gateway,
            key_id,
            key_secret,
            currency,
        }
    }

    /// Create a gateway order for a plan purchase.
    ///
    /// The pending transaction is written first; if the gateway call fails
    /// it is deleted again so no pending record outlives a failed order.
    pub async fn create_order(
        &self,
        account_id: &str,
        request: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse, CheckoutError> {
        let Some(plan) = Plan::parse(&request.plan_id) else {
            return Err(CheckoutError::InvalidPlan(request.plan_id.clone()));
        };

        let transaction = self
            .transactions
            .create(NewTransaction {
                account_id: account_id.to_string(),
                plan: plan.as_str().to_string(),
                amount: plan.amount(),
                credits: plan.credits(),
            })
            .await?;

        // Gateways charge in minor units
        let amount_minor = plan.amount() * 100;

        let order = match self
            .gateway
            .create_order(amount_minor, &self.currency, &transaction.id)
            .await
        {
            Ok(order) => order,
            Err(gateway_err) => {
                warn!(
                    transaction_id = %transaction.id,
                    %gateway_err,
                    "gateway order creation failed, deleting pending transaction"
                );
                if let Err(delete_err) = self.transactions.delete(&transaction.id).await {
                    error!(
                        transaction_id = %transaction.id,
                        %delete_err,
                        "failed to delete orphaned pending transaction"
                    );
                }
                return Err(CheckoutError::PaymentGatewayError(gateway_err.to_string()));
            }
        };

        self.transactions
            .set_order_id(&transaction.id, &order.id)
            .await?;

        info!(
            transaction_id = %transaction.id,
            order_id = %order.id,
            plan = plan.as_str(),
            "order created"
        );

        Ok(CreateOrderResponse {
            order_id: order.id,
            amount: amount_minor,
            currency: self.currency.clone(),
            credits: plan.credits(),
            key_id: self.key_id.clone(),
        })
    }

    /// Verify a completed payment and grant the purchased credits.
    ///
    /// Safe to call any number of times for the same order: the status
    /// transition is conditional on `pending` and the grant is gated by the
    /// one-time `credited` claim. A re-run after a crash between the two
    /// updates still performs the grant.
    pub async fn verify_payment(
        &self,
        account_id: &str,
        request: &VerifyPaymentRequest,
    ) -> Result<VerifyPaymentResponse, CheckoutError> {
        if !verify_payment_signature(
            &request.order_id,
            &request.payment_id,
            &request.signature,
            &self.key_secret,
        ) {
            warn!(order_id = %request.order_id, "payment signature mismatch");
            return Err(CheckoutError::VerificationFailed);
        }

        let Some(transaction) = self
            .transactions
            .find_by_account_and_order(account_id, &request.order_id)
            .await?
        else {
            return Err(CheckoutError::TransactionNotFound);
        };

        if transaction.status == TransactionStatus::Completed && transaction.credited {
            return Ok(VerifyPaymentResponse {
                credits: transaction.credits,
                credit_balance: None,
                already_credited: true,
            });
        }

        // Conditional on pending; a second verifier racing here simply
        // matches no row and moves on to the credited gate.
        self.transactions
            .mark_completed(&transaction.id, &request.payment_id, &request.signature)
            .await?;

        if !self.transactions.claim_credit(&transaction.id).await? {
            return Ok(VerifyPaymentResponse {
                credits: transaction.credits,
                credit_balance: None,
                already_credited: true,
            });
        }

        // The claim is consumed; from here the grant must land.
        let balance = self
            .ledger
            .grant(account_id, transaction.credits)
            .await
            .map_err(|e| {
                error!(
                    transaction_id = %transaction.id,
                    %e,
                    "credit grant failed after claiming credited flag"
                );
                CheckoutError::Ledger(e)
            })?;

        info!(
            transaction_id = %transaction.id,
            credits = transaction.credits,
            balance,
            "payment verified, credits granted"
        );

        Ok(VerifyPaymentResponse {
            credits: transaction.credits,
            credit_balance: Some(balance),
            already_credited: false,
        })
    }
}
