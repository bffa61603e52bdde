//! Credit ledger service for Pixify
//!
//! Every change to an account's credit balance goes through this crate:
//! the single-credit debit taken before a generation call, the compensating
//! refund when that call fails, and the grant that finishes a verified
//! payment. The underlying guarantees come from the account repository's
//! conditional updates; this crate adds the business vocabulary and the
//! unknown-account/insufficient-balance distinction.

pub mod error;
pub mod service;

pub use error::LedgerError;
pub use service::CreditLedger;
