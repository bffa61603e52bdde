// --- File: crates/pixify_checkout/src/plans.rs ---
//! The credit plan table.

use serde::{Deserialize, Serialize};

/// The purchasable credit bundles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Plan {
    Basic,
    Advanced,
    Business,
}

impl Plan {
    /// Parse the client-supplied plan id.
    pub fn parse(id: &str) -> Option<Self> {
        match id {
            "Basic" => Some(Plan::Basic),
            "Advanced" => Some(Plan::Advanced),
            "Business" => Some(Plan::Business),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Basic => "Basic",
            Plan::Advanced => "Advanced",
            Plan::Business => "Business",
        }
    }

    /// Credits granted when a payment for this plan completes.
    pub fn credits(&self) -> i64 {
        match self {
            Plan::Basic => 100,
            Plan::Advanced => 500,
            Plan::Business => 5000,
        }
    }

    /// Price in whole currency units. Gateways take minor units; multiply
    /// by 100 at the order-create boundary, not here.
    pub fn amount(&self) -> i64 {
        match self {
            Plan::Basic => 10,
            Plan::Advanced => 50,
            Plan::Business => 250,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_table() {
        assert_eq!(Plan::parse("Basic"), Some(Plan::Basic));
        assert_eq!(Plan::Basic.credits(), 100);
        assert_eq!(Plan::Basic.amount(), 10);
        assert_eq!(Plan::Advanced.credits(), 500);
        assert_eq!(Plan::Advanced.amount(), 50);
        assert_eq!(Plan::Business.credits(), 5000);
        assert_eq!(Plan::Business.amount(), 250);
    }

    #[test]
    fn unknown_plan_rejected() {
        assert_eq!(Plan::parse("Enterprise"), None);
        assert_eq!(Plan::parse("basic"), None);
    }
}
