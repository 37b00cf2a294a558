//! Policy tables: every jurisdiction- and year-specific constant the
//! calculators use, as data.
//!
//! [`PolicyConfig::default`] carries the 2024 rules. Any table can be replaced
//! by deserializing a [`PolicyConfig`] (or one of its sections) from JSON; call
//! [`PolicyConfig::validate`] before handing an externally supplied policy to a
//! calculator.

pub mod lending;
pub mod subscription;
pub mod tax;
pub mod tiers;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::RealtyCalcError;
use crate::RealtyCalcResult;

pub use lending::{BaseRates, LendingPolicy, LoanType, LtvDti, Region, RiskBands};
pub use subscription::SubscriptionPolicy;
pub use tax::PurchaseCostPolicy;
pub use tiers::{BandTable, ScoreBand, Tier, TierTable};

pub const DEFAULT_POLICY_YEAR: u16 = 2024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub year: u16,
    pub purchase_cost: PurchaseCostPolicy,
    pub lending: LendingPolicy,
    pub subscription: SubscriptionPolicy,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        PolicyConfig {
            year: DEFAULT_POLICY_YEAR,
            purchase_cost: PurchaseCostPolicy::default(),
            lending: LendingPolicy::default(),
            subscription: SubscriptionPolicy::default(),
        }
    }
}

impl PolicyConfig {
    /// Parse and validate a policy document. Missing sections keep their defaults.
    pub fn from_json_str(json: &str) -> RealtyCalcResult<Self> {
        let policy: PolicyConfig = serde_json::from_str(json)?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> RealtyCalcResult<()> {
        self.purchase_cost.validate()?;
        self.lending.validate()?;
        self.subscription.validate()?;
        tracing::debug!(year = self.year, "policy tables validated");
        Ok(())
    }
}

pub(crate) fn check_fraction(name: &str, value: Decimal) -> RealtyCalcResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(RealtyCalcError::InvalidPolicy(format!(
            "{name}: {value} must be a fraction between 0 and 1"
        )));
    }
    Ok(())
}

pub(crate) fn check_non_negative(name: &str, value: Decimal) -> RealtyCalcResult<()> {
    if value < Decimal::ZERO {
        return Err(RealtyCalcError::InvalidPolicy(format!(
            "{name}: {value} cannot be negative"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_policy_is_valid() {
        assert!(PolicyConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let json = r#"{ "year": 2025, "lending": {
            "regulated": { "base": { "ltv": "0.5", "dti": "0.4" } },
            "non_regulated": { "base": { "ltv": "0.7", "dti": "0.4" } },
            "first_time_bonus": "0.1",
            "first_time_cap": { "ltv": "0.8", "dti": "0.6" },
            "multi_property_penalty": "0.1",
            "multi_property_floor": { "ltv": "0.3", "dti": "0.3" },
            "dsr_ceiling": "0.35",
            "base_rates": { "mortgage_regulated": "0.05", "mortgage_non_regulated": "0.045",
                            "jeonse": "0.042", "credit": "0.065" },
            "insurance_rate": "0.002",
            "down_payment_share": "0.1",
            "intermediate_payment_share": "0.1",
            "purchase_cost_rate": "0.025",
            "risk_bands": { "safe": "0.3", "moderate": "0.35", "risky": "0.6" }
        } }"#;
        let policy = PolicyConfig::from_json_str(json).unwrap();
        assert_eq!(policy.year, 2025);
        assert_eq!(policy.lending.dsr_ceiling, dec!(0.35));
        assert!(policy.lending.regulated.tiers.is_empty());
        assert_eq!(policy.purchase_cost, PurchaseCostPolicy::default());
    }

    #[test]
    fn test_rate_above_one_rejected() {
        let mut policy = PolicyConfig::default();
        policy.purchase_cost.brokerage_rate = dec!(1.5);
        assert!(matches!(
            policy.validate(),
            Err(RealtyCalcError::InvalidPolicy(_))
        ));
    }

    #[test]
    fn test_inverted_priority_thresholds_rejected() {
        let mut policy = PolicyConfig::default();
        policy.subscription.medium_priority_score = 80;
        assert!(policy.validate().is_err());
    }
}
