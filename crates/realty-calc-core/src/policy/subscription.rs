use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::check_non_negative;
use super::tiers::{BandTable, ScoreBand};
use crate::error::RealtyCalcError;
use crate::types::Money;
use crate::RealtyCalcResult;

/// Housing-subscription rubric: hard limits, point bands and penalties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionPolicy {
    pub min_age: u32,
    pub max_age: u32,
    pub income_ceiling: Money,
    pub asset_ceiling: Money,
    pub age_points: BandTable,
    pub income_points: BandTable,
    pub asset_points: BandTable,
    pub married_points: i32,
    pub single_points: i32,
    /// Only awarded to married applicants
    pub per_child_points: i32,
    pub property_penalty: i32,
    pub prior_application_penalty: i32,
    pub high_priority_score: u32,
    pub medium_priority_score: u32,
    /// Single applicants at or above this age are advised that marriage raises priority
    pub marriage_advice_age: u32,
}

impl Default for SubscriptionPolicy {
    fn default() -> Self {
        SubscriptionPolicy {
            min_age: 19,
            max_age: 60,
            income_ceiling: dec!(60_000_000),
            asset_ceiling: dec!(300_000_000),
            age_points: BandTable {
                bands: vec![
                    ScoreBand::between(dec!(30), dec!(40), 20),
                    ScoreBand::between(dec!(25), dec!(45), 15),
                ],
                fallback: 10,
            },
            income_points: BandTable {
                bands: vec![
                    ScoreBand::between(dec!(20_000_000), dec!(40_000_000), 20),
                    ScoreBand::between(dec!(15_000_000), dec!(50_000_000), 15),
                ],
                fallback: 10,
            },
            asset_points: BandTable {
                bands: vec![
                    ScoreBand::up_to(dec!(100_000_000), 20),
                    ScoreBand::up_to(dec!(200_000_000), 15),
                ],
                fallback: 10,
            },
            married_points: 15,
            single_points: 5,
            per_child_points: 5,
            property_penalty: 30,
            prior_application_penalty: 10,
            high_priority_score: 70,
            medium_priority_score: 50,
            marriage_advice_age: 30,
        }
    }
}

impl SubscriptionPolicy {
    pub fn validate(&self) -> RealtyCalcResult<()> {
        if self.min_age > self.max_age {
            return Err(RealtyCalcError::InvalidPolicy(format!(
                "subscription: min_age {} exceeds max_age {}",
                self.min_age, self.max_age
            )));
        }
        check_non_negative("subscription.income_ceiling", self.income_ceiling)?;
        check_non_negative("subscription.asset_ceiling", self.asset_ceiling)?;
        self.age_points.validate("subscription.age_points")?;
        self.income_points.validate("subscription.income_points")?;
        self.asset_points.validate("subscription.asset_points")?;
        if self.property_penalty < 0 || self.prior_application_penalty < 0 {
            return Err(RealtyCalcError::InvalidPolicy(
                "subscription penalties are deducted and must be non-negative".into(),
            ));
        }
        if self.medium_priority_score > self.high_priority_score {
            return Err(RealtyCalcError::InvalidPolicy(format!(
                "subscription: medium priority score {} exceeds high priority score {}",
                self.medium_priority_score, self.high_priority_score
            )));
        }
        Ok(())
    }
}
