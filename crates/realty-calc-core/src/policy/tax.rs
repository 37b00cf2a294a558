use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::tiers::TierTable;
use super::{check_fraction, check_non_negative};
use crate::types::{Money, Rate};
use crate::RealtyCalcResult;

/// Acquisition-tax and closing-cost rules for a home purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseCostPolicy {
    /// Acquisition-tax rate by purchase price
    pub acquisition_rates: TierTable<Rate>,
    /// Rate applied to first-home buyers at or below `first_home_price_cap`
    pub first_home_rate: Rate,
    pub first_home_price_cap: Money,
    /// Multiplier on the acquisition rate for buyers who already own homes
    pub multiple_homes_multiplier: Decimal,
    /// Registration tax as a share of acquisition tax
    pub registration_tax_share: Rate,
    /// Local education tax as a share of acquisition tax
    pub education_tax_share: Rate,
    /// Flat stamp duty by purchase price
    pub stamp_tax: TierTable<Money>,
    pub brokerage_rate: Rate,
    /// Online registration, appraisal and similar fixed costs
    pub misc_fees: Money,
}

impl Default for PurchaseCostPolicy {
    fn default() -> Self {
        PurchaseCostPolicy {
            acquisition_rates: TierTable::new(
                dec!(0.01),
                vec![
                    (dec!(600_000_000), dec!(0.02)),
                    (dec!(900_000_000), dec!(0.03)),
                    (dec!(1_200_000_000), dec!(0.04)),
                ],
            ),
            first_home_rate: dec!(0.01),
            first_home_price_cap: dec!(900_000_000),
            multiple_homes_multiplier: dec!(1.2),
            registration_tax_share: dec!(0.2),
            education_tax_share: dec!(0.2),
            stamp_tax: TierTable::new(
                Decimal::ZERO,
                vec![
                    (dec!(10_000_000), dec!(7_000)),
                    (dec!(100_000_000), dec!(35_000)),
                    (dec!(1_000_000_000), dec!(70_000)),
                ],
            ),
            brokerage_rate: dec!(0.006),
            misc_fees: dec!(200_000),
        }
    }
}

impl PurchaseCostPolicy {
    pub fn validate(&self) -> RealtyCalcResult<()> {
        self.acquisition_rates.validate("purchase_cost.acquisition_rates")?;
        self.stamp_tax.validate("purchase_cost.stamp_tax")?;
        for rate in self.acquisition_rates.values() {
            check_fraction("purchase_cost.acquisition_rates", *rate)?;
        }
        for amount in self.stamp_tax.values() {
            check_non_negative("purchase_cost.stamp_tax", *amount)?;
        }
        check_fraction("purchase_cost.first_home_rate", self.first_home_rate)?;
        check_non_negative("purchase_cost.first_home_price_cap", self.first_home_price_cap)?;
        check_non_negative(
            "purchase_cost.multiple_homes_multiplier",
            self.multiple_homes_multiplier,
        )?;
        check_fraction("purchase_cost.registration_tax_share", self.registration_tax_share)?;
        check_fraction("purchase_cost.education_tax_share", self.education_tax_share)?;
        check_fraction("purchase_cost.brokerage_rate", self.brokerage_rate)?;
        check_non_negative("purchase_cost.misc_fees", self.misc_fees)
    }
}
