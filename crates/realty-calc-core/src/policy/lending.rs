use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::tiers::TierTable;
use super::check_fraction;
use crate::error::RealtyCalcError;
use crate::types::Rate;
use crate::RealtyCalcResult;

/// Whether the property sits in a speculation-regulated area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    #[default]
    Regulated,
    #[serde(alias = "non-regulated")]
    NonRegulated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanType {
    /// Home-secured mortgage
    #[default]
    Mortgage,
    /// Loan against a lump-sum lease deposit
    Jeonse,
    /// Unsecured credit loan
    Credit,
}

/// LTV and DTI ceilings, both as fractions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LtvDti {
    pub ltv: Rate,
    pub dti: Rate,
}

impl LtvDti {
    pub const fn new(ltv: Rate, dti: Rate) -> Self {
        LtvDti { ltv, dti }
    }
}

/// Market base rate per loan type, used when no custom rate is supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseRates {
    pub mortgage_regulated: Rate,
    pub mortgage_non_regulated: Rate,
    pub jeonse: Rate,
    pub credit: Rate,
}

impl BaseRates {
    pub fn for_loan(&self, loan_type: LoanType, region: Region) -> Rate {
        match (loan_type, region) {
            (LoanType::Mortgage, Region::Regulated) => self.mortgage_regulated,
            (LoanType::Mortgage, Region::NonRegulated) => self.mortgage_non_regulated,
            (LoanType::Jeonse, _) => self.jeonse,
            (LoanType::Credit, _) => self.credit,
        }
    }
}

/// Upper DSR bounds of the recommendation bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskBands {
    pub safe: Rate,
    pub moderate: Rate,
    pub risky: Rate,
}

/// Mortgage lending rules: LTV/DTI by region and price, buyer adjustments,
/// DSR ceiling and the fixed shares used for funding plans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LendingPolicy {
    pub regulated: TierTable<LtvDti>,
    pub non_regulated: TierTable<LtvDti>,
    /// Percentage-point increase for first-time buyers
    pub first_time_bonus: Rate,
    pub first_time_cap: LtvDti,
    /// Percentage-point decrease for owners of multiple properties
    pub multi_property_penalty: Rate,
    pub multi_property_floor: LtvDti,
    pub dsr_ceiling: Rate,
    pub base_rates: BaseRates,
    /// Annual mortgage insurance premium as a share of the loan
    pub insurance_rate: Rate,
    pub down_payment_share: Rate,
    pub intermediate_payment_share: Rate,
    /// Flat estimate of acquisition costs as a share of price
    pub purchase_cost_rate: Rate,
    pub risk_bands: RiskBands,
}

impl Default for LendingPolicy {
    fn default() -> Self {
        LendingPolicy {
            regulated: TierTable::new(
                LtvDti::new(dec!(0.6), dec!(0.4)),
                vec![
                    (dec!(900_000_000), LtvDti::new(dec!(0.5), dec!(0.4))),
                    (dec!(1_500_000_000), LtvDti::new(dec!(0.4), dec!(0.3))),
                ],
            ),
            non_regulated: TierTable::new(
                LtvDti::new(dec!(0.7), dec!(0.4)),
                vec![(dec!(600_000_000), LtvDti::new(dec!(0.6), dec!(0.4)))],
            ),
            first_time_bonus: dec!(0.1),
            first_time_cap: LtvDti::new(dec!(0.8), dec!(0.6)),
            multi_property_penalty: dec!(0.1),
            multi_property_floor: LtvDti::new(dec!(0.3), dec!(0.3)),
            dsr_ceiling: dec!(0.4),
            base_rates: BaseRates {
                mortgage_regulated: dec!(0.048),
                mortgage_non_regulated: dec!(0.045),
                jeonse: dec!(0.042),
                credit: dec!(0.065),
            },
            insurance_rate: dec!(0.002),
            down_payment_share: dec!(0.1),
            intermediate_payment_share: dec!(0.1),
            purchase_cost_rate: dec!(0.025),
            risk_bands: RiskBands {
                safe: dec!(0.3),
                moderate: dec!(0.4),
                risky: dec!(0.6),
            },
        }
    }
}

impl LendingPolicy {
    pub fn table_for(&self, region: Region) -> &TierTable<LtvDti> {
        match region {
            Region::Regulated => &self.regulated,
            Region::NonRegulated => &self.non_regulated,
        }
    }

    pub fn validate(&self) -> RealtyCalcResult<()> {
        self.regulated.validate("lending.regulated")?;
        self.non_regulated.validate("lending.non_regulated")?;
        for ratios in self.regulated.values().chain(self.non_regulated.values()) {
            check_ratios("lending ltv/dti table", ratios)?;
        }
        check_ratios("lending.first_time_cap", &self.first_time_cap)?;
        check_ratios("lending.multi_property_floor", &self.multi_property_floor)?;
        check_fraction("lending.first_time_bonus", self.first_time_bonus)?;
        check_fraction("lending.multi_property_penalty", self.multi_property_penalty)?;
        check_fraction("lending.dsr_ceiling", self.dsr_ceiling)?;
        if self.dsr_ceiling.is_zero() {
            return Err(RealtyCalcError::InvalidPolicy(
                "lending.dsr_ceiling must be positive".into(),
            ));
        }
        for rate in [
            self.base_rates.mortgage_regulated,
            self.base_rates.mortgage_non_regulated,
            self.base_rates.jeonse,
            self.base_rates.credit,
        ] {
            check_fraction("lending.base_rates", rate)?;
        }
        check_fraction("lending.insurance_rate", self.insurance_rate)?;
        check_fraction("lending.down_payment_share", self.down_payment_share)?;
        check_fraction(
            "lending.intermediate_payment_share",
            self.intermediate_payment_share,
        )?;
        check_fraction("lending.purchase_cost_rate", self.purchase_cost_rate)?;

        let bands = &self.risk_bands;
        if !(bands.safe <= bands.moderate && bands.moderate <= bands.risky) {
            return Err(RealtyCalcError::InvalidPolicy(
                "lending.risk_bands must be ascending (safe <= moderate <= risky)".into(),
            ));
        }
        Ok(())
    }
}

fn check_ratios(name: &str, ratios: &LtvDti) -> RealtyCalcResult<()> {
    check_fraction(name, ratios.ltv)?;
    check_fraction(name, ratios.dti)?;
    if ratios.dti.is_zero() && ratios.ltv > Decimal::ZERO {
        tracing::warn!(table = name, "DTI ceiling of zero blocks every loan");
    }
    Ok(())
}
