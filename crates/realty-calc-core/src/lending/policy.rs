use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::RealtyCalcError;
use crate::form::FormData;
use crate::policy::{LendingPolicy, LoanType, LtvDti, PolicyConfig, Region};
use crate::types::{check_amount, with_metadata, ComputationOutput, Money, Rate};
use crate::RealtyCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanPolicyInput {
    pub price: Money,
    #[serde(default)]
    pub region: Region,
    #[serde(default)]
    pub loan_type: LoanType,
    #[serde(default)]
    pub is_first_time: bool,
    #[serde(default)]
    pub has_multiple_properties: bool,
}

impl LoanPolicyInput {
    pub fn from_form(form: &FormData) -> RealtyCalcResult<Self> {
        Ok(LoanPolicyInput {
            price: form.amount("price")?,
            region: parse_region(form.get("region"))?,
            loan_type: parse_loan_type(form.get("loan_type"))?,
            is_first_time: form.flag("first_time")?,
            has_multiple_properties: form.flag("multiple_properties")?,
        })
    }
}

/// Which buyer adjustment moved the table ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuyerAdjustment {
    None,
    FirstTimeBonus,
    MultiPropertyPenalty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanPolicyOutput {
    /// Ratios straight from the region × price table
    pub table_ratios: LtvDti,
    pub adjustment: BuyerAdjustment,
    /// Ratios after the buyer adjustment
    pub ltv: Rate,
    pub dti: Rate,
    pub dsr_ceiling: Rate,
    /// Market base rate for the loan type and region
    pub base_rate: Rate,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// LTV, DTI and DSR limits for a purchase under the default policy.
pub fn calculate_ltv_dti(
    input: &LoanPolicyInput,
) -> RealtyCalcResult<ComputationOutput<LoanPolicyOutput>> {
    calculate_ltv_dti_with_policy(input, &PolicyConfig::default())
}

pub fn calculate_ltv_dti_with_policy(
    input: &LoanPolicyInput,
    policy: &PolicyConfig,
) -> RealtyCalcResult<ComputationOutput<LoanPolicyOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.price <= Decimal::ZERO {
        return Err(RealtyCalcError::out_of_range(
            "price",
            "Property price must be positive",
        ));
    }
    check_amount("price", input.price)?;

    let output = select_loan_policy(input, &policy.lending, &mut warnings);
    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "LTV/DTI selection (region × price table, buyer adjustment)",
        input,
        warnings,
        elapsed,
        output,
    )
    .with_policy_year(policy.year))
}

/// Pick table ratios for the region and price, then apply the buyer adjustment.
///
/// The first-time bonus and the multi-property penalty are exclusive. A buyer
/// flagged as both gets the penalty and a warning.
pub fn select_loan_policy(
    input: &LoanPolicyInput,
    policy: &LendingPolicy,
    warnings: &mut Vec<String>,
) -> LoanPolicyOutput {
    let table_ratios = *policy.table_for(input.region).lookup(input.price);
    let mut ltv = table_ratios.ltv;
    let mut dti = table_ratios.dti;

    let adjustment = if input.has_multiple_properties {
        if input.is_first_time {
            warnings.push(
                "Buyer is flagged as both first-time and multi-property; \
                 the multi-property penalty was applied and the first-time bonus skipped"
                    .into(),
            );
        }
        ltv = (ltv - policy.multi_property_penalty).max(policy.multi_property_floor.ltv);
        dti = (dti - policy.multi_property_penalty).max(policy.multi_property_floor.dti);
        BuyerAdjustment::MultiPropertyPenalty
    } else if input.is_first_time {
        ltv = (ltv + policy.first_time_bonus).min(policy.first_time_cap.ltv);
        dti = (dti + policy.first_time_bonus).min(policy.first_time_cap.dti);
        BuyerAdjustment::FirstTimeBonus
    } else {
        BuyerAdjustment::None
    };

    let base_rate = policy.base_rates.for_loan(input.loan_type, input.region);

    tracing::debug!(
        region = ?input.region,
        price = %input.price,
        ?adjustment,
        %ltv,
        %dti,
        "selected lending policy"
    );

    LoanPolicyOutput {
        table_ratios,
        adjustment,
        ltv,
        dti,
        dsr_ceiling: policy.dsr_ceiling,
        base_rate,
    }
}

pub(crate) fn parse_region(raw: Option<&str>) -> RealtyCalcResult<Region> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("regulated") => Ok(Region::Regulated),
        Some("non-regulated") | Some("non_regulated") | Some("nonregulated") => {
            Ok(Region::NonRegulated)
        }
        Some(other) => Err(RealtyCalcError::out_of_range(
            "region",
            format!("unknown region {other:?}; expected regulated or non-regulated"),
        )),
    }
}

pub(crate) fn parse_loan_type(raw: Option<&str>) -> RealtyCalcResult<LoanType> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("mortgage") => Ok(LoanType::Mortgage),
        Some("jeonse") => Ok(LoanType::Jeonse),
        Some("credit") => Ok(LoanType::Credit),
        Some(other) => Err(RealtyCalcError::out_of_range(
            "loan_type",
            format!("unknown loan type {other:?}; expected mortgage, jeonse or credit"),
        )),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
