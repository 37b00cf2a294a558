use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::policy::{
    parse_loan_type, parse_region, select_loan_policy, LoanPolicyInput, LoanPolicyOutput,
};
use super::{dsr, RiskLevel};
use crate::amortization;
use crate::error::RealtyCalcError;
use crate::form::FormData;
use crate::policy::{LendingPolicy, LoanType, PolicyConfig, Region};
use crate::types::{check_amount, with_metadata, ComputationOutput, Money, Rate};
use crate::RealtyCalcResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);
const DEFAULT_TERM_YEARS: u32 = 30;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanInput {
    /// Purchase price (or jeonse deposit for jeonse loans)
    pub price: Money,
    pub annual_income: Money,
    #[serde(default)]
    pub existing_debt: Money,
    #[serde(default)]
    pub existing_monthly_payment: Money,
    #[serde(default)]
    pub region: Region,
    #[serde(default)]
    pub loan_type: LoanType,
    #[serde(default)]
    pub is_first_time: bool,
    #[serde(default)]
    pub has_multiple_properties: bool,
    #[serde(default = "default_term_years")]
    pub term_years: u32,
    /// Overrides the policy base rate when positive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_rate: Option<Rate>,
}

fn default_term_years() -> u32 {
    DEFAULT_TERM_YEARS
}

impl LoanInput {
    /// Build from raw form fields. A blank `rate` falls back to the policy rate.
    pub fn from_form(form: &FormData) -> RealtyCalcResult<Self> {
        let custom_rate = match form.get("rate").map(str::trim) {
            None | Some("") => None,
            Some(_) => Some(form.percent("rate")?),
        };
        let term_years = match form.get("term_years").map(str::trim) {
            None | Some("") => DEFAULT_TERM_YEARS,
            Some(_) => form.years("term_years")?,
        };
        Ok(LoanInput {
            price: form.amount("price")?,
            annual_income: form.amount("annual_income")?,
            existing_debt: form.optional_amount("existing_debt")?,
            existing_monthly_payment: form.optional_amount("existing_monthly_payment")?,
            region: parse_region(form.get("region"))?,
            loan_type: parse_loan_type(form.get("loan_type"))?,
            is_first_time: form.flag("first_time")?,
            has_multiple_properties: form.flag("multiple_properties")?,
            term_years,
            custom_rate,
        })
    }

    fn policy_input(&self) -> LoanPolicyInput {
        LoanPolicyInput {
            price: self.price,
            region: self.region,
            loan_type: self.loan_type,
            is_first_time: self.is_first_time,
            has_multiple_properties: self.has_multiple_properties,
        }
    }
}

/// The limit that produced the lower loan amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanConstraint {
    Ltv,
    Dti,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    Custom,
    Policy,
}

/// Cash the buyer must bring, split by payment stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingPlan {
    /// Contract deposit
    pub down_payment: Money,
    pub intermediate_payment: Money,
    /// Remainder at closing not covered by the loan
    pub balance: Money,
    /// Flat estimate of taxes and fees
    pub purchase_costs: Money,
    pub total_required_funds: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanOutput {
    pub policy: LoanPolicyOutput,
    pub applied_rate: Rate,
    pub rate_source: RateSource,
    /// price × LTV
    pub ltv_amount: Money,
    /// Principal whose payment equals income × DTI / 12
    pub dti_amount: Money,
    pub max_loan_amount: Money,
    pub binding_constraint: LoanConstraint,
    /// Monthly principal and interest on the maximum loan
    pub principal_interest: Money,
    /// Monthly mortgage insurance
    pub insurance_amount: Money,
    pub total_monthly_payment: Money,
    /// Existing debt balance plus the maximum loan
    pub total_debt: Money,
    pub dsr_ratio: Rate,
    pub dsr_limit: Rate,
    pub is_eligible: bool,
    pub funding: FundingPlan,
    /// principal_interest × months
    pub total_amount: Money,
    pub total_interest: Money,
    pub risk_level: RiskLevel,
    pub recommendation: String,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Maximum loan, repayments, DSR and required funds under the default policy.
pub fn calculate_loan(input: &LoanInput) -> RealtyCalcResult<ComputationOutput<LoanOutput>> {
    calculate_loan_with_policy(input, &PolicyConfig::default())
}

pub fn calculate_loan_with_policy(
    input: &LoanInput,
    policy: &PolicyConfig,
) -> RealtyCalcResult<ComputationOutput<LoanOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let lending = &policy.lending;
    let selected = select_loan_policy(&input.policy_input(), lending, &mut warnings);

    let (applied_rate, rate_source) = match input.custom_rate {
        Some(rate) if rate > Decimal::ZERO => (rate, RateSource::Custom),
        _ => (selected.base_rate, RateSource::Policy),
    };

    // --- Loan limit: the lower of the LTV and DTI amounts ---
    let ltv_amount = input.price * selected.ltv;
    let dti_monthly_allowance = input.annual_income * selected.dti / MONTHS_PER_YEAR;
    let dti_amount =
        amortization::principal_for_payment(dti_monthly_allowance, applied_rate, input.term_years)?;

    let (max_loan_amount, binding_constraint) = if ltv_amount <= dti_amount {
        (ltv_amount, LoanConstraint::Ltv)
    } else {
        (dti_amount, LoanConstraint::Dti)
    };

    // --- Repayment ---
    let repayment = if max_loan_amount > Decimal::ZERO {
        amortization::summarize(max_loan_amount, applied_rate, input.term_years)?
    } else {
        warnings.push("Policy ratios leave no loan capacity for this purchase".into());
        amortization::LoanSummary {
            monthly_payment: Decimal::ZERO,
            months: input.term_years * 12,
            total_payment: Decimal::ZERO,
            total_interest: Decimal::ZERO,
        }
    };

    let principal_interest = repayment.monthly_payment;
    let insurance_amount = max_loan_amount * lending.insurance_rate / MONTHS_PER_YEAR;
    let total_monthly_payment = principal_interest + insurance_amount;

    // --- DSR including existing obligations ---
    let total_monthly_debt = total_monthly_payment + input.existing_monthly_payment;
    let dsr_ratio = dsr::dsr_ratio(total_monthly_debt, input.annual_income)?;
    let is_eligible = dsr_ratio <= selected.dsr_ceiling;
    let risk_level = RiskLevel::classify(dsr_ratio, &lending.risk_bands);

    let funding = plan_funding(input.price, max_loan_amount, lending, &mut warnings);

    tracing::debug!(
        max_loan = %max_loan_amount,
        binding = ?binding_constraint,
        dsr = %dsr_ratio,
        "loan limit computed"
    );

    let output = LoanOutput {
        dsr_limit: selected.dsr_ceiling,
        policy: selected,
        applied_rate,
        rate_source,
        ltv_amount,
        dti_amount,
        max_loan_amount,
        binding_constraint,
        principal_interest,
        insurance_amount,
        total_monthly_payment,
        total_debt: input.existing_debt + max_loan_amount,
        dsr_ratio,
        is_eligible,
        funding,
        total_amount: repayment.total_payment,
        total_interest: repayment.total_interest,
        risk_level,
        recommendation: risk_level.recommendation().to_string(),
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Loan limit (min of LTV and DTI amounts) with DSR check and funding plan",
        input,
        warnings,
        elapsed,
        output,
    )
    .with_policy_year(policy.year))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn plan_funding(
    price: Money,
    loan: Money,
    policy: &LendingPolicy,
    warnings: &mut Vec<String>,
) -> FundingPlan {
    let down_payment = price * policy.down_payment_share;
    let intermediate_payment = price * policy.intermediate_payment_share;
    let uncovered = price - loan - down_payment - intermediate_payment;
    if uncovered < Decimal::ZERO {
        warnings.push(format!(
            "Loan plus staged payments exceed the price by {}; closing balance set to zero",
            -uncovered
        ));
    }
    let balance = uncovered.max(Decimal::ZERO);
    let purchase_costs = price * policy.purchase_cost_rate;

    FundingPlan {
        down_payment,
        intermediate_payment,
        balance,
        purchase_costs,
        total_required_funds: down_payment + intermediate_payment + balance + purchase_costs,
    }
}

fn validate_input(input: &LoanInput) -> RealtyCalcResult<()> {
    if input.price <= Decimal::ZERO {
        return Err(RealtyCalcError::out_of_range(
            "price",
            "Property price must be positive",
        ));
    }
    if input.annual_income <= Decimal::ZERO {
        return Err(RealtyCalcError::out_of_range(
            "annual_income",
            "Annual income must be positive",
        ));
    }
    if input.existing_debt < Decimal::ZERO {
        return Err(RealtyCalcError::out_of_range(
            "existing_debt",
            "Existing debt cannot be negative",
        ));
    }
    if input.existing_monthly_payment < Decimal::ZERO {
        return Err(RealtyCalcError::out_of_range(
            "existing_monthly_payment",
            "Existing monthly payment cannot be negative",
        ));
    }
    if input.term_years == 0 {
        return Err(RealtyCalcError::out_of_range(
            "term_years",
            "Loan term must be at least 1 year",
        ));
    }
    if input.term_years > amortization::MAX_TERM_YEARS {
        return Err(RealtyCalcError::out_of_range(
            "term_years",
            format!("Loan term cannot exceed {} years", amortization::MAX_TERM_YEARS),
        ));
    }
    check_amount("price", input.price)?;
    check_amount("annual_income", input.annual_income)?;
    check_amount("existing_debt", input.existing_debt)?;
    check_amount("existing_monthly_payment", input.existing_monthly_payment)?;
    if let Some(rate) = input.custom_rate {
        if rate < Decimal::ZERO {
            return Err(RealtyCalcError::out_of_range(
                "custom_rate",
                "Interest rate cannot be negative",
            ));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    /// 800M home in a regulated area, first-time buyer earning 80M a year.
    fn sample_input() -> LoanInput {
        LoanInput {
            price: dec!(800_000_000),
            annual_income: dec!(80_000_000),
            existing_debt: Decimal::ZERO,
            existing_monthly_payment: Decimal::ZERO,
            region: Region::Regulated,
            loan_type: LoanType::Mortgage,
            is_first_time: true,
            has_multiple_properties: false,
            term_years: 30,
            custom_rate: None,
        }
    }

    #[test]
    fn test_ltv_binds_for_high_earner() {
        let out = calculate_loan(&sample_input()).unwrap();
        let r = &out.result;
        // 60/40 table + 10pp first-time bonus = 70/50
        assert_eq!(r.policy.ltv, dec!(0.7));
        assert_eq!(r.applied_rate, dec!(0.048));
        assert_eq!(r.rate_source, RateSource::Policy);
        assert_eq!(r.ltv_amount, dec!(560_000_000));
        // 80M * 0.5 / 12 retires ≈ 635.3M at 4.8% over 30y
        assert!((r.dti_amount - dec!(635_325_604)).abs() < dec!(1));
        assert_eq!(r.max_loan_amount, dec!(560_000_000));
        assert_eq!(r.binding_constraint, LoanConstraint::Ltv);
    }

    #[test]
    fn test_repayment_and_dsr() {
        let out = calculate_loan(&sample_input()).unwrap();
        let r = &out.result;
        assert!((r.principal_interest - dec!(2_938_125.98)).abs() < dec!(0.01));
        // 560M * 0.2% / 12
        assert!((r.insurance_amount - dec!(93_333.33)).abs() < dec!(0.01));
        assert!((r.dsr_ratio - dec!(0.4547)).abs() < dec!(0.0001));
        assert!(!r.is_eligible);
        assert_eq!(r.dsr_limit, dec!(0.4));
        assert_eq!(r.risk_level, RiskLevel::Risky);
        assert!((r.total_interest - dec!(497_725_354)).abs() < dec!(1));
    }

    #[test]
    fn test_funding_plan() {
        let out = calculate_loan(&sample_input()).unwrap();
        let f = &out.result.funding;
        assert_eq!(f.down_payment, dec!(80_000_000));
        assert_eq!(f.intermediate_payment, dec!(80_000_000));
        // 800M - 560M - 160M
        assert_eq!(f.balance, dec!(80_000_000));
        assert_eq!(f.purchase_costs, dec!(20_000_000));
        assert_eq!(f.total_required_funds, dec!(260_000_000));
    }

    #[test]
    fn test_dti_binds_for_modest_income() {
        let mut input = sample_input();
        input.is_first_time = false;
        input.annual_income = dec!(40_000_000);
        let out = calculate_loan(&input).unwrap();
        let r = &out.result;
        assert_eq!(r.binding_constraint, LoanConstraint::Dti);
        assert!((r.max_loan_amount - dec!(254_130_241.74)).abs() < dec!(0.01));
        // P&I exactly uses the DTI allowance: 40M * 0.4 / 12
        assert!((r.principal_interest - dec!(1_333_333.33)).abs() < dec!(0.01));
    }

    #[test]
    fn test_custom_rate_overrides_policy() {
        let mut input = sample_input();
        input.custom_rate = Some(dec!(0.035));
        let out = calculate_loan(&input).unwrap();
        assert_eq!(out.result.applied_rate, dec!(0.035));
        assert_eq!(out.result.rate_source, RateSource::Custom);

        input.custom_rate = Some(Decimal::ZERO);
        let out = calculate_loan(&input).unwrap();
        assert_eq!(out.result.rate_source, RateSource::Policy);
    }

    #[test]
    fn test_existing_payments_raise_dsr() {
        let base = calculate_loan(&sample_input()).unwrap().result.dsr_ratio;
        let mut input = sample_input();
        input.existing_monthly_payment = dec!(500_000);
        input.existing_debt = dec!(30_000_000);
        let out = calculate_loan(&input).unwrap();
        // 500k * 12 / 80M = 0.075
        assert!((out.result.dsr_ratio - base - dec!(0.075)).abs() < dec!(0.0000001));
        assert_eq!(out.result.total_debt, dec!(590_000_000));
    }

    #[test]
    fn test_zero_capacity_policy_warns() {
        let mut policy = PolicyConfig::default();
        policy.lending.regulated.base.dti = Decimal::ZERO;
        let mut input = sample_input();
        input.is_first_time = false;
        let out = calculate_loan_with_policy(&input, &policy).unwrap();
        assert_eq!(out.result.max_loan_amount, Decimal::ZERO);
        assert_eq!(out.result.principal_interest, Decimal::ZERO);
        assert!(!out.warnings.is_empty());
    }

    #[test]
    fn test_validation_errors() {
        let mut input = sample_input();
        input.annual_income = Decimal::ZERO;
        assert_eq!(calculate_loan(&input).unwrap_err().field(), Some("annual_income"));

        let mut input = sample_input();
        input.custom_rate = Some(dec!(-0.01));
        assert_eq!(calculate_loan(&input).unwrap_err().field(), Some("custom_rate"));

        let mut input = sample_input();
        input.term_years = 0;
        assert_eq!(calculate_loan(&input).unwrap_err().field(), Some("term_years"));
    }

    #[test]
    fn test_from_form_defaults() {
        let form = FormData::new()
            .with("price", "800,000,000")
            .with("annual_income", "80,000,000")
            .with("first_time", "true")
            .with("rate", "");
        let input = LoanInput::from_form(&form).unwrap();
        assert_eq!(input.term_years, 30);
        assert_eq!(input.custom_rate, None);
        assert_eq!(input, sample_input());
    }
}
