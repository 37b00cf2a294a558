use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::RiskLevel;
use crate::amortization;
use crate::error::RealtyCalcError;
use crate::form::FormData;
use crate::policy::PolicyConfig;
use crate::types::{check_amount, with_metadata, ComputationOutput, Money, Rate};
use crate::RealtyCalcResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DsrInput {
    pub annual_income: Money,
    /// Outstanding balance of existing loans
    #[serde(default)]
    pub existing_debt: Money,
    /// Monthly repayment on existing loans
    #[serde(default)]
    pub existing_monthly_payment: Money,
    /// Principal of the new loan
    pub loan_amount: Money,
    pub annual_rate: Rate,
    pub term_years: u32,
}

impl DsrInput {
    /// Build from raw form fields; `rate` is a percentage string.
    pub fn from_form(form: &FormData) -> RealtyCalcResult<Self> {
        Ok(DsrInput {
            annual_income: form.amount("annual_income")?,
            existing_debt: form.optional_amount("existing_debt")?,
            existing_monthly_payment: form.optional_amount("existing_monthly_payment")?,
            loan_amount: form.amount("loan_amount")?,
            annual_rate: form.percent("rate")?,
            term_years: form.years("term_years")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DsrOutput {
    /// Annual debt service / annual income, as a fraction
    pub dsr_ratio: Rate,
    pub dsr_ceiling: Rate,
    pub is_eligible: bool,
    /// Monthly payment on the new loan
    pub monthly_payment: Money,
    /// Existing plus new monthly payments
    pub total_monthly_payment: Money,
    pub annual_debt_service: Money,
    /// Existing balance plus the new principal
    pub total_debt: Money,
    pub annual_income: Money,
    /// Annual debt service still available under the ceiling (negative when over)
    pub dsr_headroom: Money,
    pub risk_level: RiskLevel,
    pub recommendation: String,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Debt service ratio: (total monthly payments × 12) / annual income.
///
/// Scaling income and payments by the same positive factor leaves it unchanged.
pub fn dsr_ratio(total_monthly_payments: Money, annual_income: Money) -> RealtyCalcResult<Rate> {
    if annual_income <= Decimal::ZERO {
        return Err(RealtyCalcError::out_of_range(
            "annual_income",
            "Annual income must be positive",
        ));
    }
    if total_monthly_payments < Decimal::ZERO {
        return Err(RealtyCalcError::out_of_range(
            "total_monthly_payments",
            "Monthly payments cannot be negative",
        ));
    }
    total_monthly_payments
        .checked_mul(MONTHS_PER_YEAR)
        .and_then(|annual| annual.checked_div(annual_income))
        .ok_or_else(|| {
            RealtyCalcError::out_of_range(
                "annual_income",
                "Debt service is too large relative to income",
            )
        })
}

/// DSR of a prospective loan on top of existing debt, under the default policy.
pub fn calculate_dsr(input: &DsrInput) -> RealtyCalcResult<ComputationOutput<DsrOutput>> {
    calculate_dsr_with_policy(input, &PolicyConfig::default())
}

pub fn calculate_dsr_with_policy(
    input: &DsrInput,
    policy: &PolicyConfig,
) -> RealtyCalcResult<ComputationOutput<DsrOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let lending = &policy.lending;
    let monthly_payment =
        amortization::monthly_payment(input.loan_amount, input.annual_rate, input.term_years)?;
    let total_monthly_payment = input.existing_monthly_payment + monthly_payment;
    let annual_debt_service = total_monthly_payment * MONTHS_PER_YEAR;
    let ratio = dsr_ratio(total_monthly_payment, input.annual_income)?;
    let risk_level = RiskLevel::classify(ratio, &lending.risk_bands);

    let output = DsrOutput {
        dsr_ratio: ratio,
        dsr_ceiling: lending.dsr_ceiling,
        is_eligible: ratio <= lending.dsr_ceiling,
        monthly_payment,
        total_monthly_payment,
        annual_debt_service,
        total_debt: input.existing_debt + input.loan_amount,
        annual_income: input.annual_income,
        dsr_headroom: input.annual_income * lending.dsr_ceiling - annual_debt_service,
        risk_level,
        recommendation: risk_level.recommendation().to_string(),
    };

    tracing::debug!(dsr = %output.dsr_ratio, eligible = output.is_eligible, "dsr computed");

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Debt Service Ratio (annual debt service / annual income)",
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

fn validate_input(input: &DsrInput) -> RealtyCalcResult<()> {
    if input.annual_income <= Decimal::ZERO {
        return Err(RealtyCalcError::out_of_range(
            "annual_income",
            "Annual income must be positive",
        ));
    }
    if input.loan_amount <= Decimal::ZERO {
        return Err(RealtyCalcError::out_of_range(
            "loan_amount",
            "Loan amount must be positive",
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
    check_amount("annual_income", input.annual_income)?;
    check_amount("loan_amount", input.loan_amount)?;
    check_amount("existing_debt", input.existing_debt)?;
    check_amount("existing_monthly_payment", input.existing_monthly_payment)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_input() -> DsrInput {
        DsrInput {
            annual_income: dec!(60_000_000),
            existing_debt: dec!(20_000_000),
            existing_monthly_payment: dec!(500_000),
            loan_amount: dec!(300_000_000),
            annual_rate: dec!(0.035),
            term_years: 30,
        }
    }

    #[test]
    fn test_dsr_ratio_basic() {
        // 2,000,000 * 12 / 60,000,000 = 0.4
        assert_eq!(
            dsr_ratio(dec!(2_000_000), dec!(60_000_000)).unwrap(),
            dec!(0.4)
        );
    }

    #[test]
    fn test_dsr_ratio_rejects_zero_income() {
        let err = dsr_ratio(dec!(1), Decimal::ZERO).unwrap_err();
        assert_eq!(err.field(), Some("annual_income"));
    }

    #[test]
    fn test_sample_loan_within_ceiling() {
        let out = calculate_dsr(&sample_input()).unwrap();
        let r = &out.result;
        // New payment ≈ 1,347,134; total ≈ 1,847,134; annual ≈ 22.17M; DSR ≈ 0.369
        assert!((r.monthly_payment - dec!(1_347_134)).abs() < dec!(1));
        assert!((r.dsr_ratio - dec!(0.3694)).abs() < dec!(0.001));
        assert!(r.is_eligible);
        assert_eq!(r.risk_level, RiskLevel::Moderate);
        assert_eq!(r.total_debt, dec!(320_000_000));
        assert!(r.dsr_headroom > Decimal::ZERO);
    }

    #[test]
    fn test_low_income_is_ineligible() {
        let mut input = sample_input();
        input.annual_income = dec!(30_000_000);
        let out = calculate_dsr(&input).unwrap();
        assert!(!out.result.is_eligible);
        assert_eq!(out.result.risk_level, RiskLevel::Severe);
        assert!(out.result.dsr_headroom < Decimal::ZERO);
    }

    #[test]
    fn test_zero_rate_loan_allowed() {
        let mut input = sample_input();
        input.annual_rate = Decimal::ZERO;
        input.existing_monthly_payment = Decimal::ZERO;
        let out = calculate_dsr(&input).unwrap();
        // 300M / 360 months
        assert_eq!(
            out.result.monthly_payment,
            dec!(300_000_000) / dec!(360)
        );
    }

    #[test]
    fn test_missing_loan_rejected() {
        let mut input = sample_input();
        input.loan_amount = Decimal::ZERO;
        let err = calculate_dsr(&input).unwrap_err();
        assert_eq!(err.field(), Some("loan_amount"));
    }

    #[test]
    fn test_from_form_blank_existing_debt() {
        let form = FormData::new()
            .with("annual_income", "50,000,000")
            .with("loan_amount", "200,000,000")
            .with("rate", "3.5")
            .with("term_years", "30");
        let input = DsrInput::from_form(&form).unwrap();
        assert_eq!(input.existing_debt, Decimal::ZERO);
        assert_eq!(input.annual_rate, dec!(0.035));
    }
}
