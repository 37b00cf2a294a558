use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::RealtyCalcError;
use crate::types::{check_amount, with_metadata, ComputationOutput, Money, Rate};
use crate::RealtyCalcResult;

const MONTHS_PER_YEAR: u32 = 12;

/// Longest term any calculator amortizes over.
pub const MAX_TERM_YEARS: u32 = 50;
/// 1000% a year; anything above is a unit mistake.
const MAX_ANNUAL_RATE: Rate = dec!(10);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationInput {
    pub principal: Money,
    /// Annual nominal rate, compounded monthly
    pub annual_rate: Rate,
    pub term_years: u32,
    /// Emit the month-by-month schedule (defaults to true)
    #[serde(default = "default_true")]
    pub include_schedule: bool,
}

fn default_true() -> bool {
    true
}

/// Totals over the life of a level-payment loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub monthly_payment: Money,
    pub months: u32,
    /// monthly_payment * months
    pub total_payment: Money,
    pub total_interest: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub month: u32,
    pub payment: Money,
    pub principal: Money,
    pub interest: Money,
    /// Outstanding balance after this payment
    pub balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationOutput {
    pub summary: LoanSummary,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub schedule: Vec<ScheduleRow>,
}

// ---------------------------------------------------------------------------
// Payment formulas
// ---------------------------------------------------------------------------

/// Level monthly payment for an amortizing loan.
///
/// `annual_rate` is compounded monthly; a zero rate amortizes straight-line
/// (`principal / months`).
pub fn monthly_payment(principal: Money, annual_rate: Rate, years: u32) -> RealtyCalcResult<Money> {
    if principal <= Decimal::ZERO {
        return Err(RealtyCalcError::out_of_range(
            "principal",
            "Loan principal must be positive",
        ));
    }
    check_amount("principal", principal)?;
    let (monthly_rate, months) = validate_terms(annual_rate, years)?;

    if monthly_rate.is_zero() {
        return Ok(principal / Decimal::from(months));
    }
    principal
        .checked_mul(level_factor(monthly_rate, months)?)
        .ok_or_else(|| overflow("principal"))
}

/// Payment per unit of principal: r(1+r)^n / ((1+r)^n - 1), or 1/n at zero rate.
pub fn payment_factor(annual_rate: Rate, years: u32) -> RealtyCalcResult<Decimal> {
    let (monthly_rate, months) = validate_terms(annual_rate, years)?;
    if monthly_rate.is_zero() {
        return Ok(Decimal::ONE / Decimal::from(months));
    }
    level_factor(monthly_rate, months)
}

/// Inverse amortization: the principal a level `payment` retires over the term.
pub fn principal_for_payment(payment: Money, annual_rate: Rate, years: u32) -> RealtyCalcResult<Money> {
    if payment < Decimal::ZERO {
        return Err(RealtyCalcError::out_of_range(
            "payment",
            "Monthly payment cannot be negative",
        ));
    }
    check_amount("payment", payment)?;
    let (monthly_rate, months) = validate_terms(annual_rate, years)?;
    if payment.is_zero() {
        return Ok(Decimal::ZERO);
    }
    if monthly_rate.is_zero() {
        return Ok(payment * Decimal::from(months));
    }

    let factor = level_factor(monthly_rate, months)?;
    if factor.is_zero() {
        return Err(RealtyCalcError::DivisionByZero {
            context: "inverse amortization factor".into(),
        });
    }
    payment.checked_div(factor).ok_or_else(|| overflow("payment"))
}

/// Lifetime totals for a level-payment loan.
pub fn summarize(principal: Money, annual_rate: Rate, years: u32) -> RealtyCalcResult<LoanSummary> {
    let payment = monthly_payment(principal, annual_rate, years)?;
    let months = years * MONTHS_PER_YEAR;
    let total_payment = payment * Decimal::from(months);

    Ok(LoanSummary {
        monthly_payment: payment,
        months,
        total_payment,
        total_interest: total_payment - principal,
    })
}

/// Month-by-month split of each payment into interest and principal.
///
/// The last row repays whatever balance remains, so the schedule always
/// closes at exactly zero.
pub fn amortization_schedule(
    principal: Money,
    annual_rate: Rate,
    years: u32,
) -> RealtyCalcResult<Vec<ScheduleRow>> {
    let payment = monthly_payment(principal, annual_rate, years)?;
    let monthly_rate = annual_rate / Decimal::from(MONTHS_PER_YEAR);
    let months = years * MONTHS_PER_YEAR;

    let mut rows = Vec::with_capacity(months as usize);
    let mut balance = principal;

    for month in 1..=months {
        let interest = balance * monthly_rate;
        let (principal_part, paid) = if month == months {
            (balance, balance + interest)
        } else {
            (payment - interest, payment)
        };
        balance -= principal_part;

        rows.push(ScheduleRow {
            month,
            payment: paid,
            principal: principal_part,
            interest,
            balance,
        });
    }

    Ok(rows)
}

/// Summary and (optionally) the full schedule, wrapped in the standard envelope.
pub fn amortize(input: &AmortizationInput) -> RealtyCalcResult<ComputationOutput<AmortizationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let summary = summarize(input.principal, input.annual_rate, input.term_years)?;
    let schedule = if input.include_schedule {
        amortization_schedule(input.principal, input.annual_rate, input.term_years)?
    } else {
        Vec::new()
    };

    if input.annual_rate > dec!(0.20) {
        warnings.push(format!(
            "Annual rate {}% is above 20%; verify the rate was entered as a fraction",
            input.annual_rate * dec!(100)
        ));
    }

    tracing::debug!(
        principal = %input.principal,
        monthly_payment = %summary.monthly_payment,
        months = summary.months,
        "amortized loan"
    );

    let output = AmortizationOutput { summary, schedule };
    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Level-payment amortization (monthly compounding)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_terms(annual_rate: Rate, years: u32) -> RealtyCalcResult<(Rate, u32)> {
    if annual_rate < Decimal::ZERO {
        return Err(RealtyCalcError::out_of_range(
            "annual_rate",
            "Interest rate cannot be negative",
        ));
    }
    if annual_rate > MAX_ANNUAL_RATE {
        return Err(RealtyCalcError::out_of_range(
            "annual_rate",
            format!("Interest rate cannot exceed {MAX_ANNUAL_RATE} (as a fraction)"),
        ));
    }
    if years == 0 {
        return Err(RealtyCalcError::out_of_range(
            "term_years",
            "Loan term must be at least 1 year",
        ));
    }
    if years > MAX_TERM_YEARS {
        return Err(RealtyCalcError::out_of_range(
            "term_years",
            format!("Loan term cannot exceed {MAX_TERM_YEARS} years"),
        ));
    }
    Ok((annual_rate / Decimal::from(MONTHS_PER_YEAR), years * MONTHS_PER_YEAR))
}

fn level_factor(monthly_rate: Rate, months: u32) -> RealtyCalcResult<Decimal> {
    let compound = compound_factor(monthly_rate, months)?;
    let denominator = compound - Decimal::ONE;
    if denominator.is_zero() {
        return Err(RealtyCalcError::DivisionByZero {
            context: "amortization payment denominator".into(),
        });
    }
    (monthly_rate * compound)
        .checked_div(denominator)
        .ok_or_else(|| overflow("annual_rate"))
}

fn overflow(field: &str) -> RealtyCalcError {
    RealtyCalcError::out_of_range(field, "Amount overflows decimal precision")
}

fn compound_factor(monthly_rate: Rate, months: u32) -> RealtyCalcResult<Decimal> {
    (Decimal::ONE + monthly_rate)
        .checked_powu(u64::from(months))
        .ok_or_else(|| {
            RealtyCalcError::out_of_range(
                "annual_rate",
                "Rate and term overflow the compounding factor",
            )
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
