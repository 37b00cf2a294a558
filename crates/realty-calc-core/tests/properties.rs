//! Property-based tests for the calculator formulas.
//!
//! Invariants verified:
//! - the level payment rises with the rate and falls with the term
//! - DSR is unchanged when income and payments scale by the same factor
//! - the subscription score never goes below zero
//! - recomputing from a result's `assumptions` reproduces the same totals
//! - the loan limit never exceeds either the LTV or the DTI amount

use proptest::{prelude::*, test_runner::TestCaseError};
use realty_calc_core::amortization::{self, AmortizationInput};
use realty_calc_core::lending::dsr::dsr_ratio;
use realty_calc_core::lending::loan::{calculate_loan, LoanInput};
use realty_calc_core::lending::{LoanType, Region};
use realty_calc_core::purchase_cost::{calculate_purchase_cost, PurchaseCostInput};
use realty_calc_core::subscription::{
    calculate_subscription_eligibility, MaritalStatus, SubscriptionInput,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ── Helpers
// ───────────────────────────────────────────────────────────────────

fn fail(e: impl std::fmt::Display) -> TestCaseError {
    TestCaseError::fail(e.to_string())
}

/// Whole-won amounts between 10 million and 2 billion.
fn price_strat() -> impl Strategy<Value = Decimal> {
    (10_000_000u64..=2_000_000_000u64).prop_map(Decimal::from)
}

/// Annual rates from 0.00% to 15.00% in basis-point steps.
fn rate_strat() -> impl Strategy<Value = Decimal> {
    (0u32..=1500u32).prop_map(|bp| Decimal::from(bp) / dec!(10_000))
}

fn marital_strat() -> impl Strategy<Value = MaritalStatus> {
    prop_oneof![
        Just(MaritalStatus::Single),
        Just(MaritalStatus::Married),
        Just(MaritalStatus::Unspecified),
    ]
}

fn region_strat() -> impl Strategy<Value = Region> {
    prop_oneof![Just(Region::Regulated), Just(Region::NonRegulated)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // ── Amortization ─────────────────────────────────────────────────────────

    /// A higher rate never lowers the payment on the same principal and term.
    #[test]
    fn payment_increases_with_rate(
        principal in price_strat(),
        rate in rate_strat(),
        step in 1u32..=200u32,
        years in 1u32..=40u32,
    ) {
        let higher = rate + Decimal::from(step) / dec!(10_000);
        let low = amortization::monthly_payment(principal, rate, years).map_err(fail)?;
        let high = amortization::monthly_payment(principal, higher, years).map_err(fail)?;
        prop_assert!(high > low, "{high} <= {low} at {rate} -> {higher}");
    }

    /// A longer term never raises the payment.
    #[test]
    fn payment_decreases_with_term(
        principal in price_strat(),
        rate in rate_strat(),
        years in 1u32..=39u32,
        extra in 1u32..=10u32,
    ) {
        let short = amortization::monthly_payment(principal, rate, years).map_err(fail)?;
        let long = amortization::monthly_payment(principal, rate, years + extra).map_err(fail)?;
        prop_assert!(long < short, "{long} >= {short} at {years}y -> {}y", years + extra);
    }

    /// Inverse amortization recovers the principal to within a won.
    #[test]
    fn inverse_payment_recovers_principal(
        principal in price_strat(),
        rate in rate_strat(),
        years in 1u32..=40u32,
    ) {
        let payment = amortization::monthly_payment(principal, rate, years).map_err(fail)?;
        let back = amortization::principal_for_payment(payment, rate, years).map_err(fail)?;
        prop_assert!((back - principal).abs() < dec!(1), "{back} vs {principal}");
    }

    // ── DSR ──────────────────────────────────────────────────────────────────

    #[test]
    fn dsr_is_scale_invariant(
        payments in 1u64..=10_000_000u64,
        income in 1_000_000u64..=500_000_000u64,
        k in 1u64..=1_000u64,
    ) {
        let k = Decimal::from(k);
        let base = dsr_ratio(Decimal::from(payments), Decimal::from(income)).map_err(fail)?;
        let scaled =
            dsr_ratio(Decimal::from(payments) * k, Decimal::from(income) * k).map_err(fail)?;
        prop_assert!((base - scaled).abs() < dec!(0.000000000000000001));
    }

    // ── Subscription ─────────────────────────────────────────────────────────

    #[test]
    fn subscription_score_never_negative(
        age in 0u32..=100u32,
        marital_status in marital_strat(),
        children in 0u32..=6u32,
        income in 0u64..=100_000_000u64,
        assets in 0u64..=500_000_000u64,
        has_property in any::<bool>(),
        has_applied_before in any::<bool>(),
    ) {
        let input = SubscriptionInput {
            age,
            marital_status,
            children,
            annual_income: Decimal::from(income),
            assets: Decimal::from(assets),
            has_property,
            has_applied_before,
        };
        let out = calculate_subscription_eligibility(&input).map_err(fail)?;
        prop_assert!(out.result.raw_score.max(0) as u32 == out.result.score);
        if has_property {
            prop_assert!(!out.result.can_apply);
        }
    }

    // ── Loan limit ───────────────────────────────────────────────────────────

    #[test]
    fn loan_limit_respects_both_ratios(
        price in price_strat(),
        income in 10_000_000u64..=300_000_000u64,
        region in region_strat(),
        is_first_time in any::<bool>(),
        has_multiple_properties in any::<bool>(),
    ) {
        let input = LoanInput {
            price,
            annual_income: Decimal::from(income),
            existing_debt: Decimal::ZERO,
            existing_monthly_payment: Decimal::ZERO,
            region,
            loan_type: LoanType::Mortgage,
            is_first_time,
            has_multiple_properties,
            term_years: 30,
            custom_rate: None,
        };
        let r = calculate_loan(&input).map_err(fail)?.result;
        prop_assert!(r.max_loan_amount <= r.ltv_amount);
        prop_assert!(r.max_loan_amount <= r.dti_amount);
        prop_assert!(r.funding.balance >= Decimal::ZERO);
    }

    // ── Idempotence ──────────────────────────────────────────────────────────

    #[test]
    fn purchase_cost_recomputes_from_assumptions(
        price in price_strat(),
        is_first_home in any::<bool>(),
        is_multiple_homes in any::<bool>(),
    ) {
        let input = PurchaseCostInput { price, is_first_home, is_multiple_homes };
        let first = calculate_purchase_cost(&input).map_err(fail)?;
        let replayed: PurchaseCostInput =
            serde_json::from_value(first.assumptions.clone()).map_err(fail)?;
        prop_assert_eq!(&replayed, &input);
        let second = calculate_purchase_cost(&replayed).map_err(fail)?;
        prop_assert_eq!(first.result, second.result);
    }

    #[test]
    fn loan_recomputes_from_assumptions(
        price in price_strat(),
        income in 10_000_000u64..=300_000_000u64,
        rate in prop::option::of(rate_strat()),
    ) {
        let input = LoanInput {
            price,
            annual_income: Decimal::from(income),
            existing_debt: Decimal::ZERO,
            existing_monthly_payment: Decimal::ZERO,
            region: Region::Regulated,
            loan_type: LoanType::Mortgage,
            is_first_time: false,
            has_multiple_properties: false,
            term_years: 30,
            custom_rate: rate,
        };
        let first = calculate_loan(&input).map_err(fail)?;
        let replayed: LoanInput =
            serde_json::from_value(first.assumptions.clone()).map_err(fail)?;
        let second = calculate_loan(&replayed).map_err(fail)?;
        prop_assert_eq!(first.result.max_loan_amount, second.result.max_loan_amount);
        prop_assert_eq!(first.result.total_amount, second.result.total_amount);
        prop_assert_eq!(first.result.dsr_ratio, second.result.dsr_ratio);
    }

    #[test]
    fn amortization_recomputes_from_assumptions(
        principal in price_strat(),
        rate in rate_strat(),
        years in 1u32..=40u32,
    ) {
        let input = AmortizationInput {
            principal,
            annual_rate: rate,
            term_years: years,
            include_schedule: false,
        };
        let first = amortization::amortize(&input).map_err(fail)?;
        let replayed: AmortizationInput =
            serde_json::from_value(first.assumptions.clone()).map_err(fail)?;
        let second = amortization::amortize(&replayed).map_err(fail)?;
        prop_assert_eq!(first.result.summary, second.result.summary);
    }
}
