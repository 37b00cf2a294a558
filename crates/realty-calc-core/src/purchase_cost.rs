use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::RealtyCalcError;
use crate::form::FormData;
use crate::policy::{PolicyConfig, PurchaseCostPolicy};
use crate::types::{check_amount, with_metadata, ComputationOutput, Money, Rate};
use crate::RealtyCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseCostInput {
    /// Purchase price
    pub price: Money,
    /// Buyer has never owned a home
    #[serde(default)]
    pub is_first_home: bool,
    /// Buyer already owns one or more homes
    #[serde(default)]
    pub is_multiple_homes: bool,
}

impl PurchaseCostInput {
    /// Build from raw form fields `price`, `first_home`, `multiple_homes`.
    pub fn from_form(form: &FormData) -> RealtyCalcResult<Self> {
        Ok(PurchaseCostInput {
            price: form.amount("price")?,
            is_first_home: form.flag("first_home")?,
            is_multiple_homes: form.flag("multiple_homes")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseCostBreakdown {
    pub acquisition_tax: Money,
    pub registration_tax: Money,
    pub education_tax: Money,
    pub stamp_tax: Money,
    pub brokerage_fee: Money,
    pub other_fees: Money,
}

impl PurchaseCostBreakdown {
    pub fn total(&self) -> Money {
        self.acquisition_tax
            + self.registration_tax
            + self.education_tax
            + self.stamp_tax
            + self.brokerage_fee
            + self.other_fees
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseCostOutput {
    /// Rate from the price table before buyer adjustments
    pub base_rate: Rate,
    /// Rate actually charged
    pub acquisition_tax_rate: Rate,
    pub first_home_discount_applied: bool,
    pub multiple_homes_surcharge_applied: bool,
    pub breakdown: PurchaseCostBreakdown,
    pub total_cost: Money,
    /// total_cost / price
    pub cost_to_price_ratio: Rate,
    /// price + total_cost
    pub total_cash_required: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Acquisition tax, derived taxes and closing costs under the default policy.
pub fn calculate_purchase_cost(
    input: &PurchaseCostInput,
) -> RealtyCalcResult<ComputationOutput<PurchaseCostOutput>> {
    calculate_purchase_cost_with_policy(input, &PolicyConfig::default())
}

pub fn calculate_purchase_cost_with_policy(
    input: &PurchaseCostInput,
    policy: &PolicyConfig,
) -> RealtyCalcResult<ComputationOutput<PurchaseCostOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.price <= Decimal::ZERO {
        return Err(RealtyCalcError::out_of_range(
            "price",
            "Purchase price must be positive",
        ));
    }
    check_amount("price", input.price)?;

    if input.is_first_home && input.is_multiple_homes {
        warnings.push(
            "Buyer is flagged as both first-home and multiple-homes; \
             the first-home discount and the multiple-homes surcharge were both applied"
                .into(),
        );
    }

    let output = compute_costs(input, &policy.purchase_cost);

    tracing::debug!(
        price = %input.price,
        rate = %output.acquisition_tax_rate,
        total = %output.total_cost,
        "purchase cost computed"
    );

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Home purchase costs (tiered acquisition tax, derived taxes, brokerage)",
        input,
        warnings,
        elapsed,
        output,
    )
    .with_policy_year(policy.year))
}

/// Acquisition-tax rate for a price and buyer profile, after discount and surcharge.
pub fn acquisition_tax_rate(
    price: Money,
    is_first_home: bool,
    is_multiple_homes: bool,
    policy: &PurchaseCostPolicy,
) -> Rate {
    let mut rate = *policy.acquisition_rates.lookup(price);
    if is_first_home && price <= policy.first_home_price_cap {
        rate = policy.first_home_rate;
    }
    if is_multiple_homes {
        rate *= policy.multiple_homes_multiplier;
    }
    rate
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn compute_costs(input: &PurchaseCostInput, policy: &PurchaseCostPolicy) -> PurchaseCostOutput {
    let price = input.price;
    let base_rate = *policy.acquisition_rates.lookup(price);
    let first_home_discount_applied =
        input.is_first_home && price <= policy.first_home_price_cap;
    let rate = acquisition_tax_rate(
        price,
        input.is_first_home,
        input.is_multiple_homes,
        policy,
    );

    let acquisition_tax = (price * rate).floor();
    let breakdown = PurchaseCostBreakdown {
        acquisition_tax,
        registration_tax: (acquisition_tax * policy.registration_tax_share).floor(),
        education_tax: (acquisition_tax * policy.education_tax_share).floor(),
        stamp_tax: *policy.stamp_tax.lookup(price),
        brokerage_fee: (price * policy.brokerage_rate).floor(),
        other_fees: policy.misc_fees,
    };
    let total_cost = breakdown.total();

    PurchaseCostOutput {
        base_rate,
        acquisition_tax_rate: rate,
        first_home_discount_applied,
        multiple_homes_surcharge_applied: input.is_multiple_homes,
        breakdown,
        total_cost,
        cost_to_price_ratio: total_cost / price,
        total_cash_required: price + total_cost,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
