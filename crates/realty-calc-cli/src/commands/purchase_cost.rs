use clap::Args;
use serde_json::Value;

use realty_calc_core::policy::PolicyConfig;
use realty_calc_core::purchase_cost::{self, PurchaseCostInput};

use super::{form_from_flags, parse_flags, switch};
use crate::input;

/// Arguments for the purchase cost calculation
#[derive(Args)]
pub struct PurchaseCostArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Purchase price in won, separators allowed ("500,000,000")
    #[arg(long)]
    pub price: Option<String>,

    /// Buyer has never owned a home
    #[arg(long)]
    pub first_home: bool,

    /// Buyer already owns one or more homes
    #[arg(long)]
    pub multiple_homes: bool,
}

pub fn run_purchase_cost(
    args: PurchaseCostArgs,
    policy: &PolicyConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let cost_input: PurchaseCostInput = input::resolve(args.input.as_deref(), || {
        let form = form_from_flags([
            ("price", args.price.as_deref()),
            ("first_home", switch(args.first_home)),
            ("multiple_homes", switch(args.multiple_homes)),
        ]);
        parse_flags(&form, PurchaseCostInput::from_form)
    })?;

    let result = purchase_cost::calculate_purchase_cost_with_policy(&cost_input, policy)?;
    Ok(serde_json::to_value(result)?)
}
