use clap::Args;
use serde_json::Value;

use realty_calc_core::policy::PolicyConfig;
use realty_calc_core::subscription::{self, SubscriptionInput};

use super::{form_from_flags, parse_flags, switch};
use crate::input;

/// Arguments for the subscription eligibility check
#[derive(Args)]
pub struct SubscriptionArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Applicant age in years
    #[arg(long)]
    pub age: Option<String>,

    /// single or married
    #[arg(long)]
    pub marital_status: Option<String>,

    /// Number of children
    #[arg(long)]
    pub children: Option<String>,

    /// Annual income in won
    #[arg(long)]
    pub annual_income: Option<String>,

    /// Total assets in won
    #[arg(long)]
    pub assets: Option<String>,

    /// Applicant already owns real estate
    #[arg(long)]
    pub has_property: bool,

    /// Applicant has used a subscription before
    #[arg(long)]
    pub has_applied_before: bool,
}

pub fn run_subscription(
    args: SubscriptionArgs,
    policy: &PolicyConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let applicant: SubscriptionInput = input::resolve(args.input.as_deref(), || {
        let form = form_from_flags([
            ("age", args.age.as_deref()),
            ("marital_status", args.marital_status.as_deref()),
            ("children", args.children.as_deref()),
            ("annual_income", args.annual_income.as_deref()),
            ("assets", args.assets.as_deref()),
            ("has_property", switch(args.has_property)),
            ("has_applied_before", switch(args.has_applied_before)),
        ]);
        parse_flags(&form, SubscriptionInput::from_form)
    })?;

    let result = subscription::calculate_subscription_eligibility_with_policy(&applicant, policy)?;
    Ok(serde_json::to_value(result)?)
}
