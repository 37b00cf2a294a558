use clap::Args;
use serde_json::Value;

use realty_calc_core::lending::dsr::{self, DsrInput};
use realty_calc_core::lending::loan::{self, LoanInput};
use realty_calc_core::lending::policy::{self as loan_policy, LoanPolicyInput};
use realty_calc_core::policy::PolicyConfig;

use super::{form_from_flags, parse_flags, switch};
use crate::input;

/// Arguments for the stand-alone DSR check
#[derive(Args)]
pub struct DsrArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Annual income in won
    #[arg(long)]
    pub annual_income: Option<String>,

    /// Outstanding balance of existing loans
    #[arg(long)]
    pub existing_debt: Option<String>,

    /// Monthly repayment on existing loans
    #[arg(long)]
    pub existing_monthly_payment: Option<String>,

    /// Principal of the new loan
    #[arg(long)]
    pub loan_amount: Option<String>,

    /// Annual interest rate in percent ("3.5")
    #[arg(long)]
    pub rate: Option<String>,

    /// Term in years
    #[arg(long)]
    pub term_years: Option<String>,
}

/// Arguments for the comprehensive loan-limit calculation
#[derive(Args)]
pub struct LoanArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Purchase price in won
    #[arg(long)]
    pub price: Option<String>,

    /// Annual income in won
    #[arg(long)]
    pub annual_income: Option<String>,

    /// Outstanding balance of existing loans
    #[arg(long)]
    pub existing_debt: Option<String>,

    /// Monthly repayment on existing loans
    #[arg(long)]
    pub existing_monthly_payment: Option<String>,

    /// regulated or non-regulated
    #[arg(long)]
    pub region: Option<String>,

    /// mortgage, jeonse or credit
    #[arg(long)]
    pub loan_type: Option<String>,

    /// First-time home buyer
    #[arg(long)]
    pub first_time: bool,

    /// Buyer already owns several properties
    #[arg(long)]
    pub multiple_properties: bool,

    /// Term in years (default 30)
    #[arg(long)]
    pub term_years: Option<String>,

    /// Annual rate in percent; the policy base rate is used when omitted
    #[arg(long)]
    pub rate: Option<String>,
}

/// Arguments for LTV/DTI policy selection
#[derive(Args)]
pub struct LtvDtiArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Purchase price in won
    #[arg(long)]
    pub price: Option<String>,

    /// regulated or non-regulated
    #[arg(long)]
    pub region: Option<String>,

    /// mortgage, jeonse or credit
    #[arg(long)]
    pub loan_type: Option<String>,

    /// First-time home buyer
    #[arg(long)]
    pub first_time: bool,

    /// Buyer already owns several properties
    #[arg(long)]
    pub multiple_properties: bool,
}

pub fn run_dsr(args: DsrArgs, policy: &PolicyConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let dsr_input: DsrInput = input::resolve(args.input.as_deref(), || {
        let form = form_from_flags([
            ("annual_income", args.annual_income.as_deref()),
            ("existing_debt", args.existing_debt.as_deref()),
            ("existing_monthly_payment", args.existing_monthly_payment.as_deref()),
            ("loan_amount", args.loan_amount.as_deref()),
            ("rate", args.rate.as_deref()),
            ("term_years", args.term_years.as_deref()),
        ]);
        parse_flags(&form, DsrInput::from_form)
    })?;

    let result = dsr::calculate_dsr_with_policy(&dsr_input, policy)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_loan(args: LoanArgs, policy: &PolicyConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input: LoanInput = input::resolve(args.input.as_deref(), || {
        let form = form_from_flags([
            ("price", args.price.as_deref()),
            ("annual_income", args.annual_income.as_deref()),
            ("existing_debt", args.existing_debt.as_deref()),
            ("existing_monthly_payment", args.existing_monthly_payment.as_deref()),
            ("region", args.region.as_deref()),
            ("loan_type", args.loan_type.as_deref()),
            ("first_time", switch(args.first_time)),
            ("multiple_properties", switch(args.multiple_properties)),
            ("term_years", args.term_years.as_deref()),
            ("rate", args.rate.as_deref()),
        ]);
        parse_flags(&form, LoanInput::from_form)
    })?;

    let result = loan::calculate_loan_with_policy(&loan_input, policy)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_ltv_dti(
    args: LtvDtiArgs,
    policy: &PolicyConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let selection: LoanPolicyInput = input::resolve(args.input.as_deref(), || {
        let form = form_from_flags([
            ("price", args.price.as_deref()),
            ("region", args.region.as_deref()),
            ("loan_type", args.loan_type.as_deref()),
            ("first_time", switch(args.first_time)),
            ("multiple_properties", switch(args.multiple_properties)),
        ]);
        parse_flags(&form, LoanPolicyInput::from_form)
    })?;

    let result = loan_policy::calculate_ltv_dti_with_policy(&selection, policy)?;
    Ok(serde_json::to_value(result)?)
}
