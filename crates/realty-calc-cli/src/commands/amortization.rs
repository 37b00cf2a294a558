use clap::Args;
use serde_json::Value;

use realty_calc_core::amortization::{self, AmortizationInput};
use realty_calc_core::form::FormData;
use realty_calc_core::RealtyCalcResult;

use super::{form_from_flags, parse_flags};
use crate::input;

/// Arguments for a level-payment amortization
#[derive(Args)]
pub struct AmortizeArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal in won
    #[arg(long)]
    pub principal: Option<String>,

    /// Annual interest rate in percent ("3.5")
    #[arg(long)]
    pub rate: Option<String>,

    /// Term in years
    #[arg(long)]
    pub term_years: Option<String>,

    /// Print only the summary, without the month-by-month schedule
    #[arg(long)]
    pub summary_only: bool,
}

pub fn run_amortize(args: AmortizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let include_schedule = !args.summary_only;
    let mut loan: AmortizationInput = input::resolve(args.input.as_deref(), || {
        let form = form_from_flags([
            ("principal", args.principal.as_deref()),
            ("rate", args.rate.as_deref()),
            ("term_years", args.term_years.as_deref()),
        ]);
        parse_flags(&form, |form| amortization_from_form(form, include_schedule))
    })?;
    if args.summary_only {
        loan.include_schedule = false;
    }

    let result = amortization::amortize(&loan)?;
    Ok(serde_json::to_value(result)?)
}

fn amortization_from_form(
    form: &FormData,
    include_schedule: bool,
) -> RealtyCalcResult<AmortizationInput> {
    Ok(AmortizationInput {
        principal: form.amount("principal")?,
        annual_rate: form.percent("rate")?,
        term_years: form.years("term_years")?,
        include_schedule,
    })
}
