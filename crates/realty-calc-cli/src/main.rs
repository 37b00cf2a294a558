mod commands;
mod config;
mod input;
mod output;
mod telemetry;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::amortization::AmortizeArgs;
use commands::lending::{DsrArgs, LoanArgs, LtvDtiArgs};
use commands::purchase_cost::PurchaseCostArgs;
use commands::subscription::SubscriptionArgs;
use config::CliConfig;

/// Real-estate purchase, lending and subscription calculations
#[derive(Parser)]
#[command(
    name = "realty",
    version,
    about = "Real-estate purchase, lending and subscription calculations",
    long_about = "A CLI for home-buying arithmetic with decimal precision. Supports \
                  purchase taxes and closing costs, DSR checks, LTV/DTI loan limits, \
                  amortization schedules and housing-subscription scoring."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Policy document (JSON or YAML) replacing the built-in tables
    #[arg(long, global = true)]
    policy: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Acquisition tax, derived taxes and closing costs for a purchase
    PurchaseCost(PurchaseCostArgs),
    /// Debt service ratio of a new loan on top of existing debt
    Dsr(DsrArgs),
    /// Maximum loan, repayments, DSR and funding plan for a purchase
    Loan(LoanArgs),
    /// LTV and DTI limits for a region, price and buyer profile
    LtvDti(LtvDtiArgs),
    /// Housing-subscription eligibility and priority score
    Subscription(SubscriptionArgs),
    /// Level-payment amortization summary and schedule
    Amortize(AmortizeArgs),
    /// Print the policy tables in force
    Policy,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let config = CliConfig::load(cli.policy.as_deref());
    if let Err(e) = telemetry::init(&config.log_filter) {
        eprintln!("{}: {}", "warning".yellow().bold(), e);
    }

    let policy = match config.policy() {
        Ok(policy) => policy,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::PurchaseCost(args) => commands::purchase_cost::run_purchase_cost(args, &policy),
        Commands::Dsr(args) => commands::lending::run_dsr(args, &policy),
        Commands::Loan(args) => commands::lending::run_loan(args, &policy),
        Commands::LtvDti(args) => commands::lending::run_ltv_dti(args, &policy),
        Commands::Subscription(args) => commands::subscription::run_subscription(args, &policy),
        Commands::Amortize(args) => commands::amortization::run_amortize(args),
        Commands::Policy => commands::policy::run_policy(&policy),
        Commands::Version => {
            println!("realty {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
