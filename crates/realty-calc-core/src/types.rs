use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::RealtyCalcError;
use crate::RealtyCalcResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.035 = 3.5%). Never as percentages.
pub type Rate = Decimal;

/// Largest amount any calculator accepts (10^18 won). Keeps every product
/// of amounts and rates inside Decimal's range.
pub const MAX_AMOUNT: Money = dec!(1_000_000_000_000_000_000);

pub(crate) fn check_amount(field: &str, value: Money) -> RealtyCalcResult<()> {
    if value > MAX_AMOUNT {
        return Err(RealtyCalcError::out_of_range(
            field,
            format!("Amount {value} exceeds the supported maximum of {MAX_AMOUNT}"),
        ));
    }
    Ok(())
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    /// The input the result was computed from.
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
    /// Year of the policy tables in force, when the calculation used any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_year: Option<u16>,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
            policy_year: None,
        },
    }
}

impl<T: Serialize> ComputationOutput<T> {
    /// Stamp the envelope with the policy year used for the calculation.
    pub fn with_policy_year(mut self, year: u16) -> Self {
        self.metadata.policy_year = Some(year);
        self
    }
}
