use serde_json::Value;

use realty_calc_core::policy::PolicyConfig;

/// The policy tables in force, after any `--policy` override.
pub fn run_policy(policy: &PolicyConfig) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::to_value(policy)?)
}
