use std::collections::BTreeMap;
use std::str::FromStr;

use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Serialize;

use realty_calc_core::form::FormData;
use realty_calc_core::policy::PolicyConfig;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Built-in tables unless the caller passes a policy document.
fn policy_from(policy_json: Option<String>) -> NapiResult<PolicyConfig> {
    match policy_json {
        Some(json) if !json.trim().is_empty() => {
            PolicyConfig::from_json_str(&json).map_err(to_napi_error)
        }
        _ => Ok(PolicyConfig::default()),
    }
}

/// Raw form fields posted by a page, as a JSON object of strings.
fn form_from(fields_json: &str) -> NapiResult<FormData> {
    let fields: BTreeMap<String, String> =
        serde_json::from_str(fields_json).map_err(to_napi_error)?;
    Ok(fields.into_iter().collect())
}

fn to_json<T: Serialize>(output: &T) -> NapiResult<String> {
    serde_json::to_string(output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Purchase cost
// ---------------------------------------------------------------------------

#[napi]
pub fn purchase_cost(input_json: String, policy_json: Option<String>) -> NapiResult<String> {
    let input: realty_calc_core::purchase_cost::PurchaseCostInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = realty_calc_core::purchase_cost::calculate_purchase_cost_with_policy(
        &input,
        &policy_from(policy_json)?,
    )
    .map_err(to_napi_error)?;
    to_json(&output)
}

#[napi]
pub fn purchase_cost_form(fields_json: String, policy_json: Option<String>) -> NapiResult<String> {
    let form = form_from(&fields_json)?;
    let input = realty_calc_core::purchase_cost::PurchaseCostInput::from_form(&form)
        .map_err(to_napi_error)?;
    let output = realty_calc_core::purchase_cost::calculate_purchase_cost_with_policy(
        &input,
        &policy_from(policy_json)?,
    )
    .map_err(to_napi_error)?;
    to_json(&output)
}

// ---------------------------------------------------------------------------
// Lending
// ---------------------------------------------------------------------------

#[napi]
pub fn dsr(input_json: String, policy_json: Option<String>) -> NapiResult<String> {
    let input: realty_calc_core::lending::dsr::DsrInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        realty_calc_core::lending::dsr::calculate_dsr_with_policy(&input, &policy_from(policy_json)?)
            .map_err(to_napi_error)?;
    to_json(&output)
}

#[napi]
pub fn dsr_form(fields_json: String, policy_json: Option<String>) -> NapiResult<String> {
    let form = form_from(&fields_json)?;
    let input =
        realty_calc_core::lending::dsr::DsrInput::from_form(&form).map_err(to_napi_error)?;
    let output =
        realty_calc_core::lending::dsr::calculate_dsr_with_policy(&input, &policy_from(policy_json)?)
            .map_err(to_napi_error)?;
    to_json(&output)
}

#[napi]
pub fn loan_limit(input_json: String, policy_json: Option<String>) -> NapiResult<String> {
    let input: realty_calc_core::lending::loan::LoanInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = realty_calc_core::lending::loan::calculate_loan_with_policy(
        &input,
        &policy_from(policy_json)?,
    )
    .map_err(to_napi_error)?;
    to_json(&output)
}

#[napi]
pub fn loan_limit_form(fields_json: String, policy_json: Option<String>) -> NapiResult<String> {
    let form = form_from(&fields_json)?;
    let input =
        realty_calc_core::lending::loan::LoanInput::from_form(&form).map_err(to_napi_error)?;
    let output = realty_calc_core::lending::loan::calculate_loan_with_policy(
        &input,
        &policy_from(policy_json)?,
    )
    .map_err(to_napi_error)?;
    to_json(&output)
}

#[napi]
pub fn ltv_dti(input_json: String, policy_json: Option<String>) -> NapiResult<String> {
    let input: realty_calc_core::lending::policy::LoanPolicyInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = realty_calc_core::lending::policy::calculate_ltv_dti_with_policy(
        &input,
        &policy_from(policy_json)?,
    )
    .map_err(to_napi_error)?;
    to_json(&output)
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

#[napi]
pub fn subscription_eligibility(
    input_json: String,
    policy_json: Option<String>,
) -> NapiResult<String> {
    let input: realty_calc_core::subscription::SubscriptionInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = realty_calc_core::subscription::calculate_subscription_eligibility_with_policy(
        &input,
        &policy_from(policy_json)?,
    )
    .map_err(to_napi_error)?;
    to_json(&output)
}

#[napi]
pub fn subscription_eligibility_form(
    fields_json: String,
    policy_json: Option<String>,
) -> NapiResult<String> {
    let form = form_from(&fields_json)?;
    let input = realty_calc_core::subscription::SubscriptionInput::from_form(&form)
        .map_err(to_napi_error)?;
    let output = realty_calc_core::subscription::calculate_subscription_eligibility_with_policy(
        &input,
        &policy_from(policy_json)?,
    )
    .map_err(to_napi_error)?;
    to_json(&output)
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn amortize(input_json: String) -> NapiResult<String> {
    let input: realty_calc_core::amortization::AmortizationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = realty_calc_core::amortization::amortize(&input).map_err(to_napi_error)?;
    to_json(&output)
}

// ---------------------------------------------------------------------------
// Policy and display helpers
// ---------------------------------------------------------------------------

#[napi]
pub fn default_policy() -> NapiResult<String> {
    to_json(&PolicyConfig::default())
}

/// Compact won rendering ("3.5억원") of a decimal string.
#[napi]
pub fn format_won(amount: String) -> NapiResult<String> {
    let amount = Decimal::from_str(amount.trim()).map_err(to_napi_error)?;
    Ok(realty_calc_core::format::format_won(amount))
}

#[napi]
pub fn group_thousands(amount: String) -> NapiResult<String> {
    let amount = Decimal::from_str(amount.trim()).map_err(to_napi_error)?;
    Ok(realty_calc_core::format::group_thousands(amount))
}
