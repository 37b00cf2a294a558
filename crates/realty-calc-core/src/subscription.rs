use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::RealtyCalcError;
use crate::form::FormData;
use crate::policy::{PolicyConfig, SubscriptionPolicy};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::RealtyCalcResult;

const MAX_CHILDREN: u32 = 30;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaritalStatus {
    Single,
    Married,
    #[default]
    Unspecified,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionInput {
    pub age: u32,
    #[serde(default)]
    pub marital_status: MaritalStatus,
    #[serde(default)]
    pub children: u32,
    pub annual_income: Money,
    pub assets: Money,
    /// Applicant already owns real estate
    #[serde(default)]
    pub has_property: bool,
    /// Applicant has won or used a subscription before
    #[serde(default)]
    pub has_applied_before: bool,
}

impl SubscriptionInput {
    pub fn from_form(form: &FormData) -> RealtyCalcResult<Self> {
        let marital_status = match form.get("marital_status").map(|s| s.trim().to_ascii_lowercase()) {
            None => MaritalStatus::Unspecified,
            Some(s) if s.is_empty() => MaritalStatus::Unspecified,
            Some(s) if s == "single" => MaritalStatus::Single,
            Some(s) if s == "married" => MaritalStatus::Married,
            Some(other) => {
                return Err(RealtyCalcError::out_of_range(
                    "marital_status",
                    format!("unknown status {other:?}; expected single or married"),
                ))
            }
        };
        let children = match form.get("children").map(str::trim) {
            None | Some("") => 0,
            Some(_) => form.count("children")?,
        };
        Ok(SubscriptionInput {
            age: form.count("age")?,
            marital_status,
            children,
            annual_income: form.amount("annual_income")?,
            assets: form.amount("assets")?,
            has_property: form.flag("has_property")?,
            has_applied_before: form.flag("has_applied_before")?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Points awarded per rubric item; penalties are stored as positive deductions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub age_points: i32,
    pub marital_points: i32,
    pub children_points: i32,
    pub income_points: i32,
    pub asset_points: i32,
    pub property_penalty: i32,
    pub prior_application_penalty: i32,
}

impl ScoreBreakdown {
    /// Saturates rather than wrapping on extreme rubric values.
    pub fn raw_total(&self) -> i32 {
        [
            self.age_points,
            self.marital_points,
            self.children_points,
            self.income_points,
            self.asset_points,
        ]
        .into_iter()
        .fold(0i32, i32::saturating_add)
        .saturating_sub(self.property_penalty)
        .saturating_sub(self.prior_application_penalty)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionOutput {
    pub can_apply: bool,
    pub priority: Priority,
    /// Rubric total clamped at zero
    pub score: u32,
    /// Rubric total before clamping
    pub raw_score: i32,
    /// Absent when a hard requirement failed and no score was computed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
    pub unmet_requirements: Vec<String>,
    pub recommendations: Vec<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Score a housing-subscription applicant under the default rubric.
pub fn calculate_subscription_eligibility(
    input: &SubscriptionInput,
) -> RealtyCalcResult<ComputationOutput<SubscriptionOutput>> {
    calculate_subscription_eligibility_with_policy(input, &PolicyConfig::default())
}

/// Hard requirements (age, income, assets) short-circuit: a failing applicant
/// scores zero and cannot apply regardless of the rubric.
pub fn calculate_subscription_eligibility_with_policy(
    input: &SubscriptionInput,
    policy: &PolicyConfig,
) -> RealtyCalcResult<ComputationOutput<SubscriptionOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let rubric = &policy.subscription;

    validate_input(input)?;

    if input.children > 0 && input.marital_status != MaritalStatus::Married {
        warnings.push(format!(
            "{} children reported for an applicant who is not married; children only score for married applicants",
            input.children
        ));
    }

    let unmet_requirements = unmet_requirements(input, rubric);
    let eligible = unmet_requirements.is_empty();

    let mut recommendations = Vec::new();
    let breakdown = if eligible {
        let breakdown = score(input, rubric);
        let total = breakdown.raw_total();
        recommend(input, rubric, &breakdown, total, &mut recommendations);
        Some(breakdown)
    } else {
        None
    };

    let raw_score = breakdown.as_ref().map(ScoreBreakdown::raw_total).unwrap_or(0);
    let score = u32::try_from(raw_score.max(0)).unwrap_or(0);
    let priority = priority_for(score, rubric);

    tracing::debug!(score, ?priority, eligible, "subscription assessed");

    let output = SubscriptionOutput {
        can_apply: eligible && !input.has_property,
        priority,
        score,
        raw_score,
        breakdown,
        unmet_requirements,
        recommendations,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Housing subscription points rubric with hard eligibility limits",
        input,
        warnings,
        elapsed,
        output,
    )
    .with_policy_year(policy.year))
}

pub fn priority_for(score: u32, rubric: &SubscriptionPolicy) -> Priority {
    if score >= rubric.high_priority_score {
        Priority::High
    } else if score >= rubric.medium_priority_score {
        Priority::Medium
    } else {
        Priority::Low
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_input(input: &SubscriptionInput) -> RealtyCalcResult<()> {
    if input.annual_income < Decimal::ZERO {
        return Err(RealtyCalcError::out_of_range(
            "annual_income",
            "Annual income cannot be negative",
        ));
    }
    if input.assets < Decimal::ZERO {
        return Err(RealtyCalcError::out_of_range(
            "assets",
            "Assets cannot be negative",
        ));
    }
    if input.age > 150 {
        return Err(RealtyCalcError::out_of_range(
            "age",
            "Age must be a plausible number of years",
        ));
    }
    if input.children > MAX_CHILDREN {
        return Err(RealtyCalcError::out_of_range(
            "children",
            format!("At most {MAX_CHILDREN} children can be reported"),
        ));
    }
    Ok(())
}

fn unmet_requirements(input: &SubscriptionInput, rubric: &SubscriptionPolicy) -> Vec<String> {
    let mut unmet = Vec::new();
    if input.age < rubric.min_age {
        unmet.push(format!("Applicant must be at least {} years old", rubric.min_age));
    }
    if input.age > rubric.max_age {
        unmet.push(format!("Applicant must be at most {} years old", rubric.max_age));
    }
    if input.annual_income > rubric.income_ceiling {
        unmet.push(format!(
            "Annual income must not exceed {}",
            crate::format::group_thousands(rubric.income_ceiling)
        ));
    }
    if input.assets > rubric.asset_ceiling {
        unmet.push(format!(
            "Assets must not exceed {}",
            crate::format::group_thousands(rubric.asset_ceiling)
        ));
    }
    unmet
}

fn score(input: &SubscriptionInput, rubric: &SubscriptionPolicy) -> ScoreBreakdown {
    let (marital_points, children_points) = match input.marital_status {
        MaritalStatus::Married => {
            let children = i32::try_from(input.children).unwrap_or(i32::MAX);
            (
                rubric.married_points,
                children.saturating_mul(rubric.per_child_points),
            )
        }
        MaritalStatus::Single => (rubric.single_points, 0),
        MaritalStatus::Unspecified => (0, 0),
    };

    ScoreBreakdown {
        age_points: rubric.age_points.points_for(Decimal::from(input.age)),
        marital_points,
        children_points,
        income_points: rubric.income_points.points_for(input.annual_income),
        asset_points: rubric.asset_points.points_for(input.assets),
        property_penalty: if input.has_property { rubric.property_penalty } else { 0 },
        prior_application_penalty: if input.has_applied_before {
            rubric.prior_application_penalty
        } else {
            0
        },
    }
}

fn recommend(
    input: &SubscriptionInput,
    rubric: &SubscriptionPolicy,
    breakdown: &ScoreBreakdown,
    total: i32,
    out: &mut Vec<String>,
) {
    if breakdown.property_penalty > 0 {
        out.push("Owning property lowers subscription priority.".into());
    }
    if breakdown.prior_application_penalty > 0 {
        out.push("A previous subscription lowers priority.".into());
    }

    let score = u32::try_from(total.max(0)).unwrap_or(0);
    out.push(
        match priority_for(score, rubric) {
            Priority::High => "Priority is high. Applying is recommended.",
            Priority::Medium => {
                "There is a reasonable chance. Weigh the region and housing type before applying."
            }
            Priority::Low => "Priority is low. Consider other ways of buying a home.",
        }
        .into(),
    );

    if input.marital_status == MaritalStatus::Single && input.age >= rubric.marriage_advice_age {
        out.push("Married applicants receive higher subscription priority.".into());
    }
    if input.marital_status == MaritalStatus::Married && input.children == 0 {
        out.push("Applicants with children receive higher subscription priority.".into());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
