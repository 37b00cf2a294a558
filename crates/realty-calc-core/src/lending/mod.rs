//! Mortgage lending rules: LTV/DTI policy selection, the stand-alone DSR
//! check and the comprehensive loan-limit calculator.

pub mod dsr;
pub mod loan;
pub mod policy;

use serde::{Deserialize, Serialize};

use crate::policy::RiskBands;
use crate::types::Rate;

pub use crate::policy::{LoanType, Region};

/// DSR risk band used for the recommendation text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Safe,
    Moderate,
    Risky,
    Severe,
}

impl RiskLevel {
    /// Band boundaries are inclusive on the lower-risk side.
    pub fn classify(dsr: Rate, bands: &RiskBands) -> Self {
        if dsr <= bands.safe {
            RiskLevel::Safe
        } else if dsr <= bands.moderate {
            RiskLevel::Moderate
        } else if dsr <= bands.risky {
            RiskLevel::Risky
        } else {
            RiskLevel::Severe
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            RiskLevel::Safe => {
                "Comfortable level. Approval is likely and repayments leave room in the budget."
            }
            RiskLevel::Moderate => {
                "Acceptable level. Approval is possible, but household spending needs managing."
            }
            RiskLevel::Risky => {
                "High level. Approval may be difficult; raise income or pay down existing debt."
            }
            RiskLevel::Severe => {
                "Very high level. A loan is unlikely to be approved under the current conditions."
            }
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Safe => write!(f, "safe"),
            RiskLevel::Moderate => write!(f, "moderate"),
            RiskLevel::Risky => write!(f, "risky"),
            RiskLevel::Severe => write!(f, "severe"),
        }
    }
}
