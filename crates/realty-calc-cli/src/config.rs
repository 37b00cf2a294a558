use std::env;
use std::path::{Path, PathBuf};

use realty_calc_core::policy::PolicyConfig;
use realty_calc_core::RealtyCalcError;
use thiserror::Error;

use crate::input;

pub const POLICY_ENV: &str = "REALTY_CALC_POLICY";
pub const LOG_ENV: &str = "REALTY_CALC_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";

/// Process-level settings gathered from flags, the environment and `.env`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Policy document overriding the built-in tables
    pub policy_path: Option<PathBuf>,
    /// Fallback tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl CliConfig {
    /// A `--policy` flag wins over `REALTY_CALC_POLICY`.
    pub fn load(policy_flag: Option<&str>) -> Self {
        dotenvy::dotenv().ok();

        let policy_path = policy_flag
            .map(PathBuf::from)
            .or_else(|| non_empty_var(POLICY_ENV).map(PathBuf::from));
        let log_filter =
            non_empty_var(LOG_ENV).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Self {
            policy_path,
            log_filter,
        }
    }

    /// The effective policy: the configured document, else the built-in tables.
    pub fn policy(&self) -> Result<PolicyConfig, ConfigError> {
        match &self.policy_path {
            Some(path) => load_policy(path),
            None => Ok(PolicyConfig::default()),
        }
    }
}

/// Parse a JSON or YAML policy document (chosen by extension) and validate it.
pub fn load_policy(path: &Path) -> Result<PolicyConfig, ConfigError> {
    let (resolved, contents) = input::file::read_text(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let is_yaml = matches!(
        resolved.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    );
    let policy: PolicyConfig = if is_yaml {
        serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: resolved.clone(),
            reason: e.to_string(),
        })?
    } else {
        serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: resolved.clone(),
            reason: e.to_string(),
        })?
    };

    policy.validate().map_err(ConfigError::Invalid)?;
    tracing::info!(path = %resolved.display(), year = policy.year, "loaded policy document");
    Ok(policy)
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read policy '{}': {reason}", path.display())]
    Read { path: PathBuf, reason: String },
    #[error("cannot parse policy '{}': {reason}", path.display())]
    Parse { path: PathBuf, reason: String },
    #[error("policy rejected: {0}")]
    Invalid(#[source] RealtyCalcError),
}
