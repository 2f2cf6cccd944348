//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use crate::services::pipeline::DEFAULT_MAX_PREVIOUS_REPORTS;
use crate::services::{BaselineSpec, InsightsOptions};

/// Environment variable names.
pub mod vars {
    pub const CURRENT_REPORT: &str = "INSIGHTS_CURRENT_REPORT";
    pub const HISTORY_DIR: &str = "INSIGHTS_HISTORY_DIR";
    pub const BASELINE: &str = "INSIGHTS_BASELINE";
    pub const MAX_PREVIOUS_REPORTS: &str = "INSIGHTS_MAX_PREVIOUS_REPORTS";
    pub const OUTPUT: &str = "INSIGHTS_OUTPUT";
    pub const SUITE_TREE_OUTPUT: &str = "INSIGHTS_SUITE_TREE_OUTPUT";
}

/// Default values.
pub mod defaults {
    pub const MAX_PREVIOUS_REPORTS: usize = super::DEFAULT_MAX_PREVIOUS_REPORTS;
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Report to enrich
    pub current_report: PathBuf,
    /// Directory holding previous reports (none: no history)
    pub history_dir: Option<PathBuf>,
    /// Baseline selection
    pub baseline: BaselineSpec,
    /// Maximum number of previous reports analyzed (default: 10)
    pub max_previous_reports: usize,
    /// Where the enriched report is written (none: stdout)
    pub output: Option<PathBuf>,
    /// Where the suite tree is written (none: not written)
    pub suite_tree_output: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `INSIGHTS_CURRENT_REPORT`: Path of the current report - REQUIRED
    /// - `INSIGHTS_HISTORY_DIR`: Directory of previous reports (optional)
    /// - `INSIGHTS_BASELINE`: Baseline offset (integer) or report ID (default: latest)
    /// - `INSIGHTS_MAX_PREVIOUS_REPORTS`: History cap (default: 10)
    /// - `INSIGHTS_OUTPUT`: Output path for the enriched report (default: stdout)
    /// - `INSIGHTS_SUITE_TREE_OUTPUT`: Output path for the suite tree (optional)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let current_report = non_empty(vars::CURRENT_REPORT)
            .map(PathBuf::from)
            .ok_or(ConfigError::MissingEnvVar(vars::CURRENT_REPORT))?;

        let history_dir = non_empty(vars::HISTORY_DIR).map(PathBuf::from);

        let baseline = non_empty(vars::BASELINE)
            .map(|value| BaselineSpec::parse(&value))
            .unwrap_or_default();

        let max_previous_reports = match non_empty(vars::MAX_PREVIOUS_REPORTS) {
            Some(value) => value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|max| *max > 0)
                .ok_or(ConfigError::InvalidValue(
                    "INSIGHTS_MAX_PREVIOUS_REPORTS must be a positive number",
                ))?,
            None => defaults::MAX_PREVIOUS_REPORTS,
        };

        let output = non_empty(vars::OUTPUT).map(PathBuf::from);
        let suite_tree_output = non_empty(vars::SUITE_TREE_OUTPUT).map(PathBuf::from);

        Ok(Config {
            current_report,
            history_dir,
            baseline,
            max_previous_reports,
            output,
            suite_tree_output,
        })
    }

    /// Pipeline options derived from this configuration.
    pub fn insights_options(&self) -> InsightsOptions {
        InsightsOptions {
            baseline: self.baseline.clone(),
            max_previous_reports: self.max_previous_reports,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(&'static str),
}
