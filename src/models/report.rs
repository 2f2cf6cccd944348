//! CTRF report models.
//!
//! Mirrors the Common Test Report Format document: a report wraps one
//! `results` block (tool, summary, tests) plus optional computed insights and
//! a baseline reference written back by the insights engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::insights::RootInsights;
use super::test_result::Test;

/// Value of `reportFormat` for every report this crate produces.
pub const REPORT_FORMAT: &str = "CTRF";

/// Spec version used when synthesizing reports.
pub const DEFAULT_SPEC_VERSION: &str = "0.0.0";

/// One test-execution run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Format tag (always "CTRF" for well-formed input)
    #[serde(default = "default_report_format")]
    pub report_format: String,
    /// Schema version of the document
    #[serde(default = "default_spec_version")]
    pub spec_version: String,
    /// Unique identifier of this run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_id: Option<String>,
    /// Creation time (RFC 3339)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Producer of the document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_by: Option<String>,
    /// Run results
    pub results: Results,
    /// Root-level computed insights
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<RootInsights>,
    /// Report the insights were compared against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline: Option<Baseline>,
    /// Free-form extension map
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Map<String, JsonValue>>,
}

fn default_report_format() -> String {
    REPORT_FORMAT.to_string()
}

fn default_spec_version() -> String {
    DEFAULT_SPEC_VERSION.to_string()
}

impl Report {
    /// Create an empty report for the given tool.
    pub fn new(tool_name: impl Into<String>) -> Self {
        Report {
            report_format: default_report_format(),
            spec_version: default_spec_version(),
            report_id: None,
            timestamp: None,
            generated_by: None,
            results: Results {
                tool: Tool {
                    name: tool_name.into(),
                    version: None,
                    extra: None,
                },
                summary: Summary::default(),
                tests: Vec::new(),
                environment: None,
                extra: None,
            },
            insights: None,
            baseline: None,
            extra: None,
        }
    }

    /// Parsed `timestamp`, if present and valid RFC 3339.
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Point in time used to order reports: the timestamp, else the run start.
    pub fn sort_key(&self) -> i64 {
        self.parsed_timestamp()
            .map(|dt| dt.timestamp_millis())
            .unwrap_or(self.results.summary.start)
    }

    /// Wall-clock duration of the run from the summary (`stop - start`), never negative.
    pub fn run_duration(&self) -> f64 {
        let summary = &self.results.summary;
        summary.stop.saturating_sub(summary.start).max(0) as f64
    }
}

/// Results block of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Results {
    /// Test tool that produced the run
    pub tool: Tool,
    /// Aggregate counts
    pub summary: Summary,
    /// Individual test outcomes, in report order
    pub tests: Vec<Test>,
    /// Environment metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<ReportEnvironment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Map<String, JsonValue>>,
}

/// Test tool identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    #[serde(default)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Map<String, JsonValue>>,
}

/// Aggregate counts for a run.
///
/// `tests == passed + failed + skipped + pending + other` holds for consistent
/// reports; nothing here relies on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Summary {
    pub tests: u64,
    pub passed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub pending: u64,
    pub other: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flaky: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suites: Option<u64>,
    /// Run start (epoch milliseconds)
    pub start: i64,
    /// Run stop (epoch milliseconds)
    pub stop: i64,
    /// Run duration in milliseconds, when the tool reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Map<String, JsonValue>>,
}

/// Environment metadata attached to a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEnvironment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_platform: Option<String>,
    /// Any other environment keys, preserved verbatim
    #[serde(flatten)]
    pub other: Map<String, JsonValue>,
}

/// Reference to the report used as comparison point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Baseline {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Where the baseline came from (tool name of the baseline run)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Map<String, JsonValue>>,
}

impl Baseline {
    /// Build a reference pointing at the given report.
    pub fn from_report(report: &Report) -> Self {
        Baseline {
            report_id: report.report_id.clone(),
            timestamp: report.timestamp.clone(),
            source: Some(report.results.tool.name.clone()).filter(|name| !name.is_empty()),
            extra: None,
        }
    }
}
