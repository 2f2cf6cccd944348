//! Test result model representing one test case's outcome in one run.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::insights::TestInsights;

/// Separator used by legacy reports that flatten the suite path into one string.
pub const LEGACY_SUITE_SEPARATOR: &str = " > ";

/// Test execution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
    Pending,
    Other,
    /// Any status string outside the CTRF vocabulary
    #[serde(other)]
    Unknown,
}

impl TestStatus {
    /// Convert to the CTRF string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::Pending => "pending",
            Self::Other => "other",
            Self::Unknown => "unknown",
        }
    }

    /// Parse from string representation.
    pub fn parse(s: &str) -> Self {
        match s {
            "passed" => Self::Passed,
            "failed" => Self::Failed,
            "skipped" => Self::Skipped,
            "pending" => Self::Pending,
            "other" => Self::Other,
            _ => Self::Unknown,
        }
    }

    /// Whether this is one of the five statuses defined by the report format.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Suite membership as written by the producing tool.
///
/// Current reports carry an ordered list of segments; legacy ones a single
/// `" > "`-joined string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SuitePath {
    Segments(Vec<String>),
    Legacy(String),
}

impl SuitePath {
    /// Normalized segments: trimmed, with empty and whitespace-only segments dropped.
    pub fn segments(&self) -> Vec<&str> {
        let raw: Vec<&str> = match self {
            Self::Segments(parts) => parts.iter().map(String::as_str).collect(),
            Self::Legacy(joined) => joined.split(LEGACY_SUITE_SEPARATOR).collect(),
        };

        raw.into_iter()
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .collect()
    }
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// Individual test outcome within a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Test {
    /// Test name; also the cross-run identity key
    pub name: String,
    /// Final status
    pub status: TestStatus,
    /// Final-attempt duration in milliseconds; missing or null reads as 0
    #[serde(default, deserialize_with = "null_as_zero")]
    pub duration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suite: Option<SuitePath>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
    /// Status string as emitted by the tool, before mapping
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub test_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// Additional attempts beyond the first
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
    /// Explicit flakiness flag set by the tool
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flaky: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
    /// Per-test insights attached by the engine
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<TestInsights>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Map<String, JsonValue>>,
    /// Fields this model does not know about, preserved verbatim
    #[serde(flatten)]
    pub other: Map<String, JsonValue>,
}

impl Test {
    /// Create a test with the given name, status and duration.
    pub fn new(name: impl Into<String>, status: TestStatus, duration: f64) -> Self {
        Test {
            name: name.into(),
            status,
            duration,
            start: None,
            stop: None,
            suite: None,
            message: None,
            trace: None,
            raw_status: None,
            tags: None,
            test_type: None,
            file_path: None,
            retries: None,
            flaky: None,
            browser: None,
            insights: None,
            extra: None,
            other: Map::new(),
        }
    }

    /// Retry count, `0` when absent.
    pub fn retries(&self) -> u32 {
        self.retries.unwrap_or(0)
    }

    /// Normalized suite segments, empty for suite-less tests.
    pub fn suite_segments(&self) -> Vec<&str> {
        self.suite.as_ref().map(SuitePath::segments).unwrap_or_default()
    }
}
