//! Insight models written back onto reports and tests.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// A computed figure with its baseline and the delta between them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightsMetric {
    pub current: f64,
    pub baseline: f64,
    pub change: f64,
}

impl InsightsMetric {
    /// Metric with a current value and no baseline yet.
    pub fn current_only(current: f64) -> Self {
        InsightsMetric {
            current,
            baseline: 0.0,
            change: 0.0,
        }
    }
}

/// Report-level insights.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootInsights {
    pub pass_rate: InsightsMetric,
    pub fail_rate: InsightsMetric,
    pub flaky_rate: InsightsMetric,
    pub average_run_duration: InsightsMetric,
    pub p95_run_duration: InsightsMetric,
    pub average_test_duration: InsightsMetric,
    /// Number of reports folded into these figures
    pub runs_analyzed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Map<String, JsonValue>>,
}

/// Test-level insights.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestInsights {
    pub pass_rate: InsightsMetric,
    pub fail_rate: InsightsMetric,
    pub flaky_rate: InsightsMetric,
    pub average_test_duration: InsightsMetric,
    pub p95_test_duration: InsightsMetric,
    /// Number of analyzed reports containing this test
    pub executed_in_runs: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Map<String, JsonValue>>,
}
