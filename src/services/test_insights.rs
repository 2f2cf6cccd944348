//! Per-test insights for the current report.

use std::iter;
use std::ptr;
use std::slice;

use serde_json::{Map, Value as JsonValue};
use tracing::{debug, warn};

use crate::models::{Report, TestInsights};

use super::insights::{
    DURATION_DECIMALS, RATE_DECIMALS, average_test_duration, compare, fail_rate, flaky_rate,
    p95_test_duration, pass_rate, test_flaky_rate,
};
use super::metrics::{AggregatedTestMetrics, TestMetricsMap, aggregate, test_identity};

/// Insights for one test from its current-period accumulator and, when the
/// test existed in the baseline period, its baseline accumulator.
pub fn test_insights_from(
    current: &AggregatedTestMetrics,
    baseline: Option<&AggregatedTestMetrics>,
) -> TestInsights {
    let baseline_value =
        |calc: fn(&AggregatedTestMetrics) -> f64| baseline.map(calc).unwrap_or(0.0);

    TestInsights {
        pass_rate: compare(
            pass_rate(current),
            baseline_value(|m| pass_rate(m)),
            RATE_DECIMALS,
        ),
        fail_rate: compare(
            fail_rate(current),
            baseline_value(|m| fail_rate(m)),
            RATE_DECIMALS,
        ),
        flaky_rate: compare(
            test_flaky_rate(current),
            baseline_value(|m| test_flaky_rate(m)),
            RATE_DECIMALS,
        ),
        average_test_duration: compare(
            average_test_duration(current),
            baseline_value(|m| average_test_duration(m)),
            DURATION_DECIMALS,
        ),
        p95_test_duration: compare(
            p95_test_duration(current),
            baseline_value(p95_test_duration),
            DURATION_DECIMALS,
        ),
        executed_in_runs: current.appears_in_runs as usize,
        extra: Some(legacy_figures(current)),
    }
}

/// Raw counters and the run-level flaky rate, kept for older renderers.
fn legacy_figures(metrics: &AggregatedTestMetrics) -> Map<String, JsonValue> {
    let mut extra = Map::new();
    extra.insert("totalAttempts".into(), metrics.total_attempts.into());
    extra.insert("totalAttemptsFailed".into(), metrics.total_attempts_failed.into());
    extra.insert("totalAttemptsFlaky".into(), metrics.total_attempts_flaky.into());
    extra.insert("totalResults".into(), metrics.total_results.into());
    extra.insert("totalResultsFailed".into(), metrics.total_results_failed.into());
    extra.insert("totalResultsFlaky".into(), metrics.total_results_flaky.into());
    extra.insert("runFlakyRate".into(), flaky_rate(metrics).into());
    extra
}

/// Position of `baseline` within `historical`: same object, else same `reportId`.
fn locate_baseline(historical: &[Report], baseline: &Report) -> Option<usize> {
    historical
        .iter()
        .position(|report| ptr::eq(report, baseline))
        .or_else(|| {
            let id = baseline.report_id.as_deref()?;
            historical
                .iter()
                .position(|report| report.report_id.as_deref() == Some(id))
        })
}

/// Accumulators for the baseline period: the baseline and everything older.
fn baseline_period(historical: &[Report], baseline: &Report) -> TestMetricsMap {
    match locate_baseline(historical, baseline) {
        Some(index) => aggregate(&historical[index..]),
        None => {
            warn!(
                "Baseline report {} is not part of the history, comparing against it alone",
                baseline.report_id.as_deref().unwrap_or("<no id>")
            );
            aggregate(slice::from_ref(baseline))
        }
    }
}

/// Attach insights to every test of `current`.
///
/// The current period is `current` plus all of `historical` (newest-first).
/// Without a baseline every `baseline` field is 0. Tests without an
/// accumulator (e.g. unrecognized status) are left untouched.
pub fn enrich_test_insights(
    mut current: Report,
    historical: &[Report],
    baseline: Option<&Report>,
) -> Report {
    let current_accumulators = aggregate(iter::once(&current).chain(historical));
    let baseline_accumulators = baseline.map(|report| baseline_period(historical, report));

    let mut enriched = 0usize;
    for test in &mut current.results.tests {
        let key = test_identity(test);
        let Some(metrics) = current_accumulators.get(key) else {
            continue;
        };
        let baseline_metrics = baseline_accumulators
            .as_ref()
            .and_then(|accumulators| accumulators.get(key));

        test.insights = Some(test_insights_from(metrics, baseline_metrics));
        enriched += 1;
    }

    debug!(
        "Attached test insights to {} of {} tests",
        enriched,
        current.results.tests.len()
    );
    current
}
