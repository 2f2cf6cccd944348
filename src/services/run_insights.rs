//! Run-level insights over report history.
//!
//! Reports are ordered newest-first. The insight of the report at index `i`
//! covers reports `i..` (itself and everything older), i.e. the figures as of
//! that point in history. Baseline and change are left at 0 here and filled by
//! [`with_baseline_comparison`].

use std::collections::BTreeSet;
use std::slice;

use serde_json::{Map, Value as JsonValue};
use tracing::{debug, warn};

use crate::models::{Baseline, InsightsMetric, Report, RootInsights};

use super::insights::{
    DURATION_DECIMALS, RATE_DECIMALS, average_run_duration, average_test_duration, compare,
    fail_rate, flaky_rate, p95_run_duration, pass_rate,
};
use super::metrics::{AggregatedRunMetrics, consolidate, test_identity};

/// Root insights (current values only) for one consolidated report set.
pub fn root_insights_from(metrics: &AggregatedRunMetrics) -> RootInsights {
    RootInsights {
        pass_rate: InsightsMetric::current_only(pass_rate(metrics)),
        fail_rate: InsightsMetric::current_only(fail_rate(metrics)),
        flaky_rate: InsightsMetric::current_only(flaky_rate(metrics)),
        average_run_duration: InsightsMetric::current_only(average_run_duration(metrics)),
        p95_run_duration: InsightsMetric::current_only(p95_run_duration(metrics)),
        average_test_duration: InsightsMetric::current_only(average_test_duration(metrics)),
        runs_analyzed: metrics.reports_analyzed,
        extra: raw_counters(metrics),
    }
}

/// Consolidated counters stashed on the insight for downstream consumers.
fn raw_counters(metrics: &AggregatedRunMetrics) -> Option<Map<String, JsonValue>> {
    match serde_json::to_value(metrics) {
        Ok(JsonValue::Object(map)) => Some(map),
        _ => None,
    }
}

/// Insights for every report in `reports` (newest-first), index for index.
///
/// Folds per-report metrics from the oldest report forward, so each report is
/// aggregated once.
pub fn run_insights_for(reports: &[Report]) -> Vec<RootInsights> {
    let per_report: Vec<AggregatedRunMetrics> = reports
        .iter()
        .map(|report| consolidate(slice::from_ref(report)))
        .collect();

    let mut cumulative = AggregatedRunMetrics::default();
    let mut insights = vec![RootInsights::default(); reports.len()];

    for (index, metrics) in per_report.iter().enumerate().rev() {
        cumulative.absorb(metrics);
        insights[index] = root_insights_from(&cumulative);
    }

    debug!("Computed run insights for {} reports", reports.len());
    insights
}

/// Populate `insights` on every report (newest-first); each report gets its own block.
pub fn compute_run_insights(reports: Vec<Report>) -> Vec<Report> {
    let insights = run_insights_for(&reports);

    reports
        .into_iter()
        .zip(insights)
        .map(|(mut report, insight)| {
            report.insights = Some(insight);
            report
        })
        .collect()
}

/// Compare root insights against a baseline's figures.
///
/// Every metric's `baseline` becomes the baseline's `current` value and
/// `change` the rounded difference.
pub fn compare_root_insights(current: &RootInsights, baseline: &RootInsights) -> RootInsights {
    RootInsights {
        pass_rate: compare(
            current.pass_rate.current,
            baseline.pass_rate.current,
            RATE_DECIMALS,
        ),
        fail_rate: compare(
            current.fail_rate.current,
            baseline.fail_rate.current,
            RATE_DECIMALS,
        ),
        flaky_rate: compare(
            current.flaky_rate.current,
            baseline.flaky_rate.current,
            RATE_DECIMALS,
        ),
        average_run_duration: compare(
            current.average_run_duration.current,
            baseline.average_run_duration.current,
            DURATION_DECIMALS,
        ),
        p95_run_duration: compare(
            current.p95_run_duration.current,
            baseline.p95_run_duration.current,
            DURATION_DECIMALS,
        ),
        average_test_duration: compare(
            current.average_test_duration.current,
            baseline.average_test_duration.current,
            DURATION_DECIMALS,
        ),
        runs_analyzed: current.runs_analyzed,
        extra: current.extra.clone(),
    }
}

/// Tests present in `current` but not `baseline`, and the reverse, by identity.
pub fn test_set_changes(current: &Report, baseline: &Report) -> (Vec<String>, Vec<String>) {
    let current_names: BTreeSet<&str> = current.results.tests.iter().map(test_identity).collect();
    let baseline_names: BTreeSet<&str> =
        baseline.results.tests.iter().map(test_identity).collect();

    let added = current_names
        .difference(&baseline_names)
        .map(|name| name.to_string())
        .collect();
    let removed = baseline_names
        .difference(&current_names)
        .map(|name| name.to_string())
        .collect();

    (added, removed)
}

/// Fill baseline/change of the report's root insights from `baseline` and
/// record the baseline reference.
///
/// A report without insights gets them computed from itself first. A baseline
/// without insights is compared using its own single-report figures.
pub fn with_baseline_comparison(mut report: Report, baseline: &Report) -> Report {
    let current = match report.insights.take() {
        Some(insights) => insights,
        None => {
            warn!("Report has no run insights before baseline comparison, computing from itself");
            root_insights_from(&consolidate(slice::from_ref(&report)))
        }
    };

    let baseline_insights = baseline
        .insights
        .clone()
        .unwrap_or_else(|| root_insights_from(&consolidate(slice::from_ref(baseline))));

    let mut compared = compare_root_insights(&current, &baseline_insights);

    let (added, removed) = test_set_changes(&report, baseline);
    let extra = compared.extra.get_or_insert_with(Map::new);
    extra.insert("testsAdded".to_string(), JsonValue::from(added));
    extra.insert("testsRemoved".to_string(), JsonValue::from(removed));

    report.insights = Some(compared);
    report.baseline = Some(Baseline::from_report(baseline));
    report
}
