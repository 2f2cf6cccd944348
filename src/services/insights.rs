//! Insight calculator: rates, averages and percentiles over aggregated metrics.
//!
//! Rates are rounded to 4 decimals, durations to 2. Every division is guarded
//! and yields 0 for an empty denominator.

use crate::models::InsightsMetric;

use super::metrics::{AggregatedRunMetrics, AggregatedTestMetrics, OutcomeCounts};

/// Decimal places kept for rates.
pub const RATE_DECIMALS: u32 = 4;

/// Decimal places kept for durations.
pub const DURATION_DECIMALS: u32 = 2;

/// Percentile used for duration outliers.
const P95: f64 = 0.95;

/// Round half away from zero to the given number of decimals.
///
/// Non-finite input rounds to 0.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Share of results that passed.
pub fn pass_rate(metrics: &impl OutcomeCounts) -> f64 {
    round_to(
        ratio(
            metrics.total_results_passed() as f64,
            metrics.total_results() as f64,
        ),
        RATE_DECIMALS,
    )
}

/// Share of results that failed.
pub fn fail_rate(metrics: &impl OutcomeCounts) -> f64 {
    round_to(
        ratio(
            metrics.total_results_failed() as f64,
            metrics.total_results() as f64,
        ),
        RATE_DECIMALS,
    )
}

/// Run-level flaky rate: flaky retries over results plus flaky retries.
pub fn flaky_rate(metrics: &impl OutcomeCounts) -> f64 {
    let flaky_attempts = metrics.total_attempts_flaky() as f64;
    round_to(
        ratio(flaky_attempts, metrics.total_results() as f64 + flaky_attempts),
        RATE_DECIMALS,
    )
}

/// Test-level flaky rate: flaky retries over all attempts.
///
/// Differs from [`flaky_rate`] in its denominator; consumers of per-test
/// insights depend on this variant.
pub fn test_flaky_rate(metrics: &impl OutcomeCounts) -> f64 {
    round_to(
        ratio(
            metrics.total_attempts_flaky() as f64,
            metrics.total_attempts() as f64,
        ),
        RATE_DECIMALS,
    )
}

/// Mean final-attempt duration per result.
pub fn average_test_duration(metrics: &impl OutcomeCounts) -> f64 {
    round_to(
        ratio(
            metrics.total_results_duration(),
            metrics.total_results() as f64,
        ),
        DURATION_DECIMALS,
    )
}

/// Summed test duration per analyzed report.
pub fn average_run_duration(metrics: &AggregatedRunMetrics) -> f64 {
    round_to(
        ratio(
            metrics.total_results_duration,
            metrics.reports_analyzed as f64,
        ),
        DURATION_DECIMALS,
    )
}

/// 95th percentile (nearest rank) of the given values.
///
/// Sorts ascending and picks index `ceil(n * 0.95) - 1`. Empty input gives 0.
pub fn p95(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (sorted.len() as f64 * P95).ceil() as usize;
    let index = rank.saturating_sub(1).min(sorted.len() - 1);

    round_to(sorted[index], DURATION_DECIMALS)
}

/// p95 of each report's wall-clock duration.
pub fn p95_run_duration(metrics: &AggregatedRunMetrics) -> f64 {
    p95(&metrics.run_durations)
}

/// p95 of a test's per-occurrence durations.
pub fn p95_test_duration(metrics: &AggregatedTestMetrics) -> f64 {
    p95(&metrics.durations)
}

/// Build a metric from a current and a baseline value; `change` keeps the given precision.
pub fn compare(current: f64, baseline: f64, decimals: u32) -> InsightsMetric {
    InsightsMetric {
        current,
        baseline,
        change: round_to(current - baseline, decimals),
    }
}
