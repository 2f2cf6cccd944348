//! Metrics aggregation over a set of reports.
//!
//! Folds every test occurrence into a per-test accumulator that keeps
//! attempts (every execution, retries included) apart from results (one
//! final outcome per occurrence). Run-level figures are the sum of those
//! accumulators.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::warn;

use crate::models::{Report, Test, TestStatus};

/// Whether a test is flaky: explicitly flagged, or retried and finally passed.
///
/// A test that was retried and still failed is failed, not flaky. Every
/// flaky count in this crate goes through this function.
pub fn is_flaky(test: &Test) -> bool {
    test.flaky == Some(true) || (test.retries() > 0 && test.status == TestStatus::Passed)
}

/// Key joining occurrences of the same test across reports.
///
/// Currently the raw test name: renames break history and duplicate names
/// share one accumulator.
pub fn test_identity(test: &Test) -> &str {
    &test.name
}

/// Accumulated outcome counts shared by per-test and per-run metrics.
pub trait OutcomeCounts {
    fn total_attempts(&self) -> u64;
    fn total_attempts_flaky(&self) -> u64;
    fn total_results(&self) -> u64;
    fn total_results_passed(&self) -> u64;
    fn total_results_failed(&self) -> u64;
    fn total_results_duration(&self) -> f64;
}

/// Accumulator for one test identity across a set of reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedTestMetrics {
    /// Executions including retries
    pub total_attempts: u64,
    /// Failing executions including retries
    pub total_attempts_failed: u64,
    /// Retries of occurrences classified flaky
    pub total_attempts_flaky: u64,
    pub total_results: u64,
    pub total_results_failed: u64,
    pub total_results_passed: u64,
    /// Skipped, pending and other outcomes together
    pub total_results_skipped: u64,
    pub total_results_flaky: u64,
    /// Sum of final-attempt durations
    pub total_results_duration: f64,
    /// Distinct reports containing this test
    pub appears_in_runs: u64,
    /// Per-occurrence durations, kept for percentiles
    #[serde(skip)]
    pub durations: Vec<f64>,
}

impl AggregatedTestMetrics {
    /// Fold one occurrence of the test into the accumulator.
    ///
    /// Does not touch `appears_in_runs`, which is counted per report.
    pub fn record(&mut self, test: &Test) {
        let retries = u64::from(test.retries());

        self.total_results += 1;
        self.total_attempts += 1 + retries;

        match test.status {
            TestStatus::Failed => {
                self.total_results_failed += 1;
                self.total_attempts_failed += 1 + retries;
            }
            TestStatus::Passed => {
                self.total_results_passed += 1;
                // every attempt before the final pass failed
                self.total_attempts_failed += retries;
            }
            _ => self.total_results_skipped += 1,
        }

        if is_flaky(test) {
            self.total_results_flaky += 1;
            self.total_attempts_flaky += retries;
        }

        self.total_results_duration += test.duration;
        self.durations.push(test.duration);
    }
}

impl OutcomeCounts for AggregatedTestMetrics {
    fn total_attempts(&self) -> u64 {
        self.total_attempts
    }

    fn total_attempts_flaky(&self) -> u64 {
        self.total_attempts_flaky
    }

    fn total_results(&self) -> u64 {
        self.total_results
    }

    fn total_results_passed(&self) -> u64 {
        self.total_results_passed
    }

    fn total_results_failed(&self) -> u64 {
        self.total_results_failed
    }

    fn total_results_duration(&self) -> f64 {
        self.total_results_duration
    }
}

/// Per-test accumulators keyed by [`test_identity`].
pub type TestMetricsMap = HashMap<String, AggregatedTestMetrics>;

/// Aggregate every test occurrence of the given reports.
///
/// Order of reports is irrelevant. Tests with a status outside the CTRF
/// vocabulary are logged and left out.
pub fn aggregate<'a, I>(reports: I) -> TestMetricsMap
where
    I: IntoIterator<Item = &'a Report>,
{
    let mut metrics = TestMetricsMap::new();

    for report in reports {
        let mut seen: HashSet<&str> = HashSet::new();

        for test in &report.results.tests {
            if !test.status.is_recognized() {
                warn!(
                    "Ignoring test '{}' with unrecognized status in report {}",
                    test.name,
                    report.report_id.as_deref().unwrap_or("<no id>")
                );
                continue;
            }

            let key = test_identity(test);
            let entry = metrics.entry(key.to_string()).or_default();
            entry.record(test);

            if seen.insert(key) {
                entry.appears_in_runs += 1;
            }
        }
    }

    metrics
}

/// Sum of all per-test accumulators over a report set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedRunMetrics {
    pub total_attempts: u64,
    pub total_attempts_failed: u64,
    pub total_attempts_flaky: u64,
    pub total_results: u64,
    pub total_results_failed: u64,
    pub total_results_passed: u64,
    pub total_results_skipped: u64,
    pub total_results_flaky: u64,
    pub total_results_duration: f64,
    /// Number of reports folded in
    pub reports_analyzed: usize,
    /// Wall-clock `stop - start` of each report, for the run-duration percentile
    #[serde(skip)]
    pub run_durations: Vec<f64>,
}

impl AggregatedRunMetrics {
    /// Add one test's accumulator.
    pub fn add_test_metrics(&mut self, test: &AggregatedTestMetrics) {
        self.total_attempts += test.total_attempts;
        self.total_attempts_failed += test.total_attempts_failed;
        self.total_attempts_flaky += test.total_attempts_flaky;
        self.total_results += test.total_results;
        self.total_results_failed += test.total_results_failed;
        self.total_results_passed += test.total_results_passed;
        self.total_results_skipped += test.total_results_skipped;
        self.total_results_flaky += test.total_results_flaky;
        self.total_results_duration += test.total_results_duration;
    }

    /// Merge metrics of a disjoint report set into this one.
    pub fn absorb(&mut self, other: &AggregatedRunMetrics) {
        self.total_attempts += other.total_attempts;
        self.total_attempts_failed += other.total_attempts_failed;
        self.total_attempts_flaky += other.total_attempts_flaky;
        self.total_results += other.total_results;
        self.total_results_failed += other.total_results_failed;
        self.total_results_passed += other.total_results_passed;
        self.total_results_skipped += other.total_results_skipped;
        self.total_results_flaky += other.total_results_flaky;
        self.total_results_duration += other.total_results_duration;
        self.reports_analyzed += other.reports_analyzed;
        self.run_durations.extend_from_slice(&other.run_durations);
    }
}

impl OutcomeCounts for AggregatedRunMetrics {
    fn total_attempts(&self) -> u64 {
        self.total_attempts
    }

    fn total_attempts_flaky(&self) -> u64 {
        self.total_attempts_flaky
    }

    fn total_results(&self) -> u64 {
        self.total_results
    }

    fn total_results_passed(&self) -> u64 {
        self.total_results_passed
    }

    fn total_results_failed(&self) -> u64 {
        self.total_results_failed
    }

    fn total_results_duration(&self) -> f64 {
        self.total_results_duration
    }
}

/// Aggregate a report set and sum it into run-level metrics.
pub fn consolidate(reports: &[Report]) -> AggregatedRunMetrics {
    let mut run = AggregatedRunMetrics {
        reports_analyzed: reports.len(),
        run_durations: reports.iter().map(Report::run_duration).collect(),
        ..Default::default()
    };

    for test_metrics in aggregate(reports).values() {
        run.add_test_metrics(test_metrics);
    }

    run
}
