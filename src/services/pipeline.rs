//! Insights pipeline: run insights, baseline comparison and test insights for
//! the current report in one call.

use tracing::{info, warn};

use crate::models::Report;

use super::baseline::{BaselineSpec, select_baseline_index};
use super::run_insights::{compute_run_insights, with_baseline_comparison};
use super::test_insights::enrich_test_insights;

/// Default cap on how many previous reports are analyzed.
pub const DEFAULT_MAX_PREVIOUS_REPORTS: usize = 10;

/// Options for [`enrich_report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightsOptions {
    /// Which previous report to compare against
    pub baseline: BaselineSpec,
    /// Maximum number of previous reports analyzed
    pub max_previous_reports: usize,
}

impl Default for InsightsOptions {
    fn default() -> Self {
        InsightsOptions {
            baseline: BaselineSpec::Latest,
            max_previous_reports: DEFAULT_MAX_PREVIOUS_REPORTS,
        }
    }
}

fn is_same_run(a: &Report, b: &Report) -> bool {
    a.report_id.is_some() && a.report_id == b.report_id
}

/// Enrich `current` with run insights, baseline comparison and per-test insights.
///
/// `history` must be ordered newest-first. Entries sharing the current
/// `reportId` are dropped before capping. A missing baseline is logged and
/// leaves every baseline/change at 0.
pub fn enrich_report(current: Report, history: Vec<Report>, options: &InsightsOptions) -> Report {
    let mut history: Vec<Report> = history
        .into_iter()
        .filter(|report| !is_same_run(report, &current))
        .collect();
    history.truncate(options.max_previous_reports);

    let mut reports = Vec::with_capacity(history.len() + 1);
    reports.push(current);
    reports.extend(history);

    let mut reports = compute_run_insights(reports);
    let current = reports.remove(0);
    let history = reports;

    let baseline_index = select_baseline_index(&history, &options.baseline);
    let current = match baseline_index {
        Some(index) => with_baseline_comparison(current, &history[index]),
        None => {
            if history.is_empty() {
                info!("No previous reports, insights cover the current run only");
            } else {
                warn!(
                    "No baseline matched {:?}, continuing without baseline comparison",
                    options.baseline
                );
            }
            current
        }
    };

    let baseline = baseline_index.map(|index| &history[index]);
    let enriched = enrich_test_insights(current, &history, baseline);

    info!(
        "Computed insights over {} runs",
        enriched
            .insights
            .as_ref()
            .map(|insights| insights.runs_analyzed)
            .unwrap_or_default()
    );
    enriched
}
