//! Report merging: several runs combined into one document.

use chrono::{SecondsFormat, Utc};
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{REPORT_FORMAT, Report, Summary};

/// Sum optional counters, staying `None` when no input had a value.
fn sum_present<T, I>(values: I) -> Option<T>
where
    T: std::iter::Sum<T>,
    I: IntoIterator<Item = Option<T>>,
{
    let present: Vec<T> = values.into_iter().flatten().collect();
    if present.is_empty() {
        None
    } else {
        Some(present.into_iter().sum())
    }
}

/// Field-by-field sum of summaries; `start` is the earliest, `stop` the latest.
pub fn merge_summaries(summaries: &[&Summary]) -> Summary {
    Summary {
        tests: summaries.iter().map(|s| s.tests).sum(),
        passed: summaries.iter().map(|s| s.passed).sum(),
        failed: summaries.iter().map(|s| s.failed).sum(),
        skipped: summaries.iter().map(|s| s.skipped).sum(),
        pending: summaries.iter().map(|s| s.pending).sum(),
        other: summaries.iter().map(|s| s.other).sum(),
        flaky: sum_present(summaries.iter().map(|s| s.flaky)),
        suites: sum_present(summaries.iter().map(|s| s.suites)),
        start: summaries.iter().map(|s| s.start).min().unwrap_or_default(),
        stop: summaries.iter().map(|s| s.stop).max().unwrap_or_default(),
        duration: sum_present(summaries.iter().map(|s| s.duration)),
        extra: None,
    }
}

/// Merge reports into one: summaries summed, tests concatenated in input order.
///
/// Tool, environment and spec version come from the first report. The result
/// gets a fresh `reportId` and `timestamp`; insights and baseline of the
/// inputs are not carried over.
pub fn merge_reports(reports: Vec<Report>) -> AppResult<Report> {
    let Some(first) = reports.first() else {
        return Err(AppError::InvalidInput(
            "no reports provided to merge".to_string(),
        ));
    };

    let summaries: Vec<&Summary> = reports.iter().map(|r| &r.results.summary).collect();
    let summary = merge_summaries(&summaries);

    let mut merged = Report::new(first.results.tool.name.clone());
    merged.report_format = REPORT_FORMAT.to_string();
    merged.spec_version = first.spec_version.clone();
    merged.report_id = Some(Uuid::new_v4().to_string());
    merged.timestamp = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
    merged.generated_by = first.generated_by.clone();
    merged.results.tool = first.results.tool.clone();
    merged.results.environment = first.results.environment.clone();
    merged.results.summary = summary;

    let source_count = reports.len();
    merged.results.tests = reports
        .into_iter()
        .flat_map(|report| report.results.tests)
        .collect();

    info!(
        "Merged {} reports into {} ({} tests)",
        source_count,
        merged.report_id.as_deref().unwrap_or_default(),
        merged.results.tests.len()
    );

    Ok(merged)
}
