//! Baseline selection among historical reports.

use tracing::warn;

use crate::models::Report;

/// How the comparison report is chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BaselineSpec {
    /// Most recent prior report
    #[default]
    Latest,
    /// Report at this position (0 = most recent), clamped to the last one
    Offset(usize),
    /// Report with this `reportId`
    ReportId(String),
}

impl BaselineSpec {
    /// Parse a user-provided value: integers select by offset, anything else by report ID.
    ///
    /// Negative integers clamp to offset 0; blank input means [`BaselineSpec::Latest`].
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Self::Latest;
        }
        match trimmed.parse::<i64>() {
            Ok(offset) => Self::Offset(usize::try_from(offset.max(0)).unwrap_or(usize::MAX)),
            Err(_) => Self::ReportId(trimmed.to_string()),
        }
    }
}

/// Position of the baseline in `reports` (ordered newest-first), if any.
pub fn select_baseline_index(reports: &[Report], spec: &BaselineSpec) -> Option<usize> {
    if reports.is_empty() {
        return None;
    }

    match spec {
        BaselineSpec::Latest => Some(0),
        BaselineSpec::Offset(offset) => Some((*offset).min(reports.len() - 1)),
        BaselineSpec::ReportId(id) => {
            let found = reports
                .iter()
                .position(|report| report.report_id.as_deref() == Some(id.as_str()));
            if found.is_none() {
                warn!("Baseline report {} not found among {} reports", id, reports.len());
            }
            found
        }
    }
}

/// The baseline report in `reports` (ordered newest-first), if any.
pub fn select_baseline<'a>(reports: &'a [Report], spec: &BaselineSpec) -> Option<&'a Report> {
    select_baseline_index(reports, spec).map(|index| &reports[index])
}
