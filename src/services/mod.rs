//! Business logic services.
//!
//! Everything except `loader` is synchronous and free of I/O.

pub mod baseline;
pub mod format;
pub mod insights;
pub mod loader;
pub mod merge;
pub mod metrics;
pub mod pipeline;
pub mod run_insights;
pub mod suite_tree;
pub mod test_insights;
pub mod validation;

pub use baseline::{BaselineSpec, select_baseline};
pub use merge::merge_reports;
pub use metrics::{AggregatedRunMetrics, AggregatedTestMetrics, aggregate, is_flaky};
pub use pipeline::{InsightsOptions, enrich_report};
pub use run_insights::compute_run_insights;
pub use suite_tree::build_suite_tree;
pub use test_insights::enrich_test_insights;
pub use validation::{parse_report, validate_report_value};
