//! Domain models for CTRF reports and the insights computed over them.

pub mod insights;
pub mod report;
pub mod test_result;
pub mod test_suite;

// Re-export commonly used types
pub use insights::{InsightsMetric, RootInsights, TestInsights};
pub use report::{Baseline, REPORT_FORMAT, Report, ReportEnvironment, Results, Summary, Tool};
pub use test_result::{SuitePath, Test, TestStatus};
pub use test_suite::{SuiteNode, SuiteSummary, TestTree, TreeNode, TreeOptions};
