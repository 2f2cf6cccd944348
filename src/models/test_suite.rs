//! Suite tree model: tests regrouped by their suite path.

use serde::{Deserialize, Serialize};

use super::test_result::{Test, TestStatus};

/// Aggregated counts for a suite (or the whole tree).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteSummary {
    pub tests: u64,
    pub passed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub pending: u64,
    /// `other` and unrecognized statuses
    pub other: u64,
    /// Number of tests classified flaky
    pub flaky: u64,
    /// Sum of test durations in milliseconds
    pub duration: f64,
}

impl SuiteSummary {
    /// Count one test. `flaky` is the caller's classification of it.
    pub fn record(&mut self, test: &Test, flaky: bool) {
        self.tests += 1;
        match test.status {
            TestStatus::Passed => self.passed += 1,
            TestStatus::Failed => self.failed += 1,
            TestStatus::Skipped => self.skipped += 1,
            TestStatus::Pending => self.pending += 1,
            TestStatus::Other | TestStatus::Unknown => self.other += 1,
        }
        if flaky {
            self.flaky += 1;
        }
        self.duration += test.duration;
    }

    /// Add another summary's counts into this one.
    pub fn absorb(&mut self, other: &SuiteSummary) {
        self.tests += other.tests;
        self.passed += other.passed;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self.pending += other.pending;
        self.other += other.other;
        self.flaky += other.flaky;
        self.duration += other.duration;
    }

    /// Status a suite with these counts reports.
    pub fn derived_status(&self) -> TestStatus {
        if self.tests == 0 {
            TestStatus::Other
        } else if self.failed > 0 {
            TestStatus::Failed
        } else if self.pending > 0 {
            TestStatus::Pending
        } else if self.skipped == self.tests {
            TestStatus::Skipped
        } else if self.passed == self.tests {
            TestStatus::Passed
        } else {
            TestStatus::Other
        }
    }
}

/// A suite with its direct tests and nested suites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteNode {
    /// Last path segment
    pub name: String,
    /// Full path, segments joined with ` > `
    pub path: String,
    pub status: TestStatus,
    /// Total duration of every test below this node
    pub duration: f64,
    pub tests: Vec<Test>,
    pub suites: Vec<SuiteNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SuiteSummary>,
}

/// Top-level entry of a tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "nodeType", rename_all = "lowercase")]
pub enum TreeNode {
    Suite(SuiteNode),
    /// A test without any suite, standing alone at the root
    Test(Test),
}

impl TreeNode {
    pub fn name(&self) -> &str {
        match self {
            Self::Suite(suite) => &suite.name,
            Self::Test(test) => &test.name,
        }
    }

    pub fn status(&self) -> TestStatus {
        match self {
            Self::Suite(suite) => suite.status,
            Self::Test(test) => test.status,
        }
    }
}

/// Forest of suites built from a flat test list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestTree {
    pub roots: Vec<TreeNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SuiteSummary>,
}

/// Options for building a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeOptions {
    /// Attach summaries to every suite and to the tree root
    pub include_summary: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        TreeOptions {
            include_summary: true,
        }
    }
}
