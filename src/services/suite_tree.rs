//! Suite tree builder.
//!
//! Regroups a flat test list by suite path. Suites are created once per
//! distinct path prefix and keep first-seen order; suite-less tests become
//! standalone roots.

use std::collections::HashMap;

use crate::models::test_result::LEGACY_SUITE_SEPARATOR;
use crate::models::{SuiteNode, SuiteSummary, Test, TestTree, TreeNode, TreeOptions};

use super::metrics::is_flaky;

/// Suite under construction; children refer to other arena slots.
struct PendingSuite {
    name: String,
    path: String,
    tests: Vec<Test>,
    children: Vec<usize>,
}

enum PendingRoot {
    Suite(usize),
    Test(Test),
}

/// Build a suite tree from `tests`.
pub fn build_suite_tree(tests: &[Test], options: TreeOptions) -> TestTree {
    let mut arena: Vec<PendingSuite> = Vec::new();
    let mut by_path: HashMap<Vec<&str>, usize> = HashMap::new();
    let mut roots: Vec<PendingRoot> = Vec::new();

    for test in tests {
        let segments = test.suite_segments();
        if segments.is_empty() {
            roots.push(PendingRoot::Test(test.clone()));
            continue;
        }

        let mut parent: Option<usize> = None;
        for depth in 1..=segments.len() {
            let prefix = &segments[..depth];
            let index = match by_path.get(prefix) {
                Some(&index) => index,
                None => {
                    let index = arena.len();
                    arena.push(PendingSuite {
                        name: prefix[depth - 1].to_string(),
                        path: prefix.join(LEGACY_SUITE_SEPARATOR),
                        tests: Vec::new(),
                        children: Vec::new(),
                    });
                    by_path.insert(prefix.to_vec(), index);
                    match parent {
                        Some(parent) => arena[parent].children.push(index),
                        None => roots.push(PendingRoot::Suite(index)),
                    }
                    index
                }
            };
            parent = Some(index);
        }

        if let Some(leaf) = parent {
            arena[leaf].tests.push(test.clone());
        }
    }

    let mut slots: Vec<Option<PendingSuite>> = arena.into_iter().map(Some).collect();
    let mut total = SuiteSummary::default();
    let mut nodes = Vec::with_capacity(roots.len());

    for root in roots {
        match root {
            PendingRoot::Suite(index) => {
                if let Some((node, summary)) = finish_suite(index, &mut slots, options) {
                    total.absorb(&summary);
                    nodes.push(TreeNode::Suite(node));
                }
            }
            PendingRoot::Test(test) => {
                total.record(&test, is_flaky(&test));
                nodes.push(TreeNode::Test(test));
            }
        }
    }

    TestTree {
        roots: nodes,
        summary: options.include_summary.then_some(total),
    }
}

/// Turn an arena slot into a finished node, aggregating bottom-up.
fn finish_suite(
    index: usize,
    slots: &mut [Option<PendingSuite>],
    options: TreeOptions,
) -> Option<(SuiteNode, SuiteSummary)> {
    let pending = slots.get_mut(index)?.take()?;

    let mut summary = SuiteSummary::default();
    for test in &pending.tests {
        summary.record(test, is_flaky(test));
    }

    let mut suites = Vec::with_capacity(pending.children.len());
    for child in pending.children {
        if let Some((node, child_summary)) = finish_suite(child, slots, options) {
            summary.absorb(&child_summary);
            suites.push(node);
        }
    }

    let node = SuiteNode {
        name: pending.name,
        path: pending.path,
        status: summary.derived_status(),
        duration: summary.duration,
        tests: pending.tests,
        suites,
        summary: options.include_summary.then(|| summary.clone()),
    };

    Some((node, summary))
}
