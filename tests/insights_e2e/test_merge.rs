//! Merging reports before aggregation.

use mattermost_insights_lib::services::metrics::{TestMetricsMap, consolidate};
use mattermost_insights_lib::services::{aggregate, merge_reports};

use super::test_helpers::{TOOL, day, parse, report_json, retried, test_entry};

fn shard(id: &str, n: u32, start: i64, stop: i64) -> serde_json::Value {
    report_json(
        id,
        &day(n),
        vec![
            test_entry("checkout", "passed", 40.0 * f64::from(n)),
            retried(test_entry("search", "passed", 15.0), n),
            retried(test_entry("profile", "failed", 22.0), 1),
            test_entry("settings", "skipped", 0.0),
        ],
        start,
        stop,
    )
}

/// Per-report presence differs by construction once merged; compare the rest.
fn without_run_presence(mut metrics: TestMetricsMap) -> TestMetricsMap {
    for accumulator in metrics.values_mut() {
        accumulator.appears_in_runs = 0;
    }
    metrics
}

#[test]
fn test_merge_is_transparent_to_aggregation() {
    let a = parse(shard("shard-1", 1, 1_000, 5_000));
    let b = parse(shard("shard-2", 2, 2_000, 9_000));

    let separate = aggregate([&a, &b]);
    let merged = merge_reports(vec![a.clone(), b.clone()]).unwrap();
    let combined = aggregate([&merged]);

    assert_eq!(without_run_presence(combined), without_run_presence(separate));

    let separate_run = consolidate(&[a.clone(), b.clone()]);
    let merged_run = consolidate(std::slice::from_ref(&merged));
    assert_eq!(merged_run.total_results, separate_run.total_results);
    assert_eq!(merged_run.total_attempts, separate_run.total_attempts);
    assert_eq!(merged_run.total_attempts_flaky, separate_run.total_attempts_flaky);
    assert_eq!(
        merged_run.total_results_duration,
        separate_run.total_results_duration
    );
}

#[test]
fn test_merged_summary_is_field_sum() {
    let a = parse(shard("shard-1", 1, 1_000, 5_000));
    let b = parse(shard("shard-2", 2, 2_000, 9_000));

    let merged = merge_reports(vec![a.clone(), b.clone()]).unwrap();
    let summary = &merged.results.summary;
    let (sa, sb) = (&a.results.summary, &b.results.summary);

    assert_eq!(summary.tests, sa.tests + sb.tests);
    assert_eq!(summary.passed, sa.passed + sb.passed);
    assert_eq!(summary.failed, sa.failed + sb.failed);
    assert_eq!(summary.skipped, sa.skipped + sb.skipped);
    assert_eq!(summary.pending, 0);
    assert_eq!(summary.start, 1_000);
    assert_eq!(summary.stop, 9_000);

    assert_eq!(merged.results.tests.len(), 8);
    assert_eq!(merged.results.tool.name, TOOL);
    assert_ne!(merged.report_id, a.report_id);
    assert_ne!(merged.report_id, b.report_id);
}

#[test]
fn test_merged_report_serializes_as_ctrf() {
    let merged = merge_reports(vec![parse(shard("shard-1", 1, 0, 10))]).unwrap();
    let value = serde_json::to_value(&merged).unwrap();

    assert_eq!(value["reportFormat"], "CTRF");
    assert!(value["reportId"].is_string());
    assert!(value["timestamp"].is_string());
    assert!(value["results"]["tests"].is_array());
    assert!(value.get("insights").is_none());
}
