//! Aggregation and run insights over parsed reports.

use mattermost_insights_lib::models::TestStatus;
use mattermost_insights_lib::services::metrics::consolidate;
use mattermost_insights_lib::services::run_insights::run_insights_for;
use mattermost_insights_lib::services::validation::parse_reports;
use mattermost_insights_lib::services::{
    BaselineSpec, aggregate, compute_run_insights, select_baseline,
};
use serde_json::json;

use super::test_helpers::{day, ids, parse, report_json, retried, test_entry};

#[test]
fn test_failing_retries_are_not_flaky_across_runs() {
    let reports: Vec<_> = (1..=2)
        .map(|n| {
            parse(report_json(
                &format!("r{}", n),
                &day(n),
                vec![
                    retried(test_entry("t1", "failed", 30.0), 2),
                    retried(test_entry("t1", "passed", 100.0), 1),
                ],
                0,
                1_000,
            ))
        })
        .collect();

    let metrics = aggregate(&reports);
    let t1 = &metrics["t1"];

    assert_eq!(t1.total_results, 4);
    assert_eq!(t1.appears_in_runs, 2);
    // 3 attempts for the failing occurrence, 2 for the passing one, per run
    assert_eq!(t1.total_attempts, 10);
    // all failing attempts plus the retry before each pass
    assert_eq!(t1.total_attempts_failed, 8);
    // only the retry of the passing occurrence
    assert_eq!(t1.total_attempts_flaky, 2);
    assert_eq!(t1.total_results_flaky, 2);
}

#[test]
fn test_single_report_counts_occurrences() {
    let report = parse(report_json(
        "r1",
        &day(1),
        vec![
            test_entry("a", "passed", 1.0),
            test_entry("b", "failed", 1.0),
            test_entry("b", "passed", 1.0),
        ],
        0,
        10,
    ));

    let metrics = aggregate([&report]);

    assert_eq!(metrics["a"].total_results, 1);
    assert_eq!(metrics["b"].total_results, 2);
    assert_eq!(metrics["b"].appears_in_runs, 1);
}

#[test]
fn test_unrecognized_status_is_left_out() {
    let report = parse(report_json(
        "r1",
        &day(1),
        vec![
            test_entry("ok", "passed", 5.0),
            test_entry("weird", "exploded", 5.0),
        ],
        0,
        10,
    ));
    assert_eq!(report.results.tests[1].status, TestStatus::Unknown);

    let metrics = aggregate([&report]);
    let run = consolidate(std::slice::from_ref(&report));

    assert!(!metrics.contains_key("weird"));
    assert_eq!(run.total_results, 1);
    assert_eq!(
        run.total_results,
        run.total_results_passed + run.total_results_failed + run.total_results_skipped
    );
}

#[test]
fn test_empty_reports_have_zero_rates() {
    let reports = vec![
        parse(report_json("r2", &day(2), vec![], 0, 0)),
        parse(report_json("r1", &day(1), vec![], 0, 0)),
    ];

    for insights in run_insights_for(&reports) {
        for rate in [
            insights.pass_rate.current,
            insights.fail_rate.current,
            insights.flaky_rate.current,
            insights.average_test_duration.current,
        ] {
            assert_eq!(rate, 0.0);
            assert!(rate.is_finite());
        }
    }
}

#[test]
fn test_recurrence_gives_each_report_its_own_insights() {
    let reports = vec![
        parse(report_json("r3", &day(3), vec![test_entry("t", "failed", 10.0)], 0, 300)),
        parse(report_json("r2", &day(2), vec![test_entry("t", "passed", 10.0)], 0, 200)),
        parse(report_json("r1", &day(1), vec![test_entry("t", "passed", 10.0)], 0, 100)),
    ];

    let enriched = compute_run_insights(reports);
    let pass_rates: Vec<f64> = enriched
        .iter()
        .map(|report| report.insights.as_ref().unwrap().pass_rate.current)
        .collect();

    assert_eq!(ids(&enriched), vec!["r3", "r2", "r1"]);
    assert_eq!(pass_rates, vec![0.6667, 1.0, 1.0]);
    assert_eq!(enriched[0].insights.as_ref().unwrap().runs_analyzed, 3);
    assert_eq!(enriched[2].insights.as_ref().unwrap().runs_analyzed, 1);
}

#[test]
fn test_baseline_selection_on_parsed_history() {
    let reports = parse_reports(vec![
        report_json("r3", &day(3), vec![], 0, 0),
        json!({ "results": "broken" }),
        report_json("r2", &day(2), vec![], 0, 0),
        report_json("r1", &day(1), vec![], 0, 0),
    ]);
    assert_eq!(ids(&reports), vec!["r3", "r2", "r1"]);

    let latest = select_baseline(&reports, &BaselineSpec::Latest).unwrap();
    assert_eq!(latest.report_id.as_deref(), Some("r3"));

    let clamped = select_baseline(&reports, &BaselineSpec::Offset(5)).unwrap();
    assert_eq!(clamped.report_id.as_deref(), Some("r1"));

    let by_id = select_baseline(&reports, &BaselineSpec::parse("r2")).unwrap();
    assert_eq!(by_id.report_id.as_deref(), Some("r2"));

    assert!(select_baseline(&reports, &BaselineSpec::parse("abc")).is_none());
    assert!(select_baseline(&[], &BaselineSpec::Latest).is_none());
}
