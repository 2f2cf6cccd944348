//! Full pipeline: load from disk, enrich, serialize.

use mattermost_insights_lib::config::{Config, vars};
use mattermost_insights_lib::models::Report;
use mattermost_insights_lib::services::loader::{load_history, load_report};
use mattermost_insights_lib::services::{BaselineSpec, InsightsOptions, enrich_report};
use serde_json::{Value, json};
use tempfile::TempDir;

use super::test_helpers::{day, report_json, retried, test_entry, write_json};

/// Writes `current.json` at the top level and two previous runs (plus a copy
/// of the current one) under `history/`.
fn write_fixture(dir: &TempDir) -> Value {
    let history = dir.path().join("history");
    std::fs::create_dir(&history).unwrap();

    write_json(
        &history,
        "run-1.json",
        &report_json(
            "r1",
            &day(1),
            vec![
                test_entry("t1", "passed", 100.0),
                test_entry("t2", "failed", 50.0),
            ],
            0,
            1_000,
        ),
    );
    write_json(
        &history,
        "run-2.json",
        &report_json(
            "r2",
            &day(2),
            vec![
                retried(test_entry("t1", "passed", 120.0), 1),
                test_entry("t2", "passed", 60.0),
            ],
            0,
            2_000,
        ),
    );

    let current = report_json(
        "c",
        &day(3),
        vec![
            test_entry("t1", "passed", 80.0),
            test_entry("t2", "failed", 40.0),
            test_entry("t3", "passed", 10.0),
        ],
        0,
        1_500,
    );
    write_json(dir.path(), "current.json", &current);
    write_json(&history, "run-3.json", &current);
    current
}

async fn run_pipeline(dir: &TempDir, options: &InsightsOptions) -> Report {
    let current = load_report(&dir.path().join("current.json")).await.unwrap();
    let history = load_history(&dir.path().join("history")).await.unwrap();
    enrich_report(current, history, options)
}

#[tokio::test]
async fn test_enriches_current_report_from_history() {
    let dir = TempDir::new().unwrap();
    write_fixture(&dir);

    let enriched = run_pipeline(&dir, &InsightsOptions::default()).await;
    let insights = enriched.insights.as_ref().unwrap();

    // current run plus r2 and r1; the copy of the current run is not counted twice
    assert_eq!(insights.runs_analyzed, 3);

    assert_eq!(insights.pass_rate.current, 0.7143);
    assert_eq!(insights.pass_rate.baseline, 0.75);
    assert_eq!(insights.pass_rate.change, -0.0357);

    assert_eq!(insights.fail_rate.current, 0.2857);
    assert_eq!(insights.fail_rate.baseline, 0.25);
    assert_eq!(insights.fail_rate.change, 0.0357);

    assert_eq!(insights.flaky_rate.current, 0.125);
    assert_eq!(insights.flaky_rate.baseline, 0.2);
    assert_eq!(insights.flaky_rate.change, -0.075);

    assert_eq!(insights.average_test_duration.current, 65.71);
    assert_eq!(insights.average_test_duration.baseline, 82.5);
    assert_eq!(insights.average_run_duration.current, 153.33);
    assert_eq!(insights.average_run_duration.baseline, 165.0);
    assert_eq!(insights.average_run_duration.change, -11.67);
    assert_eq!(insights.p95_run_duration.current, 2_000.0);
    assert_eq!(insights.p95_run_duration.change, 0.0);

    let baseline = enriched.baseline.as_ref().unwrap();
    assert_eq!(baseline.report_id.as_deref(), Some("r2"));
    assert_eq!(baseline.source.as_deref(), Some("playwright"));

    let extra = insights.extra.as_ref().unwrap();
    assert_eq!(extra["testsAdded"], json!(["t3"]));
    assert_eq!(extra["testsRemoved"], json!([]));
}

#[tokio::test]
async fn test_enriches_every_test() {
    let dir = TempDir::new().unwrap();
    write_fixture(&dir);

    let enriched = run_pipeline(&dir, &InsightsOptions::default()).await;
    let tests = &enriched.results.tests;

    let t1 = tests[0].insights.as_ref().unwrap();
    assert_eq!(t1.pass_rate.current, 1.0);
    assert_eq!(t1.pass_rate.change, 0.0);
    // one flaky retry over four attempts
    assert_eq!(t1.flaky_rate.current, 0.25);
    assert_eq!(t1.flaky_rate.baseline, 0.3333);
    assert_eq!(t1.flaky_rate.change, -0.0833);
    assert_eq!(t1.average_test_duration.current, 100.0);
    assert_eq!(t1.average_test_duration.baseline, 110.0);
    assert_eq!(t1.average_test_duration.change, -10.0);
    assert_eq!(t1.p95_test_duration.current, 120.0);
    assert_eq!(t1.executed_in_runs, 3);

    let t2 = tests[1].insights.as_ref().unwrap();
    assert_eq!(t2.pass_rate.current, 0.3333);
    assert_eq!(t2.fail_rate.current, 0.6667);
    assert_eq!(t2.pass_rate.baseline, 0.5);
    assert_eq!(t2.pass_rate.change, -0.1667);

    // new test: nothing to compare against
    let t3 = tests[2].insights.as_ref().unwrap();
    assert_eq!(t3.pass_rate.current, 1.0);
    assert_eq!(t3.pass_rate.baseline, 0.0);
    assert_eq!(t3.pass_rate.change, 1.0);
    assert_eq!(t3.executed_in_runs, 1);
}

#[tokio::test]
async fn test_offset_baseline_is_clamped_to_oldest() {
    let dir = TempDir::new().unwrap();
    write_fixture(&dir);
    let options = InsightsOptions {
        baseline: BaselineSpec::Offset(5),
        ..Default::default()
    };

    let enriched = run_pipeline(&dir, &options).await;
    let insights = enriched.insights.as_ref().unwrap();

    assert_eq!(
        enriched.baseline.as_ref().unwrap().report_id.as_deref(),
        Some("r1")
    );
    // r1 alone: one pass, one failure
    assert_eq!(insights.pass_rate.baseline, 0.5);

    let t1 = enriched.results.tests[0].insights.as_ref().unwrap();
    assert_eq!(t1.flaky_rate.baseline, 0.0);
    assert_eq!(t1.average_test_duration.baseline, 100.0);
}

#[tokio::test]
async fn test_output_uses_ctrf_field_names() {
    let dir = TempDir::new().unwrap();
    let original = write_fixture(&dir);

    let enriched = run_pipeline(&dir, &InsightsOptions::default()).await;
    let value = serde_json::to_value(&enriched).unwrap();

    for field in [
        "passRate",
        "failRate",
        "flakyRate",
        "averageRunDuration",
        "p95RunDuration",
        "averageTestDuration",
    ] {
        let metric = &value["insights"][field];
        assert!(metric["current"].is_number(), "{}", field);
        assert!(metric["baseline"].is_number(), "{}", field);
        assert!(metric["change"].is_number(), "{}", field);
    }
    assert_eq!(value["insights"]["runsAnalyzed"], 3);
    assert_eq!(value["baseline"]["reportId"], "r2");

    let test = &value["results"]["tests"][0];
    assert_eq!(test["insights"]["executedInRuns"], 3);
    assert!(test["insights"]["p95TestDuration"]["current"].is_number());
    assert_eq!(test["insights"]["extra"]["runFlakyRate"], 0.25);

    // input fields survive enrichment
    assert_eq!(value["reportId"], original["reportId"]);
    assert_eq!(value["results"]["summary"], original["results"]["summary"]);
}

#[tokio::test]
async fn test_configured_history_cap() {
    let dir = TempDir::new().unwrap();
    write_fixture(&dir);
    let current_path = dir.path().join("current.json");
    let current_path = current_path.to_string_lossy().into_owned();

    let config = Config::from_lookup(|key: &str| match key {
        vars::CURRENT_REPORT => Some(current_path.clone()),
        vars::MAX_PREVIOUS_REPORTS => Some("1".to_string()),
        _ => None,
    })
    .unwrap();
    let options = config.insights_options();

    let current = load_report(&config.current_report).await.unwrap();
    // the copy of the current run is the newest history entry
    let history = load_history(&dir.path().join("history")).await.unwrap();
    let enriched = enrich_report(current, history, &options);

    // current run plus only r2
    assert_eq!(enriched.insights.as_ref().unwrap().runs_analyzed, 2);
}

#[tokio::test]
async fn test_history_cap_counts_only_previous_runs() {
    let dir = TempDir::new().unwrap();
    write_fixture(&dir);
    let options = InsightsOptions {
        max_previous_reports: 2,
        ..Default::default()
    };

    let enriched = run_pipeline(&dir, &options).await;

    // the copy of the current run does not take one of the two history slots
    assert_eq!(enriched.insights.as_ref().unwrap().runs_analyzed, 3);
    assert_eq!(
        enriched.baseline.as_ref().unwrap().report_id.as_deref(),
        Some("r2")
    );
}
