//! Test Insights - Main entry point.
//!
//! Loads the current CTRF report and its history, computes insights and
//! writes the enriched report.

use std::path::Path;

use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use mattermost_insights_lib::config::Config;
use mattermost_insights_lib::error::{AppError, AppResult};
use mattermost_insights_lib::models::{Report, TreeOptions};
use mattermost_insights_lib::services::format::{
    format_duration, format_duration_change, format_rate, format_rate_change,
};
use mattermost_insights_lib::services::{build_suite_tree, enrich_report, loader};

/// Validate a single report file (for CI pre-checks).
async fn validate_report_file(path: &Path) -> bool {
    match loader::load_report(path).await {
        Ok(report) => {
            info!(
                "{} is a valid report ({} tests, tool: {})",
                path.display(),
                report.results.tests.len(),
                report.results.tool.name
            );
            true
        }
        Err(e) => {
            error!("{}", e);
            false
        }
    }
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging (stderr, so stdout carries only the report)
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Failed to set tracing subscriber");
    }

    // Check for --validate <path> (used as a CI pre-check)
    let args: Vec<String> = std::env::args().collect();
    if let Some(position) = args.iter().position(|arg| arg == "--validate") {
        let Some(path) = args.get(position + 1) else {
            error!("--validate requires a report path");
            std::process::exit(2);
        };
        let valid = validate_report_file(Path::new(path)).await;
        std::process::exit(if valid { 0 } else { 1 });
    }

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - INSIGHTS_CURRENT_REPORT must point to a CTRF report");
            error!("  - INSIGHTS_MAX_PREVIOUS_REPORTS, if set, must be a positive number");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&config).await {
        error!("Insights computation failed: {}", e);
        std::process::exit(1);
    }
}

/// Load, enrich and write.
async fn run(config: &Config) -> AppResult<()> {
    let current = loader::load_report(&config.current_report).await?;
    info!(
        "Loaded current report {:?} with {} tests",
        config.current_report,
        current.results.tests.len()
    );

    let history = match &config.history_dir {
        Some(dir) => match loader::load_history(dir).await {
            Ok(history) => history,
            Err(e) => {
                warn!("Continuing without history: {}", e);
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    let enriched = enrich_report(current, history, &config.insights_options());
    log_summary(&enriched);

    write_json(config.output.as_deref(), &enriched).await?;

    if let Some(path) = &config.suite_tree_output {
        let tree = build_suite_tree(&enriched.results.tests, TreeOptions::default());
        write_json(Some(path.as_path()), &tree).await?;
        info!("Suite tree written to {}", path.display());
    }

    Ok(())
}

/// One-line overview of the computed run insights.
fn log_summary(report: &Report) {
    let Some(insights) = &report.insights else {
        return;
    };

    info!(
        "Runs analyzed: {} | pass {} ({}) | fail {} ({}) | flaky {} ({}) | p95 run {} ({})",
        insights.runs_analyzed,
        format_rate(insights.pass_rate.current),
        format_rate_change(insights.pass_rate.change),
        format_rate(insights.fail_rate.current),
        format_rate_change(insights.fail_rate.change),
        format_rate(insights.flaky_rate.current),
        format_rate_change(insights.flaky_rate.change),
        format_duration(insights.p95_run_duration.current),
        format_duration_change(insights.p95_run_duration.change),
    );
}

/// Write pretty JSON to a file, or to stdout when no path is given.
async fn write_json<T: Serialize>(path: Option<&Path>, value: &T) -> AppResult<()> {
    let json = serde_json::to_string_pretty(value)?;

    match path {
        Some(path) => tokio::fs::write(path, json).await.map_err(|e| {
            AppError::FileSystem(format!("Failed to write {}: {}", path.display(), e))
        }),
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(json.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
            Ok(())
        }
    }
}
