//! Report loading from the file system.
//!
//! Only this module performs I/O. History files are read concurrently; each
//! one is validated at the parse boundary and skipped when unusable.

use std::path::{Path, PathBuf};

use futures_util::future::join_all;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::Report;

use super::validation::parse_report_str;

/// Read and parse a single report file.
pub async fn load_report(path: &Path) -> AppResult<Report> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::FileSystem(format!("Failed to read report {}: {}", path.display(), e))
    })?;

    parse_report_str(&content).map_err(|e| {
        AppError::ExtractionFailed(format!("Report {} is unusable: {}", path.display(), e))
    })
}

/// Order reports newest-first (timestamp, falling back to summary start).
pub fn sort_newest_first(reports: &mut [Report]) {
    reports.sort_by_key(|report| std::cmp::Reverse(report.sort_key()));
}

/// List the `*.json` files of a directory in name order.
async fn list_report_files(dir: &Path) -> AppResult<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::NotFound(format!("History directory {}", dir.display()))
        } else {
            AppError::FileSystem(format!("Failed to list {}: {}", dir.display(), e))
        }
    })?;

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_json = path.extension().is_some_and(|ext| ext == "json");
        if is_json && entry.file_type().await?.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Load historical reports from a directory.
///
/// Unreadable or malformed files are skipped with a warning. The result is
/// ordered newest-first and uncapped; [`enrich_report`](super::pipeline::enrich_report)
/// applies the history cap after dropping copies of the current run.
pub async fn load_history(dir: &Path) -> AppResult<Vec<Report>> {
    let files = list_report_files(dir).await?;
    debug!("Found {} candidate report files in {:?}", files.len(), dir);

    let loaded = join_all(files.iter().map(|path| load_report(path))).await;

    let mut reports: Vec<Report> = loaded
        .into_iter()
        .filter_map(|result| match result {
            Ok(report) => Some(report),
            Err(e) => {
                warn!("Skipping historical report: {}", e);
                None
            }
        })
        .collect();

    sort_newest_first(&mut reports);

    info!("Loaded {} historical reports from {:?}", reports.len(), dir);
    Ok(reports)
}
