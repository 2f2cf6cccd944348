//! Report validation: the parse-or-reject boundary for incoming documents.
//!
//! Only the minimal shape is checked up front (`results.tests` list,
//! `results.summary` and `results.tool` objects); serde then enforces the
//! typed model. Everything past this point trusts its input.

use serde_json::Value as JsonValue;
use tracing::warn;

use crate::error::{AppError, AppResult};
use crate::models::Report;

/// Check that a document has the minimal report shape.
pub fn validate_report_value(value: &JsonValue) -> AppResult<()> {
    let results = value
        .get("results")
        .filter(|results| results.is_object())
        .ok_or_else(|| AppError::InvalidInput("report has no 'results' object".to_string()))?;

    if !results.get("tests").is_some_and(JsonValue::is_array) {
        return Err(AppError::InvalidInput(
            "'results.tests' must be a list".to_string(),
        ));
    }
    if !results.get("summary").is_some_and(JsonValue::is_object) {
        return Err(AppError::InvalidInput(
            "'results.summary' must be an object".to_string(),
        ));
    }
    if !results.get("tool").is_some_and(JsonValue::is_object) {
        return Err(AppError::InvalidInput(
            "'results.tool' must be an object".to_string(),
        ));
    }

    Ok(())
}

/// Whether a document has the minimal report shape.
pub fn is_valid_report(value: &JsonValue) -> bool {
    validate_report_value(value).is_ok()
}

/// Validate and deserialize one report document.
pub fn parse_report(value: JsonValue) -> AppResult<Report> {
    validate_report_value(&value)?;
    Ok(serde_json::from_value(value)?)
}

/// Validate and deserialize a report from JSON text.
pub fn parse_report_str(content: &str) -> AppResult<Report> {
    let value: JsonValue = serde_json::from_str(content)?;
    parse_report(value)
}

/// Parse a collection, keeping valid reports and skipping the rest with a warning.
pub fn parse_reports(values: Vec<JsonValue>) -> Vec<Report> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match parse_report(value) {
            Ok(report) => Some(report),
            Err(e) => {
                warn!("Skipping malformed report at position {}: {}", index, e);
                None
            }
        })
        .collect()
}
