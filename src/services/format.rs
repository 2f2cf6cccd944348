//! Display formatting for computed insights.
//!
//! Renderers receive values already rounded by the calculator; these helpers
//! only turn them into text.

/// Format a rate (0..=1) as a percentage with two decimals: `0.1234` → `"12.34%"`.
pub fn format_rate(rate: f64) -> String {
    format!("{:.2}%", rate * 100.0)
}

/// Format a rate delta as signed percentage points: `0.015` → `"+1.50%"`.
pub fn format_rate_change(change: f64) -> String {
    let points = change * 100.0;
    if is_zero(points, 0.005) {
        "0.00%".to_string()
    } else if points > 0.0 {
        format!("+{:.2}%", points)
    } else {
        format!("{:.2}%", points)
    }
}

/// Format a duration in milliseconds for humans.
///
/// `850` → `"850ms"`, `1250` → `"1.25s"`, `125000` → `"2m 5s"`, `3720000` → `"1h 2m"`.
pub fn format_duration(ms: f64) -> String {
    if !ms.is_finite() || ms <= 0.0 {
        return "0ms".to_string();
    }
    if ms < 1_000.0 {
        return format!("{}ms", ms.round() as u64);
    }
    if ms < 60_000.0 {
        return format!("{:.2}s", ms / 1_000.0);
    }

    let total_secs = (ms / 1_000.0).round() as u64;
    let hours = total_secs / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m {}s", minutes, seconds)
    }
}

/// Format a duration delta with an explicit sign: `120` → `"+120ms"`, `-1500` → `"-1.50s"`.
pub fn format_duration_change(change_ms: f64) -> String {
    if !change_ms.is_finite() || is_zero(change_ms, 0.5) {
        return "0ms".to_string();
    }
    let sign = if change_ms > 0.0 { "+" } else { "-" };
    format!("{}{}", sign, format_duration(change_ms.abs()))
}

fn is_zero(value: f64, tolerance: f64) -> bool {
    value.abs() < tolerance
}
