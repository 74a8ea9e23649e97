//! Reusable formatting helpers for timestamps and free text in CLI output

use chrono::{DateTime, Local, Utc};

/// Render a UTC timestamp in the local zone, e.g. `2024-03-01 14:30 +03:00`
pub fn format_timestamp_local(timestamp: DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M %:z")
        .to_string()
}

/// Same as [`format_timestamp_local`] but `--` when absent
pub fn format_optional_timestamp(timestamp: Option<DateTime<Utc>>) -> String {
    timestamp
        .map(format_timestamp_local)
        .unwrap_or_else(|| "--".to_string())
}

/// Truncate to `max_chars` characters, adding an ellipsis when cut
///
/// Counts chars rather than bytes so Turkish and German text never splits
/// inside a code point.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", kept)
}

/// Collapse line breaks so multi-line details stay on one table row
pub fn single_line(text: &str) -> String {
    text.split(['\r', '\n'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Empty strings render as `--`
pub fn or_dash(value: &str) -> String {
    if value.trim().is_empty() {
        "--".to_string()
    } else {
        value.to_string()
    }
}
