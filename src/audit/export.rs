//! CSV export of audit log entries

use chrono::{SecondsFormat, Utc};
use std::path::{Path, PathBuf};

use crate::client::models::AuditLogEntry;
use crate::error::Result;

const HEADER: [&str; 9] = [
    "Timestamp",
    "User",
    "Action",
    "Target",
    "Target ID",
    "Label",
    "Source",
    "Criticality",
    "Details",
];

/// Quote a cell, doubling embedded quotes
fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

fn row(cells: &[&str]) -> String {
    cells.iter().map(|c| quote(c)).collect::<Vec<_>>().join(",")
}

/// Render entries as CSV with a header row. Every cell is quoted and newlines
/// in details are flattened to spaces so each entry stays on one line.
pub fn to_csv(rows: &[AuditLogEntry]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(row(&HEADER));
    for entry in rows {
        let timestamp = entry.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);
        let details = entry.details.replace('\n', " ");
        lines.push(row(&[
            timestamp.as_str(),
            entry.user.as_str(),
            entry.action.as_str(),
            entry.target_type.as_str(),
            entry.target_id.as_str(),
            entry.label.as_str(),
            entry.source_module.as_str(),
            entry.criticality.as_str(),
            details.as_str(),
        ]));
    }
    lines.join("\n")
}

/// Export file name for the given moment: `audit-log-<epoch-ms>.csv`
pub fn export_file_name(now: chrono::DateTime<Utc>) -> String {
    format!("audit-log-{}.csv", now.timestamp_millis())
}

/// Write entries to a new CSV file in `dir`.
///
/// Returns `None` without touching the filesystem when there are no rows.
pub fn download_csv(rows: &[AuditLogEntry], dir: &Path) -> Result<Option<PathBuf>> {
    if rows.is_empty() {
        return Ok(None);
    }
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(Utc::now()));
    std::fs::write(&path, to_csv(rows))?;
    log::debug!("Wrote {} audit entries to {}", rows.len(), path.display());
    Ok(Some(path))
}
