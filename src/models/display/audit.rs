//! Audit log display model

use serde::Serialize;
use tabled::Tabled;

use crate::client::models::AuditLogEntry;
use crate::output::formatters::{format_timestamp_local, or_dash, single_line, truncate};

const DETAILS_WIDTH: usize = 60;

/// Audit log row for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct AuditDisplay {
    #[tabled(rename = "TIMESTAMP")]
    pub timestamp: String,

    #[tabled(rename = "USER")]
    pub user: String,

    #[tabled(rename = "ACTION")]
    pub action: String,

    /// `type #id`
    #[tabled(rename = "TARGET")]
    pub target: String,

    #[tabled(rename = "LABEL")]
    pub label: String,

    #[tabled(rename = "MODULE")]
    pub source_module: String,

    #[tabled(rename = "CRITICALITY")]
    pub criticality: String,

    #[tabled(rename = "DETAILS")]
    pub details: String,
}

impl From<&AuditLogEntry> for AuditDisplay {
    fn from(entry: &AuditLogEntry) -> Self {
        Self {
            timestamp: format_timestamp_local(entry.timestamp),
            user: entry.user.clone(),
            action: entry.action.to_string(),
            target: format!("{} #{}", entry.target_type, entry.target_id),
            label: or_dash(&entry.label),
            source_module: or_dash(&entry.source_module),
            criticality: entry.criticality.to_string(),
            details: or_dash(&truncate(&single_line(&entry.details), DETAILS_WIDTH)),
        }
    }
}

impl From<AuditLogEntry> for AuditDisplay {
    fn from(entry: AuditLogEntry) -> Self {
        AuditDisplay::from(&entry)
    }
}
