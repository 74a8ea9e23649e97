//! Audit log models

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::audit::FilterState;

/// Number of entries requested per page
pub const AUDIT_PAGE_LIMIT: usize = 50;

/// Audit action recorded by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditAction {
    Created,
    Updated,
    Deleted,
    Approved,
    Denied,
}

impl AuditAction {
    pub const ALL: [AuditAction; 5] = [
        AuditAction::Created,
        AuditAction::Updated,
        AuditAction::Deleted,
        AuditAction::Approved,
        AuditAction::Denied,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::Created => "Created",
            AuditAction::Updated => "Updated",
            AuditAction::Deleted => "Deleted",
            AuditAction::Approved => "Approved",
            AuditAction::Denied => "Denied",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity attached to an audit entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Criticality {
    Low,
    Medium,
    High,
    Critical,
}

impl Criticality {
    pub const ALL: [Criticality; 4] = [
        Criticality::Low,
        Criticality::Medium,
        Criticality::High,
        Criticality::Critical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Criticality::Low => "low",
            Criticality::Medium => "medium",
            Criticality::High => "high",
            Criticality::Critical => "critical",
        }
    }
}

impl fmt::Display for Criticality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Criticality {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Criticality::Low),
            "medium" => Ok(Criticality::Medium),
            "high" => Ok(Criticality::High),
            "critical" => Ok(Criticality::Critical),
            other => Err(format!("unknown criticality '{}'", other)),
        }
    }
}

/// A single audit log entry. Entries are assigned by the server and never
/// modified locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub user: String,
    pub action: AuditAction,
    pub target_type: String,
    pub target_id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub source_module: String,
    pub criticality: Criticality,
    #[serde(default)]
    pub details: String,
}

/// Filter vocabularies the server reports alongside a page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterVocabulary {
    #[serde(deserialize_with = "string_list")]
    pub users: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub actions: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub labels: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub source_modules: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub criticalities: Vec<String>,
}

/// One page of audit log results
///
/// Every field tolerates `null` or a wrong JSON type and falls back to its
/// empty value, so a sloppy body never stops paging.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuditLogPage {
    #[serde(deserialize_with = "lenient_entries")]
    pub results: Vec<AuditLogEntry>,
    #[serde(deserialize_with = "null_as_default")]
    pub next_cursor: Option<String>,
    #[serde(deserialize_with = "lenient_bool")]
    pub has_more: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub total: Option<u64>,
    #[serde(deserialize_with = "null_as_default")]
    pub filters: FilterVocabulary,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_bool().unwrap_or(false))
}

/// Anything but an array of strings reads as empty; non-string items are dropped
fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    })
}

/// Decode entries one by one, skipping any that do not match the model
fn lenient_entries<'de, D>(deserializer: D) -> Result<Vec<AuditLogEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<AuditLogEntry>(item) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping undecodable audit entry: {}", e);
                None
            }
        })
        .collect())
}

/// Parameters for a single audit log page request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditQuery {
    pub filters: FilterState,
    pub cursor: Option<String>,
    pub limit: usize,
}

impl AuditQuery {
    pub fn new(filters: FilterState, cursor: Option<String>) -> Self {
        Self {
            filters,
            cursor,
            limit: AUDIT_PAGE_LIMIT,
        }
    }

    /// Convert to query parameters for the API
    pub fn to_query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = self.filters.to_query_pairs();
        if let Some(cursor) = &self.cursor {
            params.push(("cursor", cursor.clone()));
        }
        params.push(("limit", self.limit.to_string()));
        params
    }
}
