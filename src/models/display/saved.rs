//! Saved filter set display model

use serde::Serialize;
use tabled::Tabled;

use crate::audit::{FilterState, SavedFilterSet};
use crate::output::formatters::format_timestamp_local;

/// Saved filter set row for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct SavedFilterDisplay {
    #[tabled(rename = "ID")]
    pub id: String,

    #[tabled(rename = "NAME")]
    pub name: String,

    /// `key=value` pairs in query order
    #[tabled(rename = "FILTERS")]
    pub filters: String,

    #[tabled(rename = "CREATED")]
    pub created_at: String,
}

/// `user=ayse, label=Finance`, or `(none)` for an empty filter
pub fn describe_filters(filters: &FilterState) -> String {
    let pairs = filters.to_query_pairs();
    if pairs.is_empty() {
        return "(none)".to_string();
    }
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<&SavedFilterSet> for SavedFilterDisplay {
    fn from(set: &SavedFilterSet) -> Self {
        Self {
            id: set.id.clone(),
            name: set.name.clone(),
            filters: describe_filters(&set.filters),
            created_at: format_timestamp_local(set.created_at),
        }
    }
}
