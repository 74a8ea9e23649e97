//! Named filter sets persisted in the local store

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::filters::FilterState;
use crate::store::KeyValueStore;

/// Store key holding the JSON array of saved filter sets
pub const SAVED_FILTERS_KEY: &str = "dripfy.auditLog.savedFilters";

/// A named snapshot of committed filters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedFilterSet {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub filters: FilterState,
    pub created_at: DateTime<Utc>,
}

/// Saved filter sets, read from the store once and written through on change
///
/// Storage failures are logged and never block the in-memory change.
pub struct SavedFilterRepository {
    store: Arc<dyn KeyValueStore>,
    sets: Vec<SavedFilterSet>,
}

impl SavedFilterRepository {
    /// Load saved sets; missing or corrupt data reads as an empty list
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let sets = match store.get(SAVED_FILTERS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<SavedFilterSet>>(&raw) {
                Ok(sets) => sets,
                Err(e) => {
                    warn!("Failed to read saved filters from storage: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to read saved filters from storage: {}", e);
                Vec::new()
            }
        };
        Self { store, sets }
    }

    pub fn list(&self) -> &[SavedFilterSet] {
        &self.sets
    }

    pub fn get(&self, id: &str) -> Option<&SavedFilterSet> {
        self.sets.iter().find(|s| s.id == id)
    }

    /// Save filters under a name. A blank name saves nothing.
    pub fn save(&mut self, name: &str, filters: &FilterState) -> Option<SavedFilterSet> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let now = Utc::now();
        let set = SavedFilterSet {
            id: self.next_id(now),
            name: name.to_string(),
            filters: filters.clone().normalised(),
            created_at: now,
        };

        let mut next = self.sets.clone();
        next.push(set.clone());
        self.commit(next);
        Some(set)
    }

    /// Delete a saved set by id, returning whether it existed
    pub fn delete(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        let next = self.sets.iter().filter(|s| s.id != id).cloned().collect();
        self.commit(next);
        true
    }

    /// `filter-<epoch-ms>`, nudged forward if an id for that millisecond exists
    fn next_id(&self, now: DateTime<Utc>) -> String {
        let mut millis = now.timestamp_millis();
        loop {
            let id = format!("filter-{}", millis);
            if self.get(&id).is_none() {
                return id;
            }
            millis += 1;
        }
    }

    fn commit(&mut self, next: Vec<SavedFilterSet>) {
        match serde_json::to_string(&next) {
            Ok(raw) => {
                if let Err(e) = self.store.set(SAVED_FILTERS_KEY, &raw) {
                    warn!("Failed to persist saved filters: {}", e);
                }
            }
            Err(e) => warn!("Failed to serialize saved filters: {}", e),
        }
        self.sets = next;
    }
}
