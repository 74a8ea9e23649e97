//! Audit log query session
//!
//! Holds committed and draft filters, the loaded pages and the page cursor for
//! one view of the audit log. Every change goes through a named transition on
//! [`AuditLogSession`]; readers get clones.
//!
//! At most one page request runs at a time. Each request is tagged with the
//! filter generation it was issued under. A response that comes back after the
//! filters changed is dropped and the fetch loop reissues a reset fetch for the
//! current filters before releasing the in-flight flag.

use log::{debug, error};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::filters::{DashboardLocation, FilterState};
use super::saved::{SavedFilterRepository, SavedFilterSet};
use crate::client::AuditApi;
use crate::client::models::{
    AuditAction, AuditLogEntry, AuditLogPage, AuditQuery, Criticality, FilterVocabulary,
};

/// How a page fetch should treat existing results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Start over: clear the error and cursor and replace loaded entries
    pub reset: bool,
    /// Cursor to use instead of the stored one (ignored on reset)
    pub cursor_override: Option<String>,
}

impl FetchOptions {
    pub fn reset() -> Self {
        Self {
            reset: true,
            cursor_override: None,
        }
    }

    pub fn next_page(cursor: Option<String>) -> Self {
        Self {
            reset: false,
            cursor_override: cursor,
        }
    }
}

/// Result of a page fetch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A page was merged; `added` counts entries not seen before
    Loaded { added: usize },
    /// Another fetch was already running, or there was nothing more to load
    Skipped,
    /// The request failed; the message is also stored on the session
    Failed(String),
}

#[derive(Debug, Default)]
struct SessionState {
    filters: FilterState,
    draft: FilterState,
    generation: u64,
    logs: Vec<AuditLogEntry>,
    seen: HashSet<String>,
    cursor: Option<String>,
    has_more: bool,
    total: u64,
    error: Option<String>,
    vocabulary: FilterVocabulary,
    location: Option<DashboardLocation>,
}

impl SessionState {
    fn replace_logs(&mut self, entries: Vec<AuditLogEntry>) -> usize {
        self.logs.clear();
        self.seen.clear();
        self.append_unseen(entries)
    }

    fn append_unseen(&mut self, entries: Vec<AuditLogEntry>) -> usize {
        let before = self.logs.len();
        for entry in entries {
            if self.seen.insert(entry.id.clone()) {
                self.logs.push(entry);
            }
        }
        self.logs.len() - before
    }

    fn apply_page(&mut self, page: AuditLogPage, reset: bool) -> FetchOutcome {
        let received = page.results.len() as u64;
        self.vocabulary = page.filters;
        self.cursor = page.next_cursor.filter(|c| !c.is_empty());
        self.has_more = page.has_more;
        self.total = page.total.unwrap_or(received);

        let added = if reset {
            self.replace_logs(page.results)
        } else {
            self.append_unseen(page.results)
        };
        debug!(
            "Merged audit page: {} received, {} new, {} loaded, has_more={}",
            received,
            added,
            self.logs.len(),
            self.has_more
        );
        FetchOutcome::Loaded { added }
    }

    fn apply_failure(&mut self, message: String, reset: bool, seed: &[AuditLogEntry]) -> FetchOutcome {
        error!("Failed to fetch audit logs: {}", message);
        self.error = Some(message.clone());
        self.has_more = false;
        self.cursor = None;
        if reset && !seed.is_empty() {
            self.replace_logs(seed.to_vec());
            self.total = seed.len() as u64;
        }
        FetchOutcome::Failed(message)
    }
}

/// Marks a fetch as running; clears the flag when dropped
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One view of the audit log: filters, loaded pages and saved filter sets
pub struct AuditLogSession {
    client: Arc<dyn AuditApi>,
    seed: Vec<AuditLogEntry>,
    state: Mutex<SessionState>,
    in_flight: AtomicBool,
    saved: Mutex<SavedFilterRepository>,
}

impl AuditLogSession {
    pub fn new(client: Arc<dyn AuditApi>, saved: SavedFilterRepository) -> Self {
        Self {
            client,
            seed: Vec::new(),
            state: Mutex::new(SessionState::default()),
            in_flight: AtomicBool::new(false),
            saved: Mutex::new(saved),
        }
    }

    /// Entries shown before the first page arrives and after a failed reset
    #[cfg(test)]
    pub fn with_seed(mut self, seed: Vec<AuditLogEntry>) -> Self {
        {
            let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
            state.total = seed.len() as u64;
            state.replace_logs(seed.clone());
        }
        self.seed = seed;
        self
    }

    /// Start from the filters encoded in a dashboard location
    pub fn with_location(mut self, location: DashboardLocation) -> Self {
        {
            let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
            state.filters = location.filters();
            state.draft = state.filters.clone();
            state.location = Some(location);
        }
        self
    }

    /// Start from explicit filters, as if they had been in the location
    pub fn with_filters(mut self, filters: FilterState) -> Self {
        {
            let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
            let filters = filters.normalised();
            if let Some(location) = state.location.as_mut() {
                location.replace_filters(&filters);
            }
            state.draft = filters.clone();
            state.filters = filters;
        }
        self
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_saved(&self) -> MutexGuard<'_, SavedFilterRepository> {
        self.saved.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ========================================================================
    // Paging
    // ========================================================================

    /// Fetch one page for the committed filters.
    ///
    /// Does nothing while another fetch is running.
    pub async fn fetch_page(&self, options: FetchOptions) -> FetchOutcome {
        let Some(guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!("Audit fetch already in flight, skipping");
            return FetchOutcome::Skipped;
        };

        let mut options = options;
        loop {
            let (query, generation) = {
                let mut state = self.lock_state();
                if options.reset {
                    state.error = None;
                    state.cursor = None;
                }
                let cursor = if options.reset {
                    None
                } else {
                    options.cursor_override.clone().or_else(|| state.cursor.clone())
                };
                (AuditQuery::new(state.filters.clone(), cursor), state.generation)
            };

            debug!(
                "Fetching audit page (reset={}, cursor={:?})",
                options.reset, query.cursor
            );
            let result = self.client.list_audit_logs(&query).await;

            {
                let mut state = self.lock_state();
                if state.generation == generation {
                    let outcome = match result {
                        Ok(page) => state.apply_page(page, options.reset),
                        Err(e) => state.apply_failure(e.user_message(), options.reset, &self.seed),
                    };
                    // Released under the state lock so a concurrent filter
                    // change either sees the flag cleared or is seen here.
                    drop(guard);
                    return outcome;
                }
            }

            debug!("Discarding audit page for superseded filters");
            options = FetchOptions::reset();
        }
    }

    /// Load the first page, then keep following the cursor until there is no
    /// more data or `max_pages` pages have been loaded
    pub async fn load_pages(&self, max_pages: Option<usize>) -> FetchOutcome {
        let mut outcome = self.fetch_page(FetchOptions::reset()).await;
        let mut pages = 1;
        while matches!(outcome, FetchOutcome::Loaded { .. })
            && max_pages.is_none_or(|max| pages < max)
            && self.has_more()
        {
            outcome = self.on_sentinel_visible().await;
            pages += 1;
        }
        outcome
    }

    /// The end of the list became visible: load the next page if there is one
    /// and nothing is running
    pub async fn on_sentinel_visible(&self) -> FetchOutcome {
        let cursor = {
            let state = self.lock_state();
            if !state.has_more || self.in_flight.load(Ordering::Acquire) {
                return FetchOutcome::Skipped;
            }
            state.cursor.clone()
        };
        self.fetch_page(FetchOptions::next_page(cursor)).await
    }

    // ========================================================================
    // Filters
    // ========================================================================

    /// Commit new filters, drop loaded pages and fetch from the start
    pub async fn apply_filters(&self, next: FilterState) -> FetchOutcome {
        {
            let mut state = self.lock_state();
            let next = next.normalised();
            state.filters = next.clone();
            state.draft = next;
            state.generation += 1;
            state.logs.clear();
            state.seen.clear();
            state.cursor = None;
            state.has_more = false;
            let filters = state.filters.clone();
            if let Some(location) = state.location.as_mut() {
                location.replace_filters(&filters);
            }
        }
        self.fetch_page(FetchOptions::reset()).await
    }

    pub async fn reset_filters(&self) -> FetchOutcome {
        self.apply_filters(FilterState::default()).await
    }

    /// Edit the draft without touching the committed filters
    pub fn update_draft(&self, edit: impl FnOnce(&mut FilterState)) {
        let mut state = self.lock_state();
        edit(&mut state.draft);
    }

    /// Commit the draft
    pub async fn apply_draft(&self) -> FetchOutcome {
        let draft = self.draft();
        self.apply_filters(draft).await
    }

    // ========================================================================
    // Saved filter sets
    // ========================================================================

    /// Save the committed filters under a name; blank names save nothing
    pub fn save_filters(&self, name: &str) -> Option<SavedFilterSet> {
        let filters = self.filters();
        self.lock_saved().save(name, &filters)
    }

    pub fn delete_saved_filter(&self, id: &str) -> bool {
        self.lock_saved().delete(id)
    }

    /// Apply a saved set's filters. Returns `None` when the id is unknown.
    pub async fn apply_saved_filter(&self, id: &str) -> Option<FetchOutcome> {
        let filters = self.lock_saved().get(id).map(|set| set.filters.clone())?;
        Some(self.apply_filters(filters).await)
    }

    pub fn saved_filters(&self) -> Vec<SavedFilterSet> {
        self.lock_saved().list().to_vec()
    }

    // ========================================================================
    // Readers
    // ========================================================================

    pub fn logs(&self) -> Vec<AuditLogEntry> {
        self.lock_state().logs.clone()
    }

    pub fn filters(&self) -> FilterState {
        self.lock_state().filters.clone()
    }

    pub fn draft(&self) -> FilterState {
        self.lock_state().draft.clone()
    }

    pub fn cursor(&self) -> Option<String> {
        self.lock_state().cursor.clone()
    }

    pub fn has_more(&self) -> bool {
        self.lock_state().has_more
    }

    pub fn total(&self) -> u64 {
        self.lock_state().total
    }

    pub fn error(&self) -> Option<String> {
        self.lock_state().error.clone()
    }

    #[cfg(test)]
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Current dashboard address, when the session tracks one
    pub fn location(&self) -> Option<String> {
        self.lock_state()
            .location
            .as_ref()
            .map(|l| l.as_str().to_string())
    }

    pub fn vocabulary(&self) -> FilterVocabulary {
        self.lock_state().vocabulary.clone()
    }

    /// Criticality choices: the server's list, or the fixed levels
    pub fn criticality_options(&self) -> Vec<String> {
        let reported = self.lock_state().vocabulary.criticalities.clone();
        if reported.is_empty() {
            Criticality::ALL.iter().map(|c| c.to_string()).collect()
        } else {
            reported
        }
    }

    /// Action choices: the server's list, or the known actions
    pub fn action_options(&self) -> Vec<String> {
        let reported = self.lock_state().vocabulary.actions.clone();
        if reported.is_empty() {
            AuditAction::ALL.iter().map(|a| a.to_string()).collect()
        } else {
            reported
        }
    }
}
