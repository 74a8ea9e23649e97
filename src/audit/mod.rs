//! Audit log query engine
//!
//! Filter state with URL sync, cursor paging with id de-duplication, saved
//! filter sets and CSV export.

pub mod export;
pub mod filters;
pub mod saved;
pub mod session;

pub use export::{download_csv, to_csv};
pub use filters::{DashboardLocation, FilterState};
pub use saved::{SAVED_FILTERS_KEY, SavedFilterRepository, SavedFilterSet};
pub use session::{AuditLogSession, FetchOptions, FetchOutcome};
