//! Display model implementations for table and JSON output
//!
//! Display models transform API response types into CLI-friendly formats
//! with appropriate column names and serialization.

mod approval;
mod audit;
mod config;
mod saved;

pub use approval::{FlowDisplay, StepDisplay, step_status_label};
pub use audit::AuditDisplay;
pub use config::ConfigDisplay;
pub use saved::{SavedFilterDisplay, describe_filters};
