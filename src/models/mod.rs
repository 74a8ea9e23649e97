//! Display models for CLI output
//!
//! Converts API and engine types into rows for table and JSON output.

pub mod display;

pub use display::{
    AuditDisplay, ConfigDisplay, FlowDisplay, SavedFilterDisplay, StepDisplay, describe_filters,
    step_status_label,
};
