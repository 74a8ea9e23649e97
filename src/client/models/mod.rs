//! Dripfy API data models
//!
//! Domain types exchanged with the dashboard API, organized by resource.

mod approval;
mod audit;
mod role;

pub use approval::{
    ApprovalFlowSummary, ApprovalStep, Decision, DecisionRequest, FlowStatus, FlowType,
    PendingUser, StepStatus, Submitter,
};
pub use audit::{
    AUDIT_PAGE_LIMIT, AuditAction, AuditLogEntry, AuditLogPage, AuditQuery, Criticality,
    FilterVocabulary,
};
pub use role::{Role, is_role_at_least};
