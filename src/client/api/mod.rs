//! API trait definitions split by responsibility
//!
//! - [`AuditApi`] - Audit log paging
//! - [`ApprovalApi`] - Approval flow listing and decisions

mod approvals;
mod audit;

pub use approvals::ApprovalApi;
pub use audit::AuditApi;
