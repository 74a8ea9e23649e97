//! Audit log API trait

use async_trait::async_trait;

use crate::client::models::{AuditLogPage, AuditQuery};
use crate::error::Result;

/// Read access to the audit log
#[async_trait]
pub trait AuditApi: Send + Sync {
    /// Fetch one page of audit entries for the given filters and cursor.
    ///
    /// A response with `ok != true` or a non-success status is an error whose
    /// message comes from the body's `error` field when present.
    async fn list_audit_logs(&self, query: &AuditQuery) -> Result<AuditLogPage>;
}
