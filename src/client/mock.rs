//! Mock Dripfy API client for testing
//!
//! Provides a mock implementation of the API traits for unit testing
//! without making real API calls.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::api::{ApprovalApi, AuditApi};
use super::models::{
    ApprovalFlowSummary, AuditLogPage, AuditQuery, DecisionRequest, FlowType,
};
use crate::error::{ApiError, Result};

/// Mock API client for testing.
///
/// Configure expected responses via builder methods, then use in tests.
///
/// # Example
/// ```ignore
/// let mock = MockDripfyClient::new()
///     .with_audit_pages(vec![page(entries(0..50), Some("c1"), true)])
///     .await;
///
/// let page = mock.list_audit_logs(&AuditQuery::default()).await?;
/// assert_eq!(page.results.len(), 50);
/// ```
#[derive(Default)]
pub struct MockDripfyClient {
    /// Audit pages returned in order, one per call
    audit_pages: Arc<Mutex<VecDeque<AuditLogPage>>>,
    /// Flows to return from list_approval_flows
    flows: Arc<Mutex<Vec<ApprovalFlowSummary>>>,
    /// Flow to return from submit_decision
    decision_result: Arc<Mutex<Option<ApprovalFlowSummary>>>,
    /// Error to return (if any) - consumed on first use
    error: Arc<Mutex<Option<ApiError>>>,
    /// Artificial latency applied to every call
    delay: Arc<Mutex<Option<Duration>>>,
    /// Track number of calls for verification
    call_count: Arc<Mutex<CallCounts>>,
    /// Captured audit queries for test assertions
    captured_queries: Arc<Mutex<Vec<AuditQuery>>>,
    /// Captured decisions for test assertions
    captured_decisions: Arc<Mutex<Vec<CapturedDecision>>>,
}

/// Tracks API call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub list_audit_logs: usize,
    pub list_approval_flows: usize,
    pub submit_decision: usize,
}

impl CallCounts {
    /// Get total number of API calls made.
    pub fn total(&self) -> usize {
        self.list_audit_logs + self.list_approval_flows + self.submit_decision
    }
}

/// Captured decision request for test assertions
#[derive(Debug, Clone)]
pub struct CapturedDecision {
    pub flow_type: FlowType,
    pub entity_id: String,
    pub step_id: String,
    pub request: DecisionRequest,
}

impl MockDripfyClient {
    /// Create a new mock client with default (empty) responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure audit pages; each call pops the next one, then an empty page.
    pub async fn with_audit_pages(self, pages: Vec<AuditLogPage>) -> Self {
        *self.audit_pages.lock().await = pages.into();
        self
    }

    /// Queue one more audit page after those already configured.
    pub async fn push_audit_page(&self, page: AuditLogPage) {
        self.audit_pages.lock().await.push_back(page);
    }

    /// Configure flows to return from list_approval_flows.
    pub async fn with_flows(self, flows: Vec<ApprovalFlowSummary>) -> Self {
        *self.flows.lock().await = flows;
        self
    }

    /// Configure the flow returned from submit_decision.
    pub async fn with_decision_result(self, flow: ApprovalFlowSummary) -> Self {
        *self.decision_result.lock().await = Some(flow);
        self
    }

    /// Configure an error to return on the next API call.
    /// The error is consumed after one use.
    pub async fn with_error(self, error: ApiError) -> Self {
        self.set_error(error).await;
        self
    }

    /// Arm a one-shot error on an already shared mock.
    pub async fn set_error(&self, error: ApiError) {
        *self.error.lock().await = Some(error);
    }

    /// Delay every response by the given duration.
    pub async fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock().await = Some(delay);
        self
    }

    /// Get the call counts for verification in tests.
    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }

    /// Get all captured audit queries.
    pub async fn captured_queries(&self) -> Vec<AuditQuery> {
        self.captured_queries.lock().await.clone()
    }

    /// Get all captured decision requests.
    pub async fn captured_decisions(&self) -> Vec<CapturedDecision> {
        self.captured_decisions.lock().await.clone()
    }

    /// Sleep for the configured delay, then consume a pending error.
    async fn respond(&self) -> Result<()> {
        let delay = *self.delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut error = self.error.lock().await;
        if let Some(e) = error.take() {
            return Err(e.into());
        }
        Ok(())
    }
}

// ============================================================================
// AuditApi Implementation
// ============================================================================

#[async_trait]
impl AuditApi for MockDripfyClient {
    async fn list_audit_logs(&self, query: &AuditQuery) -> Result<AuditLogPage> {
        self.call_count.lock().await.list_audit_logs += 1;
        self.captured_queries.lock().await.push(query.clone());

        self.respond().await?;

        let mut pages = self.audit_pages.lock().await;
        Ok(pages.pop_front().unwrap_or_default())
    }
}

// ============================================================================
// ApprovalApi Implementation
// ============================================================================

#[async_trait]
impl ApprovalApi for MockDripfyClient {
    async fn list_approval_flows(
        &self,
        flow_type: Option<FlowType>,
    ) -> Result<Vec<ApprovalFlowSummary>> {
        self.call_count.lock().await.list_approval_flows += 1;
        self.respond().await?;

        let flows = self.flows.lock().await;
        Ok(flows
            .iter()
            .filter(|f| flow_type.is_none_or(|t| f.flow_type == t))
            .cloned()
            .collect())
    }

    async fn submit_decision(
        &self,
        flow_type: FlowType,
        entity_id: &str,
        step_id: &str,
        request: &DecisionRequest,
    ) -> Result<ApprovalFlowSummary> {
        self.call_count.lock().await.submit_decision += 1;
        self.captured_decisions.lock().await.push(CapturedDecision {
            flow_type,
            entity_id: entity_id.to_string(),
            step_id: step_id.to_string(),
            request: request.clone(),
        });

        self.respond().await?;

        if let Some(flow) = self.decision_result.lock().await.clone() {
            return Ok(flow);
        }
        let flows = self.flows.lock().await;
        flows
            .iter()
            .find(|f| f.flow_type == flow_type && f.entity_id == entity_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound("FLOW_NOT_FOUND".to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fixtures::*;

    #[tokio::test]
    async fn test_mock_client_default_empty() {
        let mock = MockDripfyClient::new();

        let page = mock.list_audit_logs(&AuditQuery::default()).await.unwrap();
        assert!(page.results.is_empty());

        let flows = mock.list_approval_flows(None).await.unwrap();
        assert!(flows.is_empty());
    }

    #[tokio::test]
    async fn test_mock_client_pages_in_order() {
        let mock = MockDripfyClient::new()
            .with_audit_pages(vec![
                page(entries(0..2), Some("c1"), true),
                page(entries(2..3), None, false),
            ])
            .await;

        let first = mock.list_audit_logs(&AuditQuery::default()).await.unwrap();
        let second = mock.list_audit_logs(&AuditQuery::default()).await.unwrap();
        assert_eq!(first.results.len(), 2);
        assert_eq!(first.next_cursor.as_deref(), Some("c1"));
        assert_eq!(second.results[0].id, "log-2");
    }

    #[tokio::test]
    async fn test_mock_client_with_error() {
        let mock = MockDripfyClient::new()
            .with_error(ApiError::Unauthorized)
            .await;

        assert!(mock.list_approval_flows(None).await.is_err());

        // Error is consumed, next call succeeds
        assert!(mock.list_approval_flows(None).await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_client_filters_flows_by_type() {
        let mock = MockDripfyClient::new()
            .with_flows(vec![
                ApprovalFlowBuilder::new(FlowType::Invoice, "INV-1").build(),
                ApprovalFlowBuilder::new(FlowType::Task, "T-1").build(),
            ])
            .await;

        let flows = mock.list_approval_flows(Some(FlowType::Task)).await.unwrap();
        assert_eq!(flows.len(), 1);
        assert_eq!(flows[0].id, "task:T-1");
    }

    #[tokio::test]
    async fn test_mock_client_call_counts() {
        let mock = MockDripfyClient::new();

        mock.list_audit_logs(&AuditQuery::default()).await.unwrap();
        mock.list_audit_logs(&AuditQuery::default()).await.unwrap();
        mock.list_approval_flows(None).await.unwrap();

        let counts = mock.call_counts().await;
        assert_eq!(counts.list_audit_logs, 2);
        assert_eq!(counts.list_approval_flows, 1);
        assert_eq!(counts.total(), 3);
        assert_eq!(mock.captured_queries().await.len(), 2);
    }
}
