//! Approval flow API trait

use async_trait::async_trait;

use crate::client::models::{ApprovalFlowSummary, DecisionRequest, FlowType};
use crate::error::Result;

/// Approval flow operations
#[async_trait]
pub trait ApprovalApi: Send + Sync {
    /// List approval flows, optionally restricted to one flow type
    async fn list_approval_flows(&self, flow_type: Option<FlowType>)
    -> Result<Vec<ApprovalFlowSummary>>;

    /// Record a decision on a step and return the server's updated flow
    async fn submit_decision(
        &self,
        flow_type: FlowType,
        entity_id: &str,
        step_id: &str,
        request: &DecisionRequest,
    ) -> Result<ApprovalFlowSummary>;
}
