//! Approval desk: the flows visible to one actor and the decisions they make
//!
//! Steps are never moved between states locally. A decision is validated
//! against the local copy (step pending, actor role high enough), relayed to
//! the server, and the server's flow replaces the local one.

use log::{debug, error};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::client::ApprovalApi;
use crate::client::models::{
    ApprovalFlowSummary, ApprovalStep, Decision, DecisionRequest, FlowType, Role, StepStatus,
    is_role_at_least,
};
use crate::error::{ApiError, ApprovalError, Error, Result};
use crate::i18n::Language;

/// Held while a request is outstanding
struct ProcessingGuard<'a>(&'a AtomicBool);

impl<'a> ProcessingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> std::result::Result<Self, ApprovalError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(flag))
            .map_err(|_| ApprovalError::Busy)
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Whether `role` may decide `step` right now
pub fn is_actionable(step: &ApprovalStep, role: Role) -> bool {
    step.status == StepStatus::Pending
        && step
            .required_role
            .is_some_and(|required| is_role_at_least(role, required))
}

pub struct ApprovalDesk {
    client: Arc<dyn ApprovalApi>,
    actor_role: Role,
    language: Language,
    flows: Mutex<Vec<ApprovalFlowSummary>>,
    processing: AtomicBool,
}

impl ApprovalDesk {
    pub fn new(client: Arc<dyn ApprovalApi>, actor_role: Role, language: Language) -> Self {
        Self {
            client,
            actor_role,
            language,
            flows: Mutex::new(Vec::new()),
            processing: AtomicBool::new(false),
        }
    }

    #[cfg(test)]
    pub fn with_flows(self, flows: Vec<ApprovalFlowSummary>) -> Self {
        *self.lock_flows() = flows;
        self
    }

    fn lock_flows(&self) -> MutexGuard<'_, Vec<ApprovalFlowSummary>> {
        self.flows.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn actor_role(&self) -> Role {
        self.actor_role
    }

    pub fn language(&self) -> Language {
        self.language
    }

    #[cfg(test)]
    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    pub fn flows(&self) -> Vec<ApprovalFlowSummary> {
        self.lock_flows().clone()
    }

    pub fn flow(&self, flow_id: &str) -> Option<ApprovalFlowSummary> {
        self.lock_flows().iter().find(|f| f.id == flow_id).cloned()
    }

    /// True while any loaded step waits on a decision
    pub fn has_pending_steps(&self) -> bool {
        self.lock_flows().iter().any(ApprovalFlowSummary::has_pending_step)
    }

    pub fn can_act(&self, step: &ApprovalStep) -> bool {
        is_actionable(step, self.actor_role)
    }

    /// Reload flows from the server, optionally limited to one type
    pub async fn refresh(&self, flow_type: Option<FlowType>) -> Result<usize> {
        let _guard = ProcessingGuard::acquire(&self.processing)?;
        let flows = self.client.list_approval_flows(flow_type).await?;
        let count = flows.len();
        debug!("Loaded {} approval flows", count);
        *self.lock_flows() = flows;
        Ok(count)
    }

    /// Record a decision on a pending step.
    ///
    /// Refused locally, without a request, when the step is unknown, not
    /// pending, or above the actor's role, or while another request is
    /// outstanding. A failed request leaves the local flows untouched.
    pub async fn decide(
        &self,
        flow_id: &str,
        step_id: &str,
        decision: Decision,
        comment: Option<&str>,
    ) -> Result<ApprovalFlowSummary> {
        let _guard = ProcessingGuard::acquire(&self.processing)?;

        let (flow_type, entity_id) = {
            let flows = self.lock_flows();
            let flow = flows
                .iter()
                .find(|f| f.id == flow_id)
                .ok_or_else(|| ApprovalError::FlowNotFound(flow_id.to_string()))?;
            let step = flow.step(step_id).ok_or_else(|| ApprovalError::StepNotFound {
                flow: flow_id.to_string(),
                step: step_id.to_string(),
            })?;
            if !self.can_act(step) {
                debug!(
                    "Refusing decision on {}/{}: status {:?}, requires {}, actor is {}",
                    flow_id, step_id, step.status, step.required_role_label(), self.actor_role
                );
                return Err(ApprovalError::NotActionable(
                    self.language.messages().no_permission.to_string(),
                )
                .into());
            }
            (flow.flow_type, flow.entity_id.clone())
        };

        let request = DecisionRequest {
            decision,
            comment: comment
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        };

        let updated = match self
            .client
            .submit_decision(flow_type, &entity_id, step_id, &request)
            .await
        {
            Ok(flow) => flow,
            Err(e) => {
                error!("Approval decision failed for {}/{}: {}", flow_id, step_id, e);
                let source = match e {
                    Error::Api(api) => api,
                    other => ApiError::InvalidResponse(other.to_string()),
                };
                return Err(ApprovalError::DecisionFailed {
                    message: self.language.messages().decision_failed.to_string(),
                    source,
                }
                .into());
            }
        };

        let mut flows = self.lock_flows();
        match flows.iter_mut().find(|f| f.id == flow_id) {
            Some(slot) => *slot = updated.clone(),
            None => flows.push(updated.clone()),
        }
        Ok(updated)
    }
}
