//! Test fixtures and builders for API model types
//!
//! Import via `use crate::client::fixtures::*` in test modules.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::BTreeMap;

use super::models::{
    ApprovalFlowSummary, ApprovalStep, AuditAction, AuditLogEntry, AuditLogPage, Criticality,
    FilterVocabulary, FlowStatus, FlowType, PendingUser, Role, StepStatus,
};

/// Fixed instant used as "now" across fixtures
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

// ============================================================================
// AuditLogEntryBuilder
// ============================================================================

/// Builder for creating test AuditLogEntry instances.
///
/// # Example
/// ```ignore
/// let entry = AuditLogEntryBuilder::new("log-1")
///     .user("ayse@dripfy.com")
///     .criticality(Criticality::High)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct AuditLogEntryBuilder {
    entry: AuditLogEntry,
}

impl AuditLogEntryBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            entry: AuditLogEntry {
                target_id: format!("target-{}", id),
                id,
                timestamp: fixed_now(),
                user: "ops@dripfy.com".to_string(),
                action: AuditAction::Updated,
                target_type: "task".to_string(),
                label: "Operations".to_string(),
                source_module: "tasks".to_string(),
                criticality: Criticality::Low,
                details: String::new(),
            },
        }
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.entry.timestamp = timestamp;
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.entry.user = user.into();
        self
    }

    pub fn action(mut self, action: AuditAction) -> Self {
        self.entry.action = action;
        self
    }

    pub fn target(mut self, target_type: impl Into<String>, target_id: impl Into<String>) -> Self {
        self.entry.target_type = target_type.into();
        self.entry.target_id = target_id.into();
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.entry.label = label.into();
        self
    }

    pub fn criticality(mut self, criticality: Criticality) -> Self {
        self.entry.criticality = criticality;
        self
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.entry.details = details.into();
        self
    }

    pub fn build(self) -> AuditLogEntry {
        self.entry
    }
}

/// Entries `log-<start>` through `log-<end - 1>`
pub fn entries(range: std::ops::Range<usize>) -> Vec<AuditLogEntry> {
    range
        .map(|i| AuditLogEntryBuilder::new(format!("log-{}", i)).build())
        .collect()
}

/// A page with the given entries and continuation
pub fn page(results: Vec<AuditLogEntry>, next_cursor: Option<&str>, has_more: bool) -> AuditLogPage {
    AuditLogPage {
        total: Some(results.len() as u64),
        results,
        next_cursor: next_cursor.map(str::to_string),
        has_more,
        filters: FilterVocabulary::default(),
    }
}

// ============================================================================
// ApprovalStepBuilder
// ============================================================================

/// Builder for creating test ApprovalStep instances.
#[derive(Debug, Clone)]
pub struct ApprovalStepBuilder {
    step: ApprovalStep,
}

impl ApprovalStepBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            step: ApprovalStep {
                label: format!("Step {}", id),
                id,
                required_role: Some(Role::Approver),
                status: StepStatus::Waiting,
                pending_users: Vec::new(),
                sla_deadline: None,
                sla_seconds_remaining: None,
                sla_hours: None,
                escalates_to: None,
                notifications: Vec::new(),
                decided_by: None,
                decided_by_role: None,
                decided_at: None,
                comment: None,
            },
        }
    }

    pub fn required_role(mut self, role: Role) -> Self {
        self.step.required_role = Some(role);
        self
    }

    pub fn status(mut self, status: StepStatus) -> Self {
        self.step.status = status;
        self
    }

    pub fn pending(self) -> Self {
        self.status(StepStatus::Pending)
    }

    pub fn pending_user(mut self, name: impl Into<String>, role: Role) -> Self {
        let name = name.into();
        self.step.pending_users.push(PendingUser {
            id: format!("user-{}", name.to_lowercase()),
            name,
            email: None,
            role,
        });
        self
    }

    pub fn sla_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.step.sla_deadline = Some(deadline);
        self
    }

    pub fn sla_seconds_remaining(mut self, seconds: i64) -> Self {
        self.step.sla_seconds_remaining = Some(seconds);
        self
    }

    pub fn escalates_to(mut self, role: Role) -> Self {
        self.step.escalates_to = Some(role);
        self
    }

    pub fn decided(mut self, status: StepStatus, by: impl Into<String>, comment: Option<&str>) -> Self {
        self.step.status = status;
        self.step.decided_by = Some(by.into());
        self.step.decided_at = Some(fixed_now() - Duration::hours(1));
        self.step.comment = comment.map(str::to_string);
        self
    }

    pub fn build(self) -> ApprovalStep {
        self.step
    }
}

// ============================================================================
// ApprovalFlowBuilder
// ============================================================================

/// Builder for creating test ApprovalFlowSummary instances.
///
/// # Example
/// ```ignore
/// let flow = ApprovalFlowBuilder::new(FlowType::Invoice, "INV-1")
///     .step(ApprovalStepBuilder::new("review").pending().build())
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ApprovalFlowBuilder {
    flow: ApprovalFlowSummary,
}

impl ApprovalFlowBuilder {
    pub fn new(flow_type: FlowType, entity_id: impl Into<String>) -> Self {
        let entity_id = entity_id.into();
        Self {
            flow: ApprovalFlowSummary {
                id: format!("{}:{}", flow_type, entity_id),
                flow_type,
                reference: entity_id.clone(),
                title: format!("{} {}", flow_type, entity_id),
                entity_id,
                status: FlowStatus::Pending,
                submitted_at: fixed_now() - Duration::days(1),
                submitted_by: None,
                metadata: BTreeMap::new(),
                current_step_id: None,
                steps: Vec::new(),
            },
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.flow.title = title.into();
        self
    }

    pub fn status(mut self, status: FlowStatus) -> Self {
        self.flow.status = status;
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.flow.metadata.insert(key.into(), value.into());
        self
    }

    pub fn step(mut self, step: ApprovalStep) -> Self {
        if step.status == StepStatus::Pending {
            self.flow.current_step_id = Some(step.id.clone());
        }
        self.flow.steps.push(step);
        self
    }

    pub fn build(self) -> ApprovalFlowSummary {
        self.flow
    }
}
