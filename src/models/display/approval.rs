//! Approval flow display models

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::Tabled;

use crate::approval::{is_actionable, sla_message};
use crate::client::models::{ApprovalFlowSummary, ApprovalStep, Role, StepStatus};
use crate::i18n::{Language, Messages};
use crate::output::formatters::{format_timestamp_local, truncate};

/// Localized label for a step status
pub fn step_status_label(status: StepStatus, messages: &Messages) -> &'static str {
    match status {
        StepStatus::Pending => messages.status_pending,
        StepStatus::Waiting => messages.status_waiting,
        StepStatus::Approved => messages.status_approved,
        StepStatus::Rejected => messages.status_rejected,
        StepStatus::Skipped => messages.status_skipped,
    }
}

/// One row per flow for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct FlowDisplay {
    #[tabled(rename = "FLOW ID")]
    pub id: String,

    #[tabled(rename = "TYPE")]
    pub flow_type: String,

    #[tabled(rename = "TITLE")]
    pub title: String,

    #[tabled(rename = "STATUS")]
    pub status: String,

    /// Label of the pending step, `--` when none
    #[tabled(rename = "CURRENT STEP")]
    pub current_step: String,

    /// `decided/total`
    #[tabled(rename = "PROGRESS")]
    pub progress: String,

    #[tabled(rename = "SUBMITTED")]
    pub submitted_at: String,
}

impl From<&ApprovalFlowSummary> for FlowDisplay {
    fn from(flow: &ApprovalFlowSummary) -> Self {
        let current_step = flow
            .current_step_id
            .as_deref()
            .and_then(|id| flow.step(id))
            .or_else(|| flow.steps.iter().find(|s| s.status == StepStatus::Pending))
            .map(|s| s.label.clone())
            .unwrap_or_else(|| "--".to_string());

        let decided = flow
            .steps
            .iter()
            .filter(|s| matches!(s.status, StepStatus::Approved | StepStatus::Rejected | StepStatus::Skipped))
            .count();

        Self {
            id: flow.id.clone(),
            flow_type: flow.flow_type.to_string(),
            title: truncate(&flow.title, 40),
            status: flow.status.to_string(),
            current_step,
            progress: format!("{}/{}", decided, flow.steps.len()),
            submitted_at: format_timestamp_local(flow.submitted_at),
        }
    }
}

/// One row per step, rendered for a given actor and language.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct StepDisplay {
    #[tabled(rename = "FLOW ID")]
    pub flow_id: String,

    #[tabled(rename = "STEP")]
    pub step_id: String,

    #[tabled(rename = "LABEL")]
    pub label: String,

    #[tabled(rename = "ROLE")]
    pub required_role: String,

    #[tabled(rename = "STATUS")]
    pub status: String,

    #[tabled(rename = "SLA")]
    pub sla: String,

    #[tabled(rename = "ASSIGNEES")]
    pub assignees: String,

    /// Whether the configured role may decide this step now
    #[tabled(rename = "CAN ACT")]
    pub can_act: String,
}

impl StepDisplay {
    pub fn new(
        flow: &ApprovalFlowSummary,
        step: &ApprovalStep,
        role: Role,
        language: Language,
        now: DateTime<Utc>,
    ) -> Self {
        let messages = language.messages();
        let sla = match step.status {
            StepStatus::Pending => sla_message(step, now, language),
            _ => "--".to_string(),
        };
        let assignees = if step.pending_users.is_empty() {
            match step.status {
                StepStatus::Pending => messages.no_assignees.to_string(),
                _ => "--".to_string(),
            }
        } else {
            step.pending_users
                .iter()
                .map(|u| u.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };

        Self {
            flow_id: flow.id.clone(),
            step_id: step.id.clone(),
            label: step.label.clone(),
            required_role: step.required_role_label().to_string(),
            status: step_status_label(step.status, messages).to_string(),
            sla,
            assignees,
            can_act: if is_actionable(step, role) {
                "\u{2713}".to_string() // checkmark
            } else {
                "".to_string()
            },
        }
    }

    /// Rows for every step of every flow, or only pending ones
    pub fn rows(
        flows: &[ApprovalFlowSummary],
        pending_only: bool,
        role: Role,
        language: Language,
        now: DateTime<Utc>,
    ) -> Vec<Self> {
        flows
            .iter()
            .flat_map(|flow| {
                flow.steps
                    .iter()
                    .filter(move |s| !pending_only || s.status == StepStatus::Pending)
                    .map(move |s| Self::new(flow, s, role, language, now))
            })
            .collect()
    }
}
