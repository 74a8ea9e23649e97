//! Approval flow models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::role::Role;

/// Kind of entity an approval flow belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FlowType {
    Signup,
    Finance,
    Invoice,
    Task,
}

impl FlowType {
    pub const ALL: [FlowType; 4] = [
        FlowType::Signup,
        FlowType::Finance,
        FlowType::Invoice,
        FlowType::Task,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FlowType::Signup => "signup",
            FlowType::Finance => "finance",
            FlowType::Invoice => "invoice",
            FlowType::Task => "task",
        }
    }
}

impl fmt::Display for FlowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall flow status, rolled up by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FlowStatus::Pending => "pending",
            FlowStatus::Approved => "approved",
            FlowStatus::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// Status of a single step. Only the server moves a step between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Waiting,
    Approved,
    Rejected,
    Skipped,
}

/// Decision submitted for a pending step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Rejected,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Approved => f.write_str("approved"),
            Decision::Rejected => f.write_str("rejected"),
        }
    }
}

/// User eligible to act on a pending step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingUser {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Role,
}

/// Person who submitted the flow's entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submitter {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// One step of an approval flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalStep {
    pub id: String,
    pub label: String,
    /// `None` when the server names a role this client does not know
    #[serde(default, deserialize_with = "super::role::required_role")]
    pub required_role: Option<Role>,
    pub status: StepStatus,
    #[serde(default)]
    pub pending_users: Vec<PendingUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sla_deadline: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sla_seconds_remaining: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sla_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalates_to: Option<Role>,
    #[serde(default)]
    pub notifications: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_by_role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Approval flow as summarized by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalFlowSummary {
    /// `<type>:<entityId>`
    pub id: String,
    #[serde(rename = "type")]
    pub flow_type: FlowType,
    pub entity_id: String,
    #[serde(default)]
    pub reference: String,
    pub title: String,
    pub status: FlowStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_by: Option<Submitter>,
    #[serde(default, deserialize_with = "metadata_strings")]
    pub metadata: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_step_id: Option<String>,
    #[serde(default)]
    pub steps: Vec<ApprovalStep>,
}

impl ApprovalStep {
    /// Required role name for display, `unknown` when unrecognised
    pub fn required_role_label(&self) -> &'static str {
        self.required_role.map_or("unknown", Role::as_str)
    }
}

impl ApprovalFlowSummary {
    pub fn step(&self, step_id: &str) -> Option<&ApprovalStep> {
        self.steps.iter().find(|s| s.id == step_id)
    }

    pub fn has_pending_step(&self) -> bool {
        self.steps.iter().any(|s| s.status == StepStatus::Pending)
    }
}

/// Metadata values arrive as arbitrary JSON; nulls are dropped and scalars are
/// rendered as strings.
fn metadata_strings<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(key, value)| match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) if s.trim().is_empty() => None,
            serde_json::Value::String(s) => Some((key, s)),
            other => Some((key, other.to_string())),
        })
        .collect())
}

/// Body of a decision request
#[derive(Debug, Clone, Serialize)]
pub struct DecisionRequest {
    pub decision: Decision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}
