//! Dashboard role model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dashboard role, ordered by an explicit rank table
///
/// Unknown role strings deserialize to [`Role::Viewer`] so a server that adds a
/// role never grants more than read access on this side.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Role {
    #[default]
    Viewer,
    User,
    Approver,
    Finance,
    Manager,
    Admin,
}

/// Role ranks. Roles sharing a rank satisfy each other's requirements.
const ROLE_RANKS: &[(Role, u8)] = &[
    (Role::Viewer, 0),
    (Role::User, 1),
    (Role::Approver, 2),
    (Role::Finance, 3),
    (Role::Manager, 3),
    (Role::Admin, 4),
];

impl Role {
    /// All roles in rank order
    pub const ALL: [Role; 6] = [
        Role::Viewer,
        Role::User,
        Role::Approver,
        Role::Finance,
        Role::Manager,
        Role::Admin,
    ];

    /// Rank of this role in the lookup table
    pub fn rank(self) -> u8 {
        ROLE_RANKS
            .iter()
            .find(|(role, _)| *role == self)
            .map(|(_, rank)| *rank)
            .unwrap_or(0)
    }

    /// Parse a role name, `None` when it names no known role
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "viewer" => Some(Role::Viewer),
            "user" => Some(Role::User),
            "approver" => Some(Role::Approver),
            "finance" => Some(Role::Finance),
            "manager" => Some(Role::Manager),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Parse a role name, falling back to viewer for anything unknown
    pub fn normalise(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Viewer => "viewer",
            Role::User => "user",
            Role::Approver => "approver",
            Role::Finance => "finance",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Role::normalise(&value)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `subject` holds at least the privileges of `required`
pub fn is_role_at_least(subject: Role, required: Role) -> bool {
    subject.rank() >= required.rank()
}

/// Deserialize a role requirement strictly. Unknown names become `None`,
/// which no actor satisfies.
pub fn required_role<'de, D>(deserializer: D) -> Result<Option<Role>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Role::parse))
}
