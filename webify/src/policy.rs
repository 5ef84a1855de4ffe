//! Role policy.
//!
//! One flat table decides which [`Role`] may perform which [`Action`]. Every
//! mutating operation consults it exactly once through [`ensure`] or
//! [`ensure_owner_or`].

use serde::{Deserialize, Serialize};

use crate::errors::{WebifyError, WebifyResult};

/// Account role. Serialized in lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Collaborator,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Collaborator => "collaborator",
            Role::Admin => "admin",
        }
    }

    /// Collaborators and admins may author content.
    pub fn is_contributor(self) -> bool {
        matches!(self, Role::Collaborator | Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = WebifyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "collaborator" | "colab" => Ok(Role::Collaborator),
            "admin" => Ok(Role::Admin),
            other => Err(WebifyError::invalid_argument(
                "role",
                "validation.enum",
                format!("unknown role '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Like,
    Comment,
    Save,
    Share,
    SendMessage,
    ReadMessage,
    JoinGroup,
    SendFriendRequest,
    RespondToFriendRequest,
    LeaveGroup,
    ManageGroup,
    WriteReview,
    CreateContent,
    CreateSkill,
    UpdateAnyContent,
    DeleteAnyContent,
    ViewDashboard,
    ChangeRole,
    DeleteAnyUser,
    UpdateAnyProfile,
    ViewGlobalStats,
}

pub fn can_perform(role: Role, action: Action) -> bool {
    use Action::*;
    match action {
        Like | Comment | Save | Share | SendMessage | ReadMessage | JoinGroup | LeaveGroup | ManageGroup
        | SendFriendRequest | RespondToFriendRequest | WriteReview => true,
        CreateContent | CreateSkill => role.is_contributor(),
        UpdateAnyContent | DeleteAnyContent | ViewDashboard | ChangeRole | DeleteAnyUser | UpdateAnyProfile
        | ViewGlobalStats => role == Role::Admin,
    }
}

pub fn ensure(role: Role, action: Action) -> WebifyResult<()> {
    if can_perform(role, action) {
        Ok(())
    } else {
        Err(WebifyError::denied(action))
    }
}

/// Authorizes an actor against a record owned by `owner_id`.
///
/// The owner is always allowed: the contributor role is checked when a record
/// is created and never re-validated afterwards. Anyone else needs
/// `any_action`.
pub fn ensure_owner_or(actor_id: &str, role: Role, owner_id: &str, any_action: Action) -> WebifyResult<()> {
    if actor_id == owner_id {
        return Ok(());
    }
    ensure(role, any_action)
}
