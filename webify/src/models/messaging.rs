use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{Entity, Roster};

/// Where a message was delivered.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Recipient {
    Private { user_id: String },
    Group { group_id: String },
}

impl Recipient {
    pub fn id(&self) -> &str {
        match self {
            Recipient::Private { user_id } => user_id,
            Recipient::Group { group_id } => group_id,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub sender_id: String,
    pub recipient: Recipient,
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<String>,
    #[serde(default)]
    pub is_read: bool,
}

impl Message {
    /// Whether this private message travelled between `a` and `b`.
    pub fn between(&self, a: &str, b: &str) -> bool {
        match &self.recipient {
            Recipient::Private { user_id } => {
                (self.sender_id == a && user_id == b) || (self.sender_id == b && user_id == a)
            }
            Recipient::Group { .. } => false,
        }
    }
}

impl Entity for Message {
    const COLLECTION: &'static str = "messages";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Chat group. `admins` is always a subset of `members`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatGroup {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub members: Vec<String>,
    pub admins: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ChatGroup {
    pub const MEMBERS: &'static str = "members";
    pub const ADMINS: &'static str = "admins";
    pub const ROSTER: Roster<'static> = Roster {
        members: Self::MEMBERS,
        admins: Self::ADMINS,
    };

    pub fn is_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|member| member == user_id)
    }

    pub fn is_admin(&self, user_id: &str) -> bool {
        self.admins.iter().any(|admin| admin == user_id)
    }
}

impl Entity for ChatGroup {
    const COLLECTION: &'static str = "chat_groups";

    fn id(&self) -> &str {
        &self.id
    }
}
