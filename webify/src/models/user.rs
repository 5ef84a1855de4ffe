use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{ValidationError, ValidationResult},
    policy::Role,
    store::Entity,
    validators::{check_url, require_text_if_present},
};

/// Cached engagement counters embedded in every user record.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct UserStats {
    pub posts_created: u64,
    pub posts_liked: u64,
    pub projects_created: u64,
    pub projects_liked: u64,
    pub blogs_created: u64,
    pub blogs_liked: u64,
    pub comments_created: u64,
    pub comments_liked: u64,
    pub shares: u64,
    /// Users who liked this profile.
    pub liked_by: Vec<String>,
    pub online: bool,
}

impl UserStats {
    /// Likes received across every content kind.
    pub fn likes_received(&self) -> u64 {
        self.posts_liked + self.projects_liked + self.blogs_liked
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default)]
    pub stats: UserStats,
}

impl Entity for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Unique-email index entry keyed by the normalized address.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EmailClaim {
    pub id: String,
    pub user_id: String,
}

impl EmailClaim {
    pub const USER_ID: &'static str = "user_id";

    pub fn for_user(user: &User) -> Self {
        Self {
            id: user.email.clone(),
            user_id: user.id.clone(),
        }
    }
}

impl Entity for EmailClaim {
    const COLLECTION: &'static str = "user_emails";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Profile fields a user (or an admin) may change.
#[derive(Serialize, Debug, Clone, Default)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl ProfilePatch {
    pub fn validate(&self) -> ValidationResult<()> {
        let mut issues = Vec::new();
        require_text_if_present("name", self.name.as_deref(), &mut issues);
        check_url("github", self.github.as_deref(), &mut issues);
        check_url("linkedin", self.linkedin.as_deref(), &mut issues);
        check_url("twitter", self.twitter.as_deref(), &mut issues);
        check_url("website", self.website.as_deref(), &mut issues);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(issues))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_default_when_absent() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": "u1",
            "created_at": "2024-01-01T00:00:00Z",
            "email": "a@example.com",
            "name": "A",
        }))
        .unwrap();
        assert_eq!(user.role, Role::User);
        assert_eq!(user.stats, UserStats::default());
    }

    #[test]
    fn profile_patch_rejects_bad_links() {
        let patch = ProfilePatch {
            github: Some("not a url".into()),
            ..Default::default()
        };
        let err = patch.validate().unwrap_err();
        assert!(err.has_field("github"));
    }

    #[test]
    fn profile_patch_skips_unset_fields() {
        let patch = ProfilePatch {
            bio: Some("hi".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, serde_json::json!({"bio": "hi"}));
    }
}
