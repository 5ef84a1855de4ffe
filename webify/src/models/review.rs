use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Entity;

/// Author identity copied onto the review when it is written.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReviewAuthor {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReviewTarget {
    App,
    User { id: String },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Review {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub author: ReviewAuthor,
    pub target: ReviewTarget,
    pub target_name: String,
    pub content: String,
    /// 0..=5
    pub rating: u8,
}

impl Review {
    pub fn is_app_review(&self) -> bool {
        matches!(self.target, ReviewTarget::App)
    }

    pub fn target_user_id(&self) -> Option<&str> {
        match &self.target {
            ReviewTarget::User { id } => Some(id),
            ReviewTarget::App => None,
        }
    }
}

impl Entity for Review {
    const COLLECTION: &'static str = "reviews";

    fn id(&self) -> &str {
        &self.id
    }
}
