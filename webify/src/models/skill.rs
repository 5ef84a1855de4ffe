use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{ValidationError, ValidationResult},
    store::Entity,
    validators::{require_text, require_text_if_present},
};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Expert,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Skill {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub user_id: String,
    pub name: String,
    pub level: SkillLevel,
    pub category: String,
}

impl Entity for Skill {
    const COLLECTION: &'static str = "skills";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone)]
pub struct SkillDraft {
    pub name: String,
    pub level: SkillLevel,
    pub category: String,
}

impl SkillDraft {
    pub fn validate(&self) -> ValidationResult<()> {
        let mut issues = Vec::new();
        require_text("name", &self.name, &mut issues);
        require_text("category", &self.category, &mut issues);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(issues))
        }
    }
}

#[derive(Serialize, Debug, Clone, Default)]
pub struct SkillPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<SkillLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl SkillPatch {
    pub fn validate(&self) -> ValidationResult<()> {
        let mut issues = Vec::new();
        require_text_if_present("name", self.name.as_deref(), &mut issues);
        require_text_if_present("category", self.category.as_deref(), &mut issues);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(issues))
        }
    }
}
