use std::collections::BTreeSet;

use chrono::Utc;
use log::debug;

use super::load_actor;
use crate::{
    errors::WebifyResult,
    id::generate_record_id,
    models::{Skill, SkillDraft, SkillPatch, User},
    policy::{Action, ensure, ensure_owner_or},
    store::{Collection, DocumentStore},
};

pub struct Skills<'s, S> {
    users: Collection<'s, S, User>,
    skills: Collection<'s, S, Skill>,
}

impl<'s, S: DocumentStore> Skills<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            users: Collection::new(store),
            skills: Collection::new(store),
        }
    }

    pub async fn add_skill(&self, actor_id: &str, draft: SkillDraft) -> WebifyResult<Skill> {
        let actor = load_actor(&self.users, actor_id).await?;
        ensure(actor.role, Action::CreateSkill)?;
        draft.validate()?;
        let skill = Skill {
            id: generate_record_id(),
            created_at: Utc::now(),
            user_id: actor.id,
            name: draft.name.trim().to_string(),
            level: draft.level,
            category: draft.category.trim().to_string(),
        };
        self.skills.insert(&skill).await?;
        debug!("skill {} '{}' added for {}", skill.id, skill.name, skill.user_id);
        Ok(skill)
    }

    pub async fn update_skill(&self, actor_id: &str, skill_id: &str, patch: &SkillPatch) -> WebifyResult<Skill> {
        let actor = load_actor(&self.users, actor_id).await?;
        let skill = self.skills.get_or_error(skill_id).await?;
        ensure_owner_or(&actor.id, actor.role, &skill.user_id, Action::UpdateAnyContent)?;
        patch.validate()?;
        self.skills.patch(skill_id, patch).await?;
        debug!("skill {skill_id} updated by {}", actor.id);
        self.skills.get_or_error(skill_id).await
    }

    pub async fn delete_skill(&self, actor_id: &str, skill_id: &str) -> WebifyResult<()> {
        let actor = load_actor(&self.users, actor_id).await?;
        let skill = self.skills.get_or_error(skill_id).await?;
        ensure_owner_or(&actor.id, actor.role, &skill.user_id, Action::DeleteAnyContent)?;
        self.skills.delete(skill_id).await?;
        debug!("skill {skill_id} deleted by {}", actor.id);
        Ok(())
    }

    /// A user's skills sorted by name, optionally narrowed to one category.
    pub async fn user_skills(&self, user_id: &str, category: Option<&str>) -> WebifyResult<Vec<Skill>> {
        let mut skills = self.skills.find_by("user_id", user_id).await?;
        if let Some(category) = category {
            skills.retain(|skill| skill.category.eq_ignore_ascii_case(category));
        }
        skills.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(skills)
    }

    pub async fn skills_by_category(&self, category: &str) -> WebifyResult<Vec<Skill>> {
        let mut skills = self.skills.all().await?;
        skills.retain(|skill| skill.category.eq_ignore_ascii_case(category));
        skills.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(skills)
    }

    /// Distinct categories in use, sorted.
    pub async fn categories(&self) -> WebifyResult<Vec<String>> {
        let categories: BTreeSet<String> = self
            .skills
            .all()
            .await?
            .into_iter()
            .map(|skill| skill.category)
            .collect();
        Ok(categories.into_iter().collect())
    }
}
