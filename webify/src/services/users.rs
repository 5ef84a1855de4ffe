use chrono::Utc;
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::json;

use super::load_actor;
use crate::{
    errors::{WebifyError, WebifyResult},
    id::generate_record_id,
    models::{EmailClaim, ProfilePatch, User, UserStats},
    policy::{Action, Role, ensure, ensure_owner_or},
    store::{Collection, DocumentStore, Entity, MembershipOp},
    validators::is_valid_email,
};

/// Identity store operations.
///
/// Each email maps to at most one user through an [`EmailClaim`]. A new
/// user record is written first and the claim second; whoever loses the
/// claim removes its own record and returns the winner's.
pub struct Users<'s, S> {
    users: Collection<'s, S, User>,
    emails: Collection<'s, S, EmailClaim>,
}

const CLAIM_ATTEMPTS: usize = 3;

#[derive(Serialize)]
struct RolePatch {
    role: Role,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

impl<'s, S: DocumentStore> Users<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            users: Collection::new(store),
            emails: Collection::new(store),
        }
    }

    /// The user holding the claim on `email`. A claim whose user record is
    /// gone is released.
    async fn registered(&self, email: &str) -> WebifyResult<Option<User>> {
        let Some(claim) = self.emails.get(email).await? else {
            return Ok(None);
        };
        if let Some(user) = self.users.get(&claim.user_id).await? {
            return Ok(Some(user));
        }
        warn!("releasing stale email claim {email} -> {}", claim.user_id);
        self.emails.delete_if(email, EmailClaim::USER_ID, &claim.user_id).await?;
        Ok(None)
    }

    /// Returns the user registered under `email`, creating it with role
    /// `user` and zeroed stats on first sight.
    pub async fn register(&self, email: &str, name: &str, image_url: Option<String>) -> WebifyResult<User> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(WebifyError::invalid_argument(
                "email",
                "validation.email",
                format!("'{email}' is not a valid email address"),
            ));
        }
        let name = match name.trim() {
            "" => email.split('@').next().unwrap_or_default().to_string(),
            trimmed => trimmed.to_string(),
        };

        for _ in 0..CLAIM_ATTEMPTS {
            if let Some(existing) = self.registered(&email).await? {
                debug!("register {email}: already known as {}", existing.id);
                return Ok(existing);
            }
            let user = User {
                id: generate_record_id(),
                created_at: Utc::now(),
                email: email.clone(),
                name: name.clone(),
                role: Role::User,
                image_url: image_url.clone(),
                title: None,
                bio: None,
                skills: Vec::new(),
                github: None,
                linkedin: None,
                twitter: None,
                website: None,
                stats: UserStats::default(),
            };
            self.users.insert(&user).await?;
            match self.emails.insert_if_absent(&EmailClaim::for_user(&user)).await? {
                None => {
                    info!("registered user {} <{}>", user.id, user.email);
                    return Ok(user);
                }
                Some(claim) => {
                    self.users.delete(&user.id).await?;
                    debug!("register {email}: claimed concurrently by {}", claim.user_id);
                }
            }
        }
        Err(WebifyError::invalid_state(format!(
            "could not register {email} after {CLAIM_ATTEMPTS} attempts"
        )))
    }

    /// Resolves an authenticated principal's email to its user record.
    pub async fn authenticate(&self, email: &str) -> WebifyResult<User> {
        let email = normalize_email(email);
        self.registered(&email)
            .await?
            .ok_or_else(|| WebifyError::not_found(User::COLLECTION, email))
    }

    pub async fn get(&self, id: &str) -> WebifyResult<User> {
        self.users.get_or_error(id).await
    }

    pub async fn list(&self) -> WebifyResult<Vec<User>> {
        self.users.all().await
    }

    /// Users holding the collaborator or admin role.
    pub async fn collaborators(&self) -> WebifyResult<Vec<User>> {
        let mut users = self.users.all().await?;
        users.retain(|user| user.role.is_contributor());
        Ok(users)
    }

    pub async fn update_profile(&self, actor_id: &str, target_id: &str, patch: &ProfilePatch) -> WebifyResult<User> {
        let actor = load_actor(&self.users, actor_id).await?;
        let target = self.users.get_or_error(target_id).await?;
        ensure_owner_or(&actor.id, actor.role, &target.id, Action::UpdateAnyProfile)?;
        patch.validate()?;
        self.users.patch(&target.id, patch).await?;
        debug!("profile of {} updated by {}", target.id, actor.id);
        self.users.get_or_error(&target.id).await
    }

    pub async fn set_role(&self, admin_id: &str, target_id: &str, role: Role) -> WebifyResult<User> {
        let admin = load_actor(&self.users, admin_id).await?;
        ensure(admin.role, Action::ChangeRole)?;
        let target = self.users.get_or_error(target_id).await?;
        self.users.patch(&target.id, &RolePatch { role }).await?;
        info!("role of {} changed {} -> {role} by {}", target.id, target.role, admin.id);
        self.users.get_or_error(&target.id).await
    }

    /// Hard-deletes a user. The email claim goes first, so the same email
    /// registers afresh afterwards.
    pub async fn delete_user(&self, actor_id: &str, target_id: &str) -> WebifyResult<()> {
        let actor = load_actor(&self.users, actor_id).await?;
        let target = self.users.get_or_error(target_id).await?;
        ensure_owner_or(&actor.id, actor.role, &target.id, Action::DeleteAnyUser)?;
        self.emails
            .delete_if(&target.email, EmailClaim::USER_ID, &target.id)
            .await?;
        self.users.delete(&target.id).await?;
        info!("deleted user {} <{}> (by {})", target.id, target.email, actor.id);
        Ok(())
    }

    pub async fn set_online(&self, user_id: &str, online: bool) -> WebifyResult<()> {
        self.users.patch(user_id, &json!({ "stats.online": online })).await?;
        debug!("user {user_id} online={online}");
        Ok(())
    }

    /// Toggles the actor in the target's `stats.liked_by`. Returns the
    /// resulting membership.
    pub async fn toggle_profile_like(&self, actor_id: &str, target_id: &str) -> WebifyResult<bool> {
        let actor = load_actor(&self.users, actor_id).await?;
        ensure(actor.role, Action::Like)?;
        let outcome = self
            .users
            .membership(target_id, "stats.liked_by", &actor.id, MembershipOp::Toggle)
            .await?;
        debug!("profile like {} -> {target_id}: {}", actor.id, outcome.present);
        Ok(outcome.present)
    }
}
