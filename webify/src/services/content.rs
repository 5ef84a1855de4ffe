use chrono::Utc;
use log::debug;

use super::{load_actor, newest_first};
use crate::{
    errors::{ValidationError, WebifyError, WebifyResult},
    id::generate_record_id,
    models::{Comment, CommentParent, Content, Engagement, User},
    policy::{Action, ensure, ensure_owner_or},
    stats::{Counter, StatsUpdater},
    store::{Collection, DocumentStore, Entity, LinkedCounter, MembershipOp},
    validators::require_text,
};

/// CRUD and engagement for one content kind.
///
/// Posts, projects and blogs share this implementation; kind-specific fields
/// and validation come from the [`Content`] impl.
pub struct Contents<'s, S, T> {
    users: Collection<'s, S, User>,
    items: Collection<'s, S, T>,
    comments: Collection<'s, S, Comment>,
    stats: StatsUpdater<'s, S>,
}

impl<'s, S, T> Contents<'s, S, T>
where
    S: DocumentStore,
    T: Content,
{
    pub fn new(store: &'s S) -> Self {
        Self {
            users: Collection::new(store),
            items: Collection::new(store),
            comments: Collection::new(store),
            stats: StatsUpdater::new(store),
        }
    }

    pub async fn create(&self, actor_id: &str, draft: T::Draft) -> WebifyResult<T> {
        let actor = load_actor(&self.users, actor_id).await?;
        ensure(actor.role, Action::CreateContent)?;
        let item = T::from_draft(generate_record_id(), actor.id.clone(), draft)?;
        self.items.insert(&item).await?;
        self.stats.increment(&actor.id, T::KIND.created_counter()).await?;
        debug!("{} {} created by {}", T::KIND, item.id(), actor.id);
        Ok(item)
    }

    pub async fn update(&self, actor_id: &str, id: &str, patch: &T::Patch) -> WebifyResult<T> {
        let actor = load_actor(&self.users, actor_id).await?;
        let item = self.items.get_or_error(id).await?;
        ensure_owner_or(&actor.id, actor.role, item.author_id(), Action::UpdateAnyContent)?;
        T::validate_patch(patch)?;
        self.items.patch(id, patch).await?;
        debug!("{} {id} updated by {}", T::KIND, actor.id);
        self.items.get_or_error(id).await
    }

    /// Hard delete. Comments attached to the item are left in place.
    pub async fn delete(&self, actor_id: &str, id: &str) -> WebifyResult<()> {
        let actor = load_actor(&self.users, actor_id).await?;
        let item = self.items.get_or_error(id).await?;
        ensure_owner_or(&actor.id, actor.role, item.author_id(), Action::DeleteAnyContent)?;
        self.items.delete(id).await?;
        debug!("{} {id} deleted by {}", T::KIND, actor.id);
        Ok(())
    }

    /// Adds or removes the actor's like and moves the author's liked
    /// counter with it. Returns whether the actor now likes the item.
    pub async fn toggle_like(&self, actor_id: &str, id: &str) -> WebifyResult<bool> {
        let actor = load_actor(&self.users, actor_id).await?;
        ensure(actor.role, Action::Like)?;
        let item = self.items.get_or_error(id).await?;
        let counter = LinkedCounter {
            collection: User::COLLECTION,
            id: item.author_id(),
            field: T::KIND.liked_counter().field(),
        };
        let outcome = self
            .items
            .membership_counted(id, Engagement::LIKES, &actor.id, MembershipOp::Toggle, counter)
            .await?;
        debug!("{} {id} like by {}: {}", T::KIND, actor.id, outcome.present);
        Ok(outcome.present)
    }

    /// Creates a comment and appends it to the item. The parent's author is
    /// credited with `comments_created`.
    pub async fn add_comment(&self, actor_id: &str, id: &str, body: &str) -> WebifyResult<Comment> {
        let actor = load_actor(&self.users, actor_id).await?;
        ensure(actor.role, Action::Comment)?;
        let mut issues = Vec::new();
        require_text("content", body, &mut issues);
        if !issues.is_empty() {
            return Err(ValidationError::new(issues).into());
        }
        let item = self.items.get_or_error(id).await?;

        let comment = Comment {
            id: generate_record_id(),
            created_at: Utc::now(),
            author_id: actor.id.clone(),
            parent: CommentParent {
                kind: T::KIND,
                id: id.to_string(),
            },
            content: body.to_string(),
            likes: Vec::new(),
        };
        self.comments.insert(&comment).await?;
        if let Err(err) = self.items.push(id, Engagement::COMMENTS, comment.id.as_str()).await {
            self.comments.delete(&comment.id).await?;
            return Err(err);
        }
        self.stats
            .increment(item.author_id(), Counter::CommentsCreated)
            .await?;
        debug!("comment {} on {} {id} by {}", comment.id, T::KIND, actor.id);
        Ok(comment)
    }

    /// Toggles a bookmark. Projects carry no save list.
    pub async fn toggle_save(&self, actor_id: &str, id: &str) -> WebifyResult<bool> {
        if !T::KIND.supports_saves() {
            return Err(WebifyError::invalid_argument(
                "kind",
                "validation.unsupported",
                format!("{} items cannot be saved", T::KIND),
            ));
        }
        let actor = load_actor(&self.users, actor_id).await?;
        ensure(actor.role, Action::Save)?;
        let outcome = self
            .items
            .membership(id, Engagement::SAVES, &actor.id, MembershipOp::Toggle)
            .await?;
        debug!("{} {id} save by {}: {}", T::KIND, actor.id, outcome.present);
        Ok(outcome.present)
    }

    /// Records one share. Repeatable; returns the new share count.
    pub async fn share(&self, actor_id: &str, id: &str) -> WebifyResult<u64> {
        let actor = load_actor(&self.users, actor_id).await?;
        ensure(actor.role, Action::Share)?;
        let item = self.items.get_or_error(id).await?;
        let shares = self.items.increment(id, Engagement::SHARES, 1).await?;
        self.stats
            .increment(item.author_id(), Counter::Shares)
            .await?;
        debug!("{} {id} shared by {} ({shares})", T::KIND, actor.id);
        Ok(shares)
    }

    pub async fn get(&self, id: &str) -> WebifyResult<T> {
        self.items.get_or_error(id).await
    }

    /// Published items, newest first.
    pub async fn list_published(&self, limit: Option<usize>) -> WebifyResult<Vec<T>> {
        let mut items = self.items.all().await?;
        items.retain(|item| item.is_published());
        Ok(newest_first(items, |item| item.created_at(), limit))
    }

    pub async fn list_by_author(&self, author_id: &str, limit: Option<usize>) -> WebifyResult<Vec<T>> {
        let mut items = self.items.find_by("author_id", author_id).await?;
        items.retain(|item| item.is_published());
        Ok(newest_first(items, |item| item.created_at(), limit))
    }

    /// Published items carrying `tag` (technologies for projects).
    pub async fn list_by_tag(&self, tag: &str, limit: Option<usize>) -> WebifyResult<Vec<T>> {
        let mut items = self.items.all().await?;
        items.retain(|item| item.is_published() && item.tags().iter().any(|t| t.eq_ignore_ascii_case(tag)));
        Ok(newest_first(items, |item| item.created_at(), limit))
    }

    /// Comment records in the order the item lists them. Ids whose record is
    /// gone are skipped.
    pub async fn comments_for(&self, id: &str) -> WebifyResult<Vec<Comment>> {
        let item = self.items.get_or_error(id).await?;
        let mut comments = Vec::with_capacity(item.engagement().comments.len());
        for comment_id in &item.engagement().comments {
            if let Some(comment) = self.comments.get(comment_id).await? {
                comments.push(comment);
            }
        }
        Ok(comments)
    }
}
