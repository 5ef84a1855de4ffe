use log::debug;

use super::load_actor;
use crate::{
    errors::{WebifyError, WebifyResult},
    models::{Blog, Comment, CommentParent, Content, ContentKind, Engagement, Post, Project, User},
    policy::{Action, ensure, ensure_owner_or},
    stats::{Counter, StatsUpdater},
    store::{Collection, DocumentStore, Entity, LinkedCounter, MembershipOp},
};

/// Operations on existing comments, regardless of the kind of their parent.
pub struct Comments<'s, S> {
    store: &'s S,
    users: Collection<'s, S, User>,
    comments: Collection<'s, S, Comment>,
    stats: StatsUpdater<'s, S>,
}

/// Removes `comment_id` from the parent's list and returns the parent's
/// author, or `None` when the parent is gone.
async fn detach<S: DocumentStore, T: Content>(store: &S, parent_id: &str, comment_id: &str) -> WebifyResult<Option<String>> {
    let parents: Collection<'_, S, T> = Collection::new(store);
    let Some(parent) = parents.get(parent_id).await? else {
        return Ok(None);
    };
    match parents
        .membership(parent_id, Engagement::COMMENTS, comment_id, MembershipOp::Remove)
        .await
    {
        Ok(_) => Ok(Some(parent.author_id().to_string())),
        Err(WebifyError::NotFound { .. }) => Ok(None),
        Err(err) => Err(err),
    }
}

impl<'s, S: DocumentStore> Comments<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            users: Collection::new(store),
            comments: Collection::new(store),
            stats: StatsUpdater::new(store),
        }
    }

    pub async fn get(&self, comment_id: &str) -> WebifyResult<Comment> {
        self.comments.get_or_error(comment_id).await
    }

    /// Toggles the actor's like on a comment; the comment author's
    /// `comments_liked` moves in the same store step.
    pub async fn toggle_comment_like(&self, actor_id: &str, comment_id: &str) -> WebifyResult<bool> {
        let actor = load_actor(&self.users, actor_id).await?;
        ensure(actor.role, Action::Like)?;
        let comment = self.comments.get_or_error(comment_id).await?;
        let counter = LinkedCounter {
            collection: User::COLLECTION,
            id: &comment.author_id,
            field: Counter::CommentsLiked.field(),
        };
        let outcome = self
            .comments
            .membership_counted(comment_id, Comment::LIKES, &actor.id, MembershipOp::Toggle, counter)
            .await?;
        debug!("comment {comment_id} like by {}: {}", actor.id, outcome.present);
        Ok(outcome.present)
    }

    /// Deletes a comment (its author or an admin) and unlinks it from the
    /// parent, reversing the parent author's `comments_created` credit.
    pub async fn delete_comment(&self, actor_id: &str, comment_id: &str) -> WebifyResult<()> {
        let actor = load_actor(&self.users, actor_id).await?;
        let comment = self.comments.get_or_error(comment_id).await?;
        ensure_owner_or(&actor.id, actor.role, &comment.author_id, Action::DeleteAnyContent)?;

        let CommentParent { kind, id: parent_id } = &comment.parent;
        let parent_author = match kind {
            ContentKind::Post => detach::<S, Post>(self.store, parent_id, comment_id).await?,
            ContentKind::Project => detach::<S, Project>(self.store, parent_id, comment_id).await?,
            ContentKind::Blog => detach::<S, Blog>(self.store, parent_id, comment_id).await?,
        };
        self.comments.delete(comment_id).await?;
        if let Some(author_id) = parent_author {
            self.stats.decrement(&author_id, Counter::CommentsCreated).await?;
        }
        debug!("comment {comment_id} on {kind} {parent_id} deleted by {}", actor.id);
        Ok(())
    }
}
