//! Cached per-user counters.
//!
//! Counter changes go through [`StatsUpdater`], which uses the store's
//! atomic increment so concurrent engagements on the same author never lose
//! updates. Like counters are the exception: they move inside the membership
//! primitive through a [`LinkedCounter`](crate::store::LinkedCounter).
//! Decrements are floored at zero by the store.

use log::{debug, warn};

use crate::{
    errors::{WebifyError, WebifyResult},
    models::User,
    store::{Collection, DocumentStore},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    PostsCreated,
    PostsLiked,
    ProjectsCreated,
    ProjectsLiked,
    BlogsCreated,
    BlogsLiked,
    CommentsCreated,
    CommentsLiked,
    Shares,
}

impl Counter {
    pub fn field(self) -> &'static str {
        match self {
            Counter::PostsCreated => "stats.posts_created",
            Counter::PostsLiked => "stats.posts_liked",
            Counter::ProjectsCreated => "stats.projects_created",
            Counter::ProjectsLiked => "stats.projects_liked",
            Counter::BlogsCreated => "stats.blogs_created",
            Counter::BlogsLiked => "stats.blogs_liked",
            Counter::CommentsCreated => "stats.comments_created",
            Counter::CommentsLiked => "stats.comments_liked",
            Counter::Shares => "stats.shares",
        }
    }
}

pub struct StatsUpdater<'s, S> {
    users: Collection<'s, S, User>,
}

impl<'s, S: DocumentStore> StatsUpdater<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            users: Collection::new(store),
        }
    }

    /// Applies `delta` to one counter of `user_id`. A user that no longer
    /// exists is skipped; content outlives its deleted author.
    async fn bump(&self, user_id: &str, counter: Counter, delta: i64) -> WebifyResult<Option<u64>> {
        match self.users.increment(user_id, counter.field(), delta).await {
            Ok(value) => {
                debug!("stats {user_id} {} {delta:+} -> {value}", counter.field());
                Ok(Some(value))
            }
            Err(WebifyError::NotFound { .. }) => {
                warn!("skipping {} update for missing user {user_id}", counter.field());
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    pub async fn increment(&self, user_id: &str, counter: Counter) -> WebifyResult<Option<u64>> {
        self.bump(user_id, counter, 1).await
    }

    pub async fn decrement(&self, user_id: &str, counter: Counter) -> WebifyResult<Option<u64>> {
        self.bump(user_id, counter, -1).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn decrement_floors_at_zero() {
        let store = MemoryStore::new();
        store
            .insert("users", "u", json!({"id": "u", "stats": {"posts_liked": 0}}))
            .await
            .unwrap();
        let stats = StatsUpdater::new(&store);
        assert_eq!(stats.decrement("u", Counter::PostsLiked).await.unwrap(), Some(0));
        assert_eq!(stats.increment("u", Counter::PostsLiked).await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn missing_user_is_skipped() {
        let store = MemoryStore::new();
        let stats = StatsUpdater::new(&store);
        assert_eq!(stats.increment("ghost", Counter::Shares).await.unwrap(), None);
    }
}
