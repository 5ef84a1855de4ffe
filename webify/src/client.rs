//! Entry point tying the services to one document store.
//!
//! # Example
//! ```ignore
//! let webify = Webify::connect("redis://localhost:6379", "webify").await?;
//! let user = webify.users().register("ada@example.com", "Ada", None).await?;
//! let liked = webify.posts().toggle_like(&user.id, &post_id).await?;
//! ```

use crate::{
    config::WebifyConfig,
    errors::StoreError,
    models::{Blog, Post, Project},
    services::{Comments, Contents, Messaging, Reports, Reviews, Skills, SocialGraph, Users},
    store::{DocumentStore, MemoryStore, RedisStore},
};

/// Service accessors over a shared [`DocumentStore`].
///
/// Accessors are cheap: each borrows the store and holds no state of its own.
#[derive(Clone)]
pub struct Webify<S> {
    store: S,
}

impl<S: DocumentStore> Webify<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn users(&self) -> Users<'_, S> {
        Users::new(&self.store)
    }

    pub fn posts(&self) -> Contents<'_, S, Post> {
        Contents::new(&self.store)
    }

    pub fn projects(&self) -> Contents<'_, S, Project> {
        Contents::new(&self.store)
    }

    pub fn blogs(&self) -> Contents<'_, S, Blog> {
        Contents::new(&self.store)
    }

    pub fn comments(&self) -> Comments<'_, S> {
        Comments::new(&self.store)
    }

    pub fn skills(&self) -> Skills<'_, S> {
        Skills::new(&self.store)
    }

    pub fn social(&self) -> SocialGraph<'_, S> {
        SocialGraph::new(&self.store)
    }

    pub fn messaging(&self) -> Messaging<'_, S> {
        Messaging::new(&self.store)
    }

    pub fn reviews(&self) -> Reviews<'_, S> {
        Reviews::new(&self.store)
    }

    pub fn reports(&self) -> Reports<'_, S> {
        Reports::new(&self.store)
    }
}

impl Webify<MemoryStore> {
    /// An empty in-process instance.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }
}

impl Webify<RedisStore> {
    pub async fn connect(url: &str, prefix: impl Into<String>) -> Result<Self, StoreError> {
        Ok(Self::new(RedisStore::connect(url, prefix).await?))
    }

    pub async fn from_config(config: &WebifyConfig) -> Result<Self, StoreError> {
        Self::connect(&config.redis.url, config.webify.key_prefix.clone()).await
    }
}
