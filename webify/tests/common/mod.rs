//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use serde_json::{Map, Value, json};
use tokio::task::yield_now;
use webify::{
    BlogDraft, DocumentStore, LinkedCounter, MemoryStore, Membership, MembershipOp, PostDraft, ProjectDraft, Role,
    Roster, RosterChange, RosterOutcome, StoreError, User, Webify,
};

pub type TestWebify = Webify<MemoryStore>;

pub fn platform() -> TestWebify {
    Webify::in_memory()
}

/// A platform whose store yields before every call. Futures joined on one
/// task then interleave between their reads and writes the way concurrent
/// requests do.
pub fn racing_platform() -> Webify<YieldingStore> {
    Webify::new(YieldingStore::default())
}

/// Registers a user and, when needed, writes the role straight into the store.
/// Used to bootstrap the first admin, which no service call can do.
pub async fn user_with_role<S: DocumentStore>(webify: &Webify<S>, email: &str, role: Role) -> User {
    let user = webify.users().register(email, "", None).await.expect("register");
    if role == Role::User {
        return user;
    }
    let mut fields = Map::new();
    fields.insert("role".to_string(), json!(role));
    webify
        .store()
        .patch("users", &user.id, fields)
        .await
        .expect("patch role");
    webify.users().get(&user.id).await.expect("reload user")
}

pub async fn admin<S: DocumentStore>(webify: &Webify<S>) -> User {
    user_with_role(webify, "admin@example.com", Role::Admin).await
}

pub async fn collaborator<S: DocumentStore>(webify: &Webify<S>, email: &str) -> User {
    user_with_role(webify, email, Role::Collaborator).await
}

pub async fn member<S: DocumentStore>(webify: &Webify<S>, email: &str) -> User {
    user_with_role(webify, email, Role::User).await
}

pub fn post_draft(content: &str) -> PostDraft {
    PostDraft {
        content: content.to_string(),
        ..Default::default()
    }
}

pub fn blog_draft(title: &str) -> BlogDraft {
    BlogDraft {
        title: title.to_string(),
        content: format!("{title} body"),
        ..Default::default()
    }
}

pub fn project_draft(title: &str) -> ProjectDraft {
    ProjectDraft {
        title: title.to_string(),
        description: format!("{title} description"),
        ..Default::default()
    }
}

/// Counts the documents stored in `collection`.
pub async fn count(webify: &TestWebify, collection: &str) -> usize {
    webify.store().len(collection).await
}

#[derive(Default)]
pub struct YieldingStore {
    inner: MemoryStore,
}

impl YieldingStore {
    pub async fn len(&self, collection: &str) -> usize {
        self.inner.len(collection).await
    }
}

impl DocumentStore for YieldingStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        yield_now().await;
        self.inner.get(collection, id).await
    }

    async fn insert(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError> {
        yield_now().await;
        self.inner.insert(collection, id, document).await
    }

    async fn insert_if_absent(
        &self,
        collection: &str,
        id: &str,
        document: Value,
    ) -> Result<Option<Value>, StoreError> {
        yield_now().await;
        self.inner.insert_if_absent(collection, id, document).await
    }

    async fn patch(&self, collection: &str, id: &str, fields: Map<String, Value>) -> Result<bool, StoreError> {
        yield_now().await;
        self.inner.patch(collection, id, fields).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        yield_now().await;
        self.inner.delete(collection, id).await
    }

    async fn delete_if(&self, collection: &str, id: &str, field: &str, expected: &str) -> Result<bool, StoreError> {
        yield_now().await;
        self.inner.delete_if(collection, id, field, expected).await
    }

    async fn scan(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        yield_now().await;
        self.inner.scan(collection).await
    }

    async fn update_membership(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        member: &str,
        op: MembershipOp,
        counter: Option<LinkedCounter<'_>>,
    ) -> Result<Membership, StoreError> {
        yield_now().await;
        self.inner
            .update_membership(collection, id, field, member, op, counter)
            .await
    }

    async fn update_roster(
        &self,
        collection: &str,
        id: &str,
        roster: Roster<'_>,
        member: &str,
        change: RosterChange,
    ) -> Result<RosterOutcome, StoreError> {
        yield_now().await;
        self.inner.update_roster(collection, id, roster, member, change).await
    }

    async fn push(&self, collection: &str, id: &str, field: &str, value: Value) -> Result<(), StoreError> {
        yield_now().await;
        self.inner.push(collection, id, field, value).await
    }

    async fn increment(&self, collection: &str, id: &str, field: &str, delta: i64) -> Result<u64, StoreError> {
        yield_now().await;
        self.inner.increment(collection, id, field, delta).await
    }
}
