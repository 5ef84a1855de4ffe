//! Document store abstraction.
//!
//! Records are JSON documents addressed by `(collection, id)`. Besides whole
//! document reads and writes, a backend exposes field-level primitives
//! (membership toggles, list pushes, counters) that must be atomic per
//! document; engagement operations are built on those instead of
//! read-modify-write of full arrays.
//!
//! Field arguments are dotted paths into the document (`likes`,
//! `stats.posts_liked`).
//!
//! Invariants that span several fields (a unique key, a friendship pair, the
//! member and admin lists of a group) get their own primitive so the check
//! and the write happen in one step.

mod collection;
mod memory;
mod redis_store;

pub use collection::{Collection, Entity};
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

use serde_json::{Map, Value};

use crate::errors::StoreError;

/// Outcome of a membership primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Membership {
    /// Whether the member is present after the operation.
    pub present: bool,
    /// Whether the operation changed the field.
    pub changed: bool,
}

/// Which membership change to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipOp {
    Add,
    Remove,
    Toggle,
}

impl MembershipOp {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            MembershipOp::Add => "add",
            MembershipOp::Remove => "remove",
            MembershipOp::Toggle => "toggle",
        }
    }
}

/// A counter on another document that moves by one with a membership
/// change: up when the member was added, down when removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkedCounter<'a> {
    pub collection: &'a str,
    pub id: &'a str,
    pub field: &'a str,
}

/// The member and admin array fields of a roster document. Admins are
/// always a subset of members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roster<'a> {
    pub members: &'a str,
    pub admins: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterChange {
    /// Adds a current member to the admins.
    Promote,
    /// Removes a member who is not an admin.
    Remove,
    /// Removes a member and their admin seat. Refused for the only admin
    /// while other members remain; the last member leaving deletes the
    /// document.
    Leave,
}

impl RosterChange {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            RosterChange::Promote => "promote",
            RosterChange::Remove => "remove",
            RosterChange::Leave => "leave",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterOutcome {
    Updated,
    Unchanged,
    /// The last member left and the document is gone.
    Deleted,
    NotMember,
    /// `Remove` targeted an admin.
    Protected,
    /// `Leave` by the only admin of a group that still has other members.
    LastAdmin,
}

impl RosterOutcome {
    pub(crate) fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(RosterOutcome::Updated),
            1 => Some(RosterOutcome::Unchanged),
            2 => Some(RosterOutcome::Deleted),
            3 => Some(RosterOutcome::NotMember),
            4 => Some(RosterOutcome::Protected),
            5 => Some(RosterOutcome::LastAdmin),
            _ => None,
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// Writes a full document, replacing any previous one under the same id.
    async fn insert(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError>;

    /// Writes `document` only when nothing is stored under `id` yet.
    /// Returns the document already there otherwise.
    async fn insert_if_absent(
        &self,
        collection: &str,
        id: &str,
        document: Value,
    ) -> Result<Option<Value>, StoreError>;

    /// Assigns each of `fields` (keys may be dotted paths) on an existing
    /// document, leaving every other field untouched. Returns `false` when the
    /// document does not exist.
    async fn patch(&self, collection: &str, id: &str, fields: Map<String, Value>) -> Result<bool, StoreError>;

    /// Returns `true` if a document was removed.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError>;

    /// Deletes the document only while its top-level string `field` still
    /// equals `expected`.
    async fn delete_if(&self, collection: &str, id: &str, field: &str, expected: &str) -> Result<bool, StoreError>;

    /// Every document of a collection.
    async fn scan(&self, collection: &str) -> Result<Vec<Value>, StoreError>;

    /// Documents whose top-level `field` equals `value`.
    async fn find_by(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<Value>, StoreError> {
        let documents = self.scan(collection).await?;
        Ok(documents
            .into_iter()
            .filter(|document| document.get(field) == Some(value))
            .collect())
    }

    /// Adds, removes or toggles `member` in the string array at `field`.
    /// When the array changed and `counter` names an existing document, that
    /// counter moves with it in the same step.
    async fn update_membership(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        member: &str,
        op: MembershipOp,
        counter: Option<LinkedCounter<'_>>,
    ) -> Result<Membership, StoreError>;

    async fn update_roster(
        &self,
        collection: &str,
        id: &str,
        roster: Roster<'_>,
        member: &str,
        change: RosterChange,
    ) -> Result<RosterOutcome, StoreError>;

    /// Appends `value` to the array at `field`.
    async fn push(&self, collection: &str, id: &str, field: &str, value: Value) -> Result<(), StoreError>;

    /// Adds `delta` to the integer at `field`, flooring the result at zero.
    /// Returns the new value.
    async fn increment(&self, collection: &str, id: &str, field: &str, delta: i64) -> Result<u64, StoreError>;
}

pub(crate) fn missing(collection: &str, id: &str) -> StoreError {
    StoreError::MissingDocument {
        collection: collection.to_string(),
        id: id.to_string(),
    }
}
