use std::collections::HashMap;

use serde_json::{Map, Value};
use tokio::sync::RwLock;

use super::{DocumentStore, LinkedCounter, Membership, MembershipOp, Roster, RosterChange, RosterOutcome, missing};
use crate::errors::StoreError;

#[derive(Default)]
struct CollectionData {
    /// Ids in insertion order.
    order: Vec<String>,
    documents: HashMap<String, Value>,
}

/// In-process store. Every primitive runs under a single write lock, which
/// makes each one atomic with respect to the others.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, CollectionData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently stored in `collection`.
    pub async fn len(&self, collection: &str) -> usize {
        let collections = self.collections.read().await;
        collections.get(collection).map_or(0, |data| data.documents.len())
    }
}

/// Walks a dotted path, creating intermediate objects. Returns `None` when a
/// non-object value sits in the way.
fn slot_mut<'v>(document: &'v mut Value, path: &str) -> Option<&'v mut Value> {
    let mut current = document;
    for segment in path.split('.') {
        let object = current.as_object_mut()?;
        current = object.entry(segment.to_string()).or_insert(Value::Null);
    }
    Some(current)
}

/// Adds `delta` to the integer at `field`, flooring at zero.
fn add_to_counter(
    document: &mut Value,
    collection: &str,
    id: &str,
    field: &str,
    delta: i64,
) -> Result<u64, StoreError> {
    let slot = slot_mut(document, field).ok_or_else(|| field_error(collection, id, field, "reachable"))?;
    let current = match slot {
        Value::Null => 0,
        Value::Number(number) => number
            .as_i64()
            .ok_or_else(|| field_error(collection, id, field, "an integer"))?,
        _ => return Err(field_error(collection, id, field, "a number")),
    };
    let next = current.saturating_add(delta).max(0) as u64;
    *slot = Value::from(next);
    Ok(next)
}

/// String members of the array at `field`; absent or null reads as empty.
fn string_members(document: &Value, collection: &str, id: &str, field: &str) -> Result<Vec<String>, StoreError> {
    let mut current = document;
    for segment in field.split('.') {
        match current.get(segment) {
            Some(next) => current = next,
            None => return Ok(Vec::new()),
        }
    }
    match current {
        Value::Null => Ok(Vec::new()),
        Value::Array(values) => Ok(values
            .iter()
            .filter_map(|value| value.as_str().map(str::to_string))
            .collect()),
        _ => Err(field_error(collection, id, field, "an array")),
    }
}

fn field_error(collection: &str, id: &str, field: &str, expected: &str) -> StoreError {
    StoreError::Other {
        message: format!("{collection}/{id}: field '{field}' is not {expected}").into(),
    }
}

impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|data| data.documents.get(id))
            .cloned())
    }

    async fn insert(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let data = collections.entry(collection.to_string()).or_default();
        if data.documents.insert(id.to_string(), document).is_none() {
            data.order.push(id.to_string());
        }
        Ok(())
    }

    async fn insert_if_absent(
        &self,
        collection: &str,
        id: &str,
        document: Value,
    ) -> Result<Option<Value>, StoreError> {
        let mut collections = self.collections.write().await;
        let data = collections.entry(collection.to_string()).or_default();
        if let Some(existing) = data.documents.get(id) {
            return Ok(Some(existing.clone()));
        }
        data.documents.insert(id.to_string(), document);
        data.order.push(id.to_string());
        Ok(None)
    }

    async fn patch(&self, collection: &str, id: &str, fields: Map<String, Value>) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(document) = collections
            .get_mut(collection)
            .and_then(|data| data.documents.get_mut(id))
        else {
            return Ok(false);
        };
        for (name, value) in fields {
            let slot = slot_mut(document, &name).ok_or_else(|| field_error(collection, id, &name, "reachable"))?;
            *slot = value;
        }
        Ok(true)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(data) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let removed = data.documents.remove(id).is_some();
        if removed {
            data.order.retain(|existing| existing != id);
        }
        Ok(removed)
    }

    async fn delete_if(&self, collection: &str, id: &str, field: &str, expected: &str) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(data) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let matches = data
            .documents
            .get(id)
            .and_then(|document| document.get(field))
            .and_then(Value::as_str)
            == Some(expected);
        if matches {
            data.documents.remove(id);
            data.order.retain(|existing| existing != id);
        }
        Ok(matches)
    }

    async fn scan(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|data| {
                data.order
                    .iter()
                    .filter_map(|id| data.documents.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default())
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
        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(collection)
            .and_then(|data| data.documents.get_mut(id))
            .ok_or_else(|| missing(collection, id))?;
        let slot = slot_mut(document, field).ok_or_else(|| field_error(collection, id, field, "reachable"))?;
        if slot.is_null() {
            *slot = Value::Array(Vec::new());
        }
        let members = slot
            .as_array_mut()
            .ok_or_else(|| field_error(collection, id, field, "an array"))?;

        let present = members.iter().any(|value| value.as_str() == Some(member));
        let outcome = match (op, present) {
            (MembershipOp::Add, true) | (MembershipOp::Remove, false) => Membership {
                present,
                changed: false,
            },
            (MembershipOp::Add | MembershipOp::Toggle, false) => {
                members.push(Value::String(member.to_string()));
                Membership {
                    present: true,
                    changed: true,
                }
            }
            (MembershipOp::Remove | MembershipOp::Toggle, true) => {
                members.retain(|value| value.as_str() != Some(member));
                Membership {
                    present: false,
                    changed: true,
                }
            }
        };

        if let Some(counter) = counter.filter(|_| outcome.changed) {
            let delta = if outcome.present { 1 } else { -1 };
            if let Some(target) = collections
                .get_mut(counter.collection)
                .and_then(|data| data.documents.get_mut(counter.id))
            {
                add_to_counter(target, counter.collection, counter.id, counter.field, delta)?;
            }
        }
        Ok(outcome)
    }

    async fn update_roster(
        &self,
        collection: &str,
        id: &str,
        roster: Roster<'_>,
        member: &str,
        change: RosterChange,
    ) -> Result<RosterOutcome, StoreError> {
        let mut collections = self.collections.write().await;
        let data = collections.get_mut(collection).ok_or_else(|| missing(collection, id))?;
        let document = data.documents.get_mut(id).ok_or_else(|| missing(collection, id))?;
        let mut members = string_members(document, collection, id, roster.members)?;
        let mut admins = string_members(document, collection, id, roster.admins)?;

        if !members.iter().any(|existing| existing == member) {
            return Ok(RosterOutcome::NotMember);
        }
        let is_admin = admins.iter().any(|existing| existing == member);
        match change {
            RosterChange::Promote if is_admin => return Ok(RosterOutcome::Unchanged),
            RosterChange::Promote => admins.push(member.to_string()),
            RosterChange::Remove if is_admin => return Ok(RosterOutcome::Protected),
            RosterChange::Leave if is_admin && admins.len() == 1 && members.len() > 1 => {
                return Ok(RosterOutcome::LastAdmin);
            }
            RosterChange::Leave if members.len() == 1 => {
                data.documents.remove(id);
                data.order.retain(|existing| existing != id);
                return Ok(RosterOutcome::Deleted);
            }
            RosterChange::Remove | RosterChange::Leave => {
                members.retain(|existing| existing != member);
                admins.retain(|existing| existing != member);
            }
        }

        for (field, values) in [(roster.members, members), (roster.admins, admins)] {
            let slot = slot_mut(document, field).ok_or_else(|| field_error(collection, id, field, "reachable"))?;
            *slot = Value::from(values);
        }
        Ok(RosterOutcome::Updated)
    }

    async fn push(&self, collection: &str, id: &str, field: &str, value: Value) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(collection)
            .and_then(|data| data.documents.get_mut(id))
            .ok_or_else(|| missing(collection, id))?;
        let slot = slot_mut(document, field).ok_or_else(|| field_error(collection, id, field, "reachable"))?;
        if slot.is_null() {
            *slot = Value::Array(Vec::new());
        }
        slot.as_array_mut()
            .ok_or_else(|| field_error(collection, id, field, "an array"))?
            .push(value);
        Ok(())
    }

    async fn increment(&self, collection: &str, id: &str, field: &str, delta: i64) -> Result<u64, StoreError> {
        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(collection)
            .and_then(|data| data.documents.get_mut(id))
            .ok_or_else(|| missing(collection, id))?;
        add_to_counter(document, collection, id, field, delta)
    }
}
