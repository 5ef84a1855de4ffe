use std::marker::PhantomData;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use super::{DocumentStore, LinkedCounter, Membership, MembershipOp, Roster, RosterChange, RosterOutcome};
use crate::errors::{StoreError, WebifyError, WebifyResult};

/// A record type stored in one named collection.
pub trait Entity: Serialize + DeserializeOwned {
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

/// Typed accessor over one collection of a [`DocumentStore`].
pub struct Collection<'s, S, T> {
    store: &'s S,
    _entity: PhantomData<fn() -> T>,
}

impl<S, T> Clone for Collection<'_, S, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, T> Copy for Collection<'_, S, T> {}

fn decode<T: DeserializeOwned>(value: Value) -> WebifyResult<T> {
    serde_json::from_value(value).map_err(|err| WebifyError::Store(StoreError::Serialization(err)))
}

fn encode<V: Serialize>(value: &V) -> WebifyResult<Value> {
    serde_json::to_value(value).map_err(|err| WebifyError::Store(StoreError::Serialization(err)))
}

/// Maps a missing-document failure of a field primitive onto `NotFound`.
fn lift<T>(result: Result<T, StoreError>, collection: &'static str, id: &str) -> WebifyResult<T> {
    result.map_err(|err| match err {
        StoreError::MissingDocument { .. } => WebifyError::not_found(collection, id),
        other => WebifyError::Store(other),
    })
}

impl<'s, S, T> Collection<'s, S, T>
where
    S: DocumentStore,
    T: Entity,
{
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    pub async fn get(&self, id: &str) -> WebifyResult<Option<T>> {
        match self.store.get(T::COLLECTION, id).await? {
            Some(value) => Ok(Some(decode(value)?)),
            None => Ok(None),
        }
    }

    pub async fn get_or_error(&self, id: &str) -> WebifyResult<T> {
        self.get(id)
            .await?
            .ok_or_else(|| WebifyError::not_found(T::COLLECTION, id))
    }

    pub async fn exists(&self, id: &str) -> WebifyResult<bool> {
        Ok(self.store.get(T::COLLECTION, id).await?.is_some())
    }

    pub async fn insert(&self, entity: &T) -> WebifyResult<()> {
        let document = encode(entity)?;
        self.store.insert(T::COLLECTION, entity.id(), document).await?;
        Ok(())
    }

    /// Inserts unless the id is taken, in which case the stored record is
    /// returned and nothing is written.
    pub async fn insert_if_absent(&self, entity: &T) -> WebifyResult<Option<T>> {
        let document = encode(entity)?;
        match self.store.insert_if_absent(T::COLLECTION, entity.id(), document).await? {
            Some(existing) => Ok(Some(decode(existing)?)),
            None => Ok(None),
        }
    }

    /// Applies a serializable patch field by field. Fields serialized as
    /// absent are left untouched.
    pub async fn patch<P: Serialize>(&self, id: &str, patch: &P) -> WebifyResult<()> {
        let fields = match encode(patch)? {
            Value::Object(fields) => fields,
            other => {
                return Err(WebifyError::Store(StoreError::Other {
                    message: format!("patch for {} must be an object, got {other}", T::COLLECTION).into(),
                }));
            }
        };
        if fields.is_empty() {
            return if self.exists(id).await? {
                Ok(())
            } else {
                Err(WebifyError::not_found(T::COLLECTION, id))
            };
        }
        if self.store.patch(T::COLLECTION, id, fields).await? {
            Ok(())
        } else {
            Err(WebifyError::not_found(T::COLLECTION, id))
        }
    }

    pub async fn delete(&self, id: &str) -> WebifyResult<bool> {
        Ok(self.store.delete(T::COLLECTION, id).await?)
    }

    pub async fn delete_if(&self, id: &str, field: &str, expected: &str) -> WebifyResult<bool> {
        Ok(self.store.delete_if(T::COLLECTION, id, field, expected).await?)
    }

    pub async fn all(&self) -> WebifyResult<Vec<T>> {
        self.store
            .scan(T::COLLECTION)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    pub async fn find_by(&self, field: &str, value: impl Into<Value>) -> WebifyResult<Vec<T>> {
        let value = value.into();
        self.store
            .find_by(T::COLLECTION, field, &value)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    pub async fn membership(&self, id: &str, field: &str, member: &str, op: MembershipOp) -> WebifyResult<Membership> {
        lift(
            self.store.update_membership(T::COLLECTION, id, field, member, op, None).await,
            T::COLLECTION,
            id,
        )
    }

    /// Membership change that also moves `counter` by one in the same step.
    pub async fn membership_counted(
        &self,
        id: &str,
        field: &str,
        member: &str,
        op: MembershipOp,
        counter: LinkedCounter<'_>,
    ) -> WebifyResult<Membership> {
        lift(
            self.store
                .update_membership(T::COLLECTION, id, field, member, op, Some(counter))
                .await,
            T::COLLECTION,
            id,
        )
    }

    pub async fn roster(
        &self,
        id: &str,
        roster: Roster<'_>,
        member: &str,
        change: RosterChange,
    ) -> WebifyResult<RosterOutcome> {
        lift(
            self.store.update_roster(T::COLLECTION, id, roster, member, change).await,
            T::COLLECTION,
            id,
        )
    }

    pub async fn push(&self, id: &str, field: &str, value: impl Into<Value>) -> WebifyResult<()> {
        lift(
            self.store.push(T::COLLECTION, id, field, value.into()).await,
            T::COLLECTION,
            id,
        )
    }

    pub async fn increment(&self, id: &str, field: &str, delta: i64) -> WebifyResult<u64> {
        lift(
            self.store.increment(T::COLLECTION, id, field, delta).await,
            T::COLLECTION,
            id,
        )
    }
}
