use std::sync::LazyLock;

use redis::{Script, aio::ConnectionManager, cmd};
use serde_json::{Map, Value};

use super::{DocumentStore, LinkedCounter, Membership, MembershipOp, Roster, RosterChange, RosterOutcome, missing};
use crate::{
    errors::StoreError,
    keys::{KeyContext, json_path},
};

const MEMBERSHIP_SCRIPT_BODY: &str = include_str!("../../lua/membership.lua");
const PUSH_SCRIPT_BODY: &str = include_str!("../../lua/push.lua");
const INCREMENT_SCRIPT_BODY: &str = include_str!("../../lua/increment.lua");
const PATCH_SCRIPT_BODY: &str = include_str!("../../lua/patch.lua");
const INSERT_IF_ABSENT_SCRIPT_BODY: &str = include_str!("../../lua/insert_if_absent.lua");
const DELETE_IF_SCRIPT_BODY: &str = include_str!("../../lua/delete_if.lua");
const ROSTER_SCRIPT_BODY: &str = include_str!("../../lua/roster.lua");

static MEMBERSHIP_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(MEMBERSHIP_SCRIPT_BODY));
static PUSH_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(PUSH_SCRIPT_BODY));
static INCREMENT_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(INCREMENT_SCRIPT_BODY));
static PATCH_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(PATCH_SCRIPT_BODY));
static INSERT_IF_ABSENT_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(INSERT_IF_ABSENT_SCRIPT_BODY));
static DELETE_IF_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(DELETE_IF_SCRIPT_BODY));
static ROSTER_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(ROSTER_SCRIPT_BODY));

/// Redis-backed store. Documents live in RedisJSON under
/// `{prefix}:{collection}:{id}`; field-level primitives run as Lua scripts so
/// each read-check-write executes atomically inside Redis.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        Self {
            conn,
            prefix: prefix.into(),
        }
    }

    /// Opens a managed connection to `url`.
    pub async fn connect(url: &str, prefix: impl Into<String>) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self::new(conn, prefix))
    }

    fn key(&self, collection: &str, id: &str) -> String {
        KeyContext::new(&self.prefix).document(collection, id)
    }

    /// Deletes every key under this store's prefix.
    pub async fn clear(&self) -> Result<(), StoreError> {
        let keys = self.scan_keys(&format!("{}:*", self.prefix)).await?;
        let mut conn = self.conn.clone();
        for chunk in keys.chunks(500) {
            let _: u64 = cmd("DEL").arg(chunk).query_async(&mut conn).await?;
        }
        Ok(())
    }

    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        const SCAN_COUNT: usize = 1000;
        let mut conn = self.conn.clone();
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();
        loop {
            let (next_cursor, batch): (u64, Vec<String>) = cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await?;
            keys.extend(batch);
            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }
        Ok(keys)
    }
}

impl DocumentStore for RedisStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = cmd("JSON.GET")
            .arg(self.key(collection, id))
            .query_async(&mut conn)
            .await?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let payload = serde_json::to_string(&document)?;
        let _: () = cmd("JSON.SET")
            .arg(self.key(collection, id))
            .arg("$")
            .arg(payload)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn insert_if_absent(
        &self,
        collection: &str,
        id: &str,
        document: Value,
    ) -> Result<Option<Value>, StoreError> {
        let mut conn = self.conn.clone();
        let existing: Option<String> = INSERT_IF_ABSENT_SCRIPT
            .key(self.key(collection, id))
            .arg(serde_json::to_string(&document)?)
            .invoke_async(&mut conn)
            .await?;
        match existing {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn patch(&self, collection: &str, id: &str, fields: Map<String, Value>) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let mut invocation = PATCH_SCRIPT.key(self.key(collection, id));
        for (name, value) in &fields {
            invocation.arg(name).arg(serde_json::to_string(value)?);
        }
        let applied: i64 = invocation.invoke_async(&mut conn).await?;
        Ok(applied == 1)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let deleted: u64 = cmd("DEL").arg(self.key(collection, id)).query_async(&mut conn).await?;
        Ok(deleted > 0)
    }

    async fn delete_if(&self, collection: &str, id: &str, field: &str, expected: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let deleted: i64 = DELETE_IF_SCRIPT
            .key(self.key(collection, id))
            .arg(json_path(field))
            .arg(expected)
            .invoke_async(&mut conn)
            .await?;
        Ok(deleted == 1)
    }

    async fn scan(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let keys = self
            .scan_keys(&KeyContext::new(&self.prefix).collection_pattern(collection))
            .await?;
        let mut conn = self.conn.clone();
        let mut documents = Vec::with_capacity(keys.len());
        for key in keys {
            let raw: Option<String> = cmd("JSON.GET").arg(&key).query_async(&mut conn).await?;
            if let Some(json) = raw {
                documents.push(serde_json::from_str(&json)?);
            }
        }
        Ok(documents)
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
        let mut conn = self.conn.clone();
        let mut invocation = MEMBERSHIP_SCRIPT.key(self.key(collection, id));
        invocation.arg(json_path(field)).arg(member).arg(op.as_str());
        if let Some(counter) = counter {
            invocation
                .key(self.key(counter.collection, counter.id))
                .arg(json_path(counter.field));
        }
        let reply: Vec<i64> = invocation.invoke_async(&mut conn).await?;
        match reply.as_slice() {
            [present, changed] => Ok(Membership {
                present: *present == 1,
                changed: *changed == 1,
            }),
            _ => Err(missing(collection, id)),
        }
    }

    async fn update_roster(
        &self,
        collection: &str,
        id: &str,
        roster: Roster<'_>,
        member: &str,
        change: RosterChange,
    ) -> Result<RosterOutcome, StoreError> {
        let mut conn = self.conn.clone();
        let code: i64 = ROSTER_SCRIPT
            .key(self.key(collection, id))
            .arg(json_path(roster.members))
            .arg(json_path(roster.admins))
            .arg(member)
            .arg(change.as_str())
            .invoke_async(&mut conn)
            .await?;
        RosterOutcome::from_code(code).ok_or_else(|| missing(collection, id))
    }

    async fn push(&self, collection: &str, id: &str, field: &str, value: Value) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let applied: i64 = PUSH_SCRIPT
            .key(self.key(collection, id))
            .arg(json_path(field))
            .arg(serde_json::to_string(&value)?)
            .invoke_async(&mut conn)
            .await?;
        if applied == 1 {
            Ok(())
        } else {
            Err(missing(collection, id))
        }
    }

    async fn increment(&self, collection: &str, id: &str, field: &str, delta: i64) -> Result<u64, StoreError> {
        let mut conn = self.conn.clone();
        let value: i64 = INCREMENT_SCRIPT
            .key(self.key(collection, id))
            .arg(json_path(field))
            .arg(delta)
            .invoke_async(&mut conn)
            .await?;
        u64::try_from(value).map_err(|_| missing(collection, id))
    }
}
