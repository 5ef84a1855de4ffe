use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{id, store::Entity};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
    Rejected,
}

/// Friendship between two users. `user_id1` sent the request and `user_id2`
/// received it; otherwise the pair is unordered. The record id is derived
/// from the pair, so there is at most one record per pair.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Friendship {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub user_id1: String,
    pub user_id2: String,
    pub status: FriendshipStatus,
}

impl Friendship {
    /// Record id for the pair `a`, `b`; the same in either order.
    pub fn pair_id(a: &str, b: &str) -> String {
        id::pair_id(a, b)
    }

    /// The endpoint that is not `user_id`.
    pub fn other(&self, user_id: &str) -> &str {
        if self.user_id1 == user_id {
            &self.user_id2
        } else {
            &self.user_id1
        }
    }
}

impl Entity for Friendship {
    const COLLECTION: &'static str = "friendships";

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn friendship() -> Friendship {
        Friendship {
            id: Friendship::pair_id("a", "b"),
            created_at: Utc::now(),
            user_id1: "a".into(),
            user_id2: "b".into(),
            status: FriendshipStatus::Pending,
        }
    }

    #[test]
    fn pair_is_unordered() {
        let f = friendship();
        assert_eq!(f.id, Friendship::pair_id("b", "a"));
        assert_ne!(f.id, Friendship::pair_id("a", "c"));
        assert_eq!(f.other("b"), "a");
        assert_eq!(f.other("a"), "b");
    }
}
