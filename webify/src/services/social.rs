use chrono::Utc;
use log::debug;
use serde::Serialize;

use super::{load_actor, newest_first};
use crate::{
    errors::{WebifyError, WebifyResult},
    models::{Friendship, FriendshipStatus, User},
    policy::{Action, ensure},
    store::{Collection, DocumentStore, Entity},
};

/// Friendship lifecycle: pending, then accepted or rejected exactly once.
pub struct SocialGraph<'s, S> {
    users: Collection<'s, S, User>,
    friendships: Collection<'s, S, Friendship>,
}

#[derive(Serialize)]
struct StatusPatch {
    status: FriendshipStatus,
}

impl<'s, S: DocumentStore> SocialGraph<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            users: Collection::new(store),
            friendships: Collection::new(store),
        }
    }

    /// The record between `a` and `b` in either order, whatever its status.
    pub async fn friendship_between(&self, a: &str, b: &str) -> WebifyResult<Option<Friendship>> {
        self.friendships.get(&Friendship::pair_id(a, b)).await
    }

    pub async fn send_friend_request(&self, from_id: &str, to_id: &str) -> WebifyResult<Friendship> {
        if from_id == to_id {
            return Err(WebifyError::invalid_argument(
                "user_id2",
                "validation.self_reference",
                "cannot send a friend request to yourself",
            ));
        }
        let from = load_actor(&self.users, from_id).await?;
        ensure(from.role, Action::SendFriendRequest)?;
        let to = self.users.get_or_error(to_id).await?;

        let friendship = Friendship {
            id: Friendship::pair_id(&from.id, &to.id),
            created_at: Utc::now(),
            user_id1: from.id,
            user_id2: to.id,
            status: FriendshipStatus::Pending,
        };
        // Requests in either direction claim the same id.
        if let Some(existing) = self.friendships.insert_if_absent(&friendship).await? {
            return Err(WebifyError::invalid_state(format!(
                "a friendship between {} and {} already exists ({:?})",
                friendship.user_id1, friendship.user_id2, existing.status
            )));
        }
        debug!(
            "friend request {} {} -> {}",
            friendship.id, friendship.user_id1, friendship.user_id2
        );
        Ok(friendship)
    }

    /// Accepts or rejects a pending request. Only its recipient may respond.
    pub async fn respond_to_friend_request(
        &self,
        friendship_id: &str,
        responder_id: &str,
        accept: bool,
    ) -> WebifyResult<Friendship> {
        let responder = load_actor(&self.users, responder_id).await?;
        ensure(responder.role, Action::RespondToFriendRequest)?;
        let mut friendship = self.friendships.get_or_error(friendship_id).await?;
        if friendship.user_id2 != responder.id {
            return Err(WebifyError::denied(Action::RespondToFriendRequest));
        }
        if friendship.status != FriendshipStatus::Pending {
            return Err(WebifyError::invalid_state(format!(
                "friend request {friendship_id} was already {:?}",
                friendship.status
            )));
        }

        let status = if accept {
            FriendshipStatus::Accepted
        } else {
            FriendshipStatus::Rejected
        };
        self.friendships.patch(friendship_id, &StatusPatch { status }).await?;
        friendship.status = status;
        debug!("friend request {friendship_id} -> {status:?}");
        Ok(friendship)
    }

    pub async fn remove_friend(&self, user_id: &str, friend_id: &str) -> WebifyResult<()> {
        let user = load_actor(&self.users, user_id).await?;
        let friendship = self
            .friendship_between(&user.id, friend_id)
            .await?
            .filter(|friendship| friendship.status == FriendshipStatus::Accepted)
            .ok_or_else(|| WebifyError::not_found(Friendship::COLLECTION, format!("{}:{friend_id}", user.id)))?;
        self.friendships.delete(&friendship.id).await?;
        debug!("friendship {} removed by {}", friendship.id, user.id);
        Ok(())
    }

    /// Users on the other end of every accepted friendship. Deleted users are
    /// skipped.
    pub async fn get_user_friends(&self, user_id: &str) -> WebifyResult<Vec<User>> {
        let mut records = self.friendships.find_by("user_id1", user_id).await?;
        records.extend(self.friendships.find_by("user_id2", user_id).await?);

        let mut friends = Vec::new();
        for record in records
            .iter()
            .filter(|record| record.status == FriendshipStatus::Accepted)
        {
            if let Some(friend) = self.users.get(record.other(user_id)).await? {
                friends.push(friend);
            }
        }
        Ok(friends)
    }

    /// Requests waiting for `user_id` to respond, newest first.
    pub async fn pending_requests(&self, user_id: &str) -> WebifyResult<Vec<Friendship>> {
        let mut requests = self.friendships.find_by("user_id2", user_id).await?;
        requests.retain(|request| request.status == FriendshipStatus::Pending);
        Ok(newest_first(requests, |request| request.created_at, None))
    }
}
