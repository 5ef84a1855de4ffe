//! Friend requests and friendships.

mod common;

use common::{member, platform};
use webify::{Action, FriendshipStatus, WebifyError};

#[tokio::test]
async fn request_then_accept() {
    let webify = platform();
    let ada = member(&webify, "ada@example.com").await;
    let bob = member(&webify, "bob@example.com").await;

    let request = webify.social().send_friend_request(&ada.id, &bob.id).await.unwrap();
    assert_eq!(request.status, FriendshipStatus::Pending);
    assert_eq!(request.user_id1, ada.id);
    assert_eq!(request.user_id2, bob.id);

    let pending = webify.social().pending_requests(&bob.id).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert!(webify.social().pending_requests(&ada.id).await.unwrap().is_empty());

    let accepted = webify
        .social()
        .respond_to_friend_request(&request.id, &bob.id, true)
        .await
        .unwrap();
    assert_eq!(accepted.status, FriendshipStatus::Accepted);

    let ada_friends = webify.social().get_user_friends(&ada.id).await.unwrap();
    assert_eq!(ada_friends.len(), 1);
    assert_eq!(ada_friends[0].id, bob.id);
    let bob_friends = webify.social().get_user_friends(&bob.id).await.unwrap();
    assert_eq!(bob_friends[0].id, ada.id);
}

#[tokio::test]
async fn reverse_duplicate_request_is_invalid_state() {
    let webify = platform();
    let ada = member(&webify, "ada@example.com").await;
    let bob = member(&webify, "bob@example.com").await;

    webify.social().send_friend_request(&ada.id, &bob.id).await.unwrap();
    let err = webify.social().send_friend_request(&bob.id, &ada.id).await.unwrap_err();
    assert!(err.is_invalid_state());
    let err = webify.social().send_friend_request(&ada.id, &bob.id).await.unwrap_err();
    assert!(err.is_invalid_state());
}

/// A rejected record still blocks new requests between the pair.
#[tokio::test]
async fn rejected_request_blocks_new_ones() {
    let webify = platform();
    let ada = member(&webify, "ada@example.com").await;
    let bob = member(&webify, "bob@example.com").await;

    let request = webify.social().send_friend_request(&ada.id, &bob.id).await.unwrap();
    let rejected = webify
        .social()
        .respond_to_friend_request(&request.id, &bob.id, false)
        .await
        .unwrap();
    assert_eq!(rejected.status, FriendshipStatus::Rejected);
    assert!(webify.social().send_friend_request(&bob.id, &ada.id).await.unwrap_err().is_invalid_state());
    assert!(webify.social().get_user_friends(&ada.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn self_request_is_invalid_argument() {
    let webify = platform();
    let ada = member(&webify, "ada@example.com").await;
    let err = webify.social().send_friend_request(&ada.id, &ada.id).await.unwrap_err();
    assert!(err.is_invalid_argument());
}

#[tokio::test]
async fn request_to_unknown_user_is_not_found() {
    let webify = platform();
    let ada = member(&webify, "ada@example.com").await;
    assert!(webify.social().send_friend_request(&ada.id, "ghost").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn only_the_recipient_may_respond() {
    let webify = platform();
    let ada = member(&webify, "ada@example.com").await;
    let bob = member(&webify, "bob@example.com").await;
    let request = webify.social().send_friend_request(&ada.id, &bob.id).await.unwrap();

    let err = webify
        .social()
        .respond_to_friend_request(&request.id, &ada.id, true)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WebifyError::PermissionDenied {
            action: Action::RespondToFriendRequest
        }
    ));
}

#[tokio::test]
async fn responding_twice_is_invalid_state() {
    let webify = platform();
    let ada = member(&webify, "ada@example.com").await;
    let bob = member(&webify, "bob@example.com").await;
    let request = webify.social().send_friend_request(&ada.id, &bob.id).await.unwrap();

    webify
        .social()
        .respond_to_friend_request(&request.id, &bob.id, true)
        .await
        .unwrap();
    let err = webify
        .social()
        .respond_to_friend_request(&request.id, &bob.id, false)
        .await
        .unwrap_err();
    assert!(err.is_invalid_state());

    let stored = webify.social().friendship_between(&bob.id, &ada.id).await.unwrap().unwrap();
    assert_eq!(stored.status, FriendshipStatus::Accepted);
}

#[tokio::test]
async fn remove_friend_requires_an_accepted_friendship() {
    let webify = platform();
    let ada = member(&webify, "ada@example.com").await;
    let bob = member(&webify, "bob@example.com").await;
    let request = webify.social().send_friend_request(&ada.id, &bob.id).await.unwrap();

    assert!(webify.social().remove_friend(&ada.id, &bob.id).await.unwrap_err().is_not_found());

    webify
        .social()
        .respond_to_friend_request(&request.id, &bob.id, true)
        .await
        .unwrap();
    webify.social().remove_friend(&bob.id, &ada.id).await.unwrap();
    assert!(webify.social().friendship_between(&ada.id, &bob.id).await.unwrap().is_none());

    // The pair may start over once the record is gone.
    webify.social().send_friend_request(&bob.id, &ada.id).await.unwrap();
}

#[tokio::test]
async fn deleted_friends_are_skipped() {
    let webify = platform();
    let ada = member(&webify, "ada@example.com").await;
    let bob = member(&webify, "bob@example.com").await;
    let request = webify.social().send_friend_request(&ada.id, &bob.id).await.unwrap();
    webify
        .social()
        .respond_to_friend_request(&request.id, &bob.id, true)
        .await
        .unwrap();

    webify.users().delete_user(&bob.id, &bob.id).await.unwrap();
    assert!(webify.social().get_user_friends(&ada.id).await.unwrap().is_empty());
}
