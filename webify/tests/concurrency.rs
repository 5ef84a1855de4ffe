//! Operations raced against each other on one platform.
//!
//! `racing_platform` yields before every store call, so `tokio::join!`
//! interleaves the joined operations at each read and write.

mod common;

use common::{collaborator, member, post_draft, racing_platform};
use webify::{ChatGroup, FriendshipStatus};

fn assert_admins_are_members(group: &ChatGroup) {
    assert!(!group.admins.is_empty(), "group {} lost every admin", group.id);
    for admin in &group.admins {
        assert!(group.is_member(admin), "admin {admin} is not a member of {}", group.id);
    }
}

// ============================================================================
// Friendships
// ============================================================================

#[tokio::test]
async fn crossed_friend_requests_create_one_record() {
    let webify = racing_platform();
    let ada = member(&webify, "ada@example.com").await;
    let bob = member(&webify, "bob@example.com").await;

    let social = webify.social();
    let (forward, backward) = tokio::join!(
        social.send_friend_request(&ada.id, &bob.id),
        social.send_friend_request(&bob.id, &ada.id),
    );

    let failures: Vec<_> = [&forward, &backward].into_iter().filter_map(|result| result.as_ref().err()).collect();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].is_invalid_state());
    assert_eq!(webify.store().len("friendships").await, 1);

    let record = webify.social().friendship_between(&bob.id, &ada.id).await.unwrap().unwrap();
    assert_eq!(record.status, FriendshipStatus::Pending);
}

// ============================================================================
// Groups
// ============================================================================

#[tokio::test]
async fn simultaneous_admin_departures_keep_one_admin() {
    let webify = racing_platform();
    let ada = member(&webify, "ada@example.com").await;
    let bob = member(&webify, "bob@example.com").await;
    let eve = member(&webify, "eve@example.com").await;
    let group = webify
        .messaging()
        .create_chat_group(&ada.id, "Team", None, &[bob.id.clone(), eve.id.clone()], None)
        .await
        .unwrap();
    webify.messaging().promote_to_admin(&ada.id, &group.id, &bob.id).await.unwrap();

    let messaging = webify.messaging();
    let (ada_left, bob_left) = tokio::join!(
        messaging.leave_group(&group.id, &ada.id),
        messaging.leave_group(&group.id, &bob.id),
    );

    let refused: Vec<_> = [&ada_left, &bob_left].into_iter().filter_map(|result| result.as_ref().err()).collect();
    assert_eq!(refused.len(), 1);
    assert!(refused[0].is_invalid_state());

    let remaining = webify.messaging().get_group(&group.id).await.unwrap();
    assert_eq!(remaining.members.len(), 2);
    assert_eq!(remaining.admins.len(), 1);
    assert_admins_are_members(&remaining);
}

#[tokio::test]
async fn removal_racing_promotion_leaves_a_consistent_roster() {
    let webify = racing_platform();
    let ada = member(&webify, "ada@example.com").await;
    let bob = member(&webify, "bob@example.com").await;
    let group = webify
        .messaging()
        .create_chat_group(&ada.id, "Team", None, &[bob.id.clone()], None)
        .await
        .unwrap();

    let messaging = webify.messaging();
    let (removed, promoted) = tokio::join!(
        messaging.remove_group_member(&ada.id, &group.id, &bob.id),
        messaging.promote_to_admin(&ada.id, &group.id, &bob.id),
    );
    assert!(removed.is_ok() != promoted.is_ok(), "exactly one change should apply");

    let group = webify.messaging().get_group(&group.id).await.unwrap();
    assert_admins_are_members(&group);
    assert_eq!(group.is_member(&bob.id), group.is_admin(&bob.id));
}

#[tokio::test]
async fn last_two_members_leaving_together_delete_the_group() {
    let webify = racing_platform();
    let ada = member(&webify, "ada@example.com").await;
    let bob = member(&webify, "bob@example.com").await;
    let group = webify
        .messaging()
        .create_chat_group(&ada.id, "Pair", None, &[bob.id.clone()], None)
        .await
        .unwrap();
    webify.messaging().promote_to_admin(&ada.id, &group.id, &bob.id).await.unwrap();

    let messaging = webify.messaging();
    let (first, second) = tokio::join!(
        messaging.leave_group(&group.id, &ada.id),
        messaging.leave_group(&group.id, &bob.id),
    );
    let first = first.unwrap();
    let second = second.unwrap();
    assert!(first.is_none() || second.is_none());
    assert!(webify.messaging().get_group(&group.id).await.unwrap_err().is_not_found());
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn concurrent_registrations_share_one_user() {
    let webify = racing_platform();
    let users = webify.users();
    let (first, second) = tokio::join!(
        users.register("ada@example.com", "Ada", None),
        users.register("ADA@example.com", "Other", None),
    );
    let first = first.unwrap();
    let second = second.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(webify.store().len("users").await, 1);
    assert_eq!(webify.store().len("user_emails").await, 1);
    assert_eq!(webify.users().authenticate("ada@example.com").await.unwrap().id, first.id);
}

// ============================================================================
// Engagement
// ============================================================================

#[tokio::test]
async fn likes_from_many_users_are_all_counted() {
    let webify = racing_platform();
    let author = collaborator(&webify, "author@example.com").await;
    let post = webify.posts().create(&author.id, post_draft("hello")).await.unwrap();
    let mut readers = Vec::new();
    for name in ["a", "b", "c", "d"] {
        readers.push(member(&webify, &format!("{name}@example.com")).await);
    }

    let posts = webify.posts();
    let results = tokio::join!(
        posts.toggle_like(&readers[0].id, &post.id),
        posts.toggle_like(&readers[1].id, &post.id),
        posts.toggle_like(&readers[2].id, &post.id),
        posts.toggle_like(&readers[3].id, &post.id),
    );
    assert!(results.0.unwrap() && results.1.unwrap() && results.2.unwrap() && results.3.unwrap());

    let post = webify.posts().get(&post.id).await.unwrap();
    assert_eq!(post.engagement.likes.len(), 4);
    let author = webify.users().get(&author.id).await.unwrap();
    assert_eq!(author.stats.posts_liked, 4);
}

/// Two toggles by one user cancel out, and the author's counter agrees with
/// the like list whichever toggle lands first.
#[tokio::test]
async fn double_toggle_keeps_counter_and_likes_in_step() {
    let webify = racing_platform();
    let author = collaborator(&webify, "author@example.com").await;
    let reader = member(&webify, "reader@example.com").await;
    let post = webify.posts().create(&author.id, post_draft("hello")).await.unwrap();

    let posts = webify.posts();
    let (first, second) = tokio::join!(
        posts.toggle_like(&reader.id, &post.id),
        posts.toggle_like(&reader.id, &post.id),
    );
    assert_ne!(first.unwrap(), second.unwrap());

    let post = webify.posts().get(&post.id).await.unwrap();
    assert!(post.engagement.likes.is_empty());
    let author = webify.users().get(&author.id).await.unwrap();
    assert_eq!(author.stats.posts_liked, 0);
}

#[tokio::test]
async fn concurrent_shares_lose_no_increment() {
    let webify = racing_platform();
    let author = collaborator(&webify, "author@example.com").await;
    let reader = member(&webify, "reader@example.com").await;
    let post = webify.posts().create(&author.id, post_draft("hello")).await.unwrap();

    let posts = webify.posts();
    let (a, b, c) = tokio::join!(
        posts.share(&reader.id, &post.id),
        posts.share(&reader.id, &post.id),
        posts.share(&reader.id, &post.id),
    );
    let mut counts = vec![a.unwrap(), b.unwrap(), c.unwrap()];
    counts.sort_unstable();
    assert_eq!(counts, [1, 2, 3]);

    assert_eq!(webify.posts().get(&post.id).await.unwrap().engagement.shares, 3);
    assert_eq!(webify.users().get(&author.id).await.unwrap().stats.shares, 3);
}
