//! Identity store and skills.

mod common;

use common::{admin, collaborator, count, member, platform};
use serde_json::json;
use webify::{Action, DocumentStore, ProfilePatch, Role, SkillDraft, SkillLevel, SkillPatch, WebifyError};

fn skill(name: &str, category: &str) -> SkillDraft {
    SkillDraft {
        name: name.to_string(),
        level: SkillLevel::Intermediate,
        category: category.to_string(),
    }
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
async fn register_is_get_or_create_by_email() {
    let webify = platform();
    let first = webify.users().register("Ada@Example.com ", "Ada", None).await.unwrap();
    assert_eq!(first.email, "ada@example.com");
    assert_eq!(first.role, Role::User);
    assert_eq!(first.stats.posts_created, 0);

    let again = webify.users().register("ada@example.com", "Someone Else", None).await.unwrap();
    assert_eq!(again.id, first.id);
    assert_eq!(again.name, "Ada");
    assert_eq!(count(&webify, "users").await, 1);
}

#[tokio::test]
async fn register_rejects_bad_email_and_defaults_name() {
    let webify = platform();
    assert!(webify.users().register("not-an-email", "X", None).await.unwrap_err().is_invalid_argument());

    let user = webify.users().register("grace@example.com", " ", None).await.unwrap();
    assert_eq!(user.name, "grace");
}

#[tokio::test]
async fn authenticate_resolves_known_emails_only() {
    let webify = platform();
    let user = member(&webify, "ada@example.com").await;
    assert_eq!(webify.users().authenticate("ADA@example.com").await.unwrap().id, user.id);
    assert!(webify.users().authenticate("bob@example.com").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn profile_updates_are_self_or_admin() {
    let webify = platform();
    let admin = admin(&webify).await;
    let ada = member(&webify, "ada@example.com").await;
    let bob = member(&webify, "bob@example.com").await;

    let patch = ProfilePatch {
        bio: Some("Engineer".into()),
        github: Some("https://github.com/ada".into()),
        ..Default::default()
    };
    let updated = webify.users().update_profile(&ada.id, &ada.id, &patch).await.unwrap();
    assert_eq!(updated.bio.as_deref(), Some("Engineer"));
    assert_eq!(updated.email, ada.email);

    let err = webify.users().update_profile(&bob.id, &ada.id, &patch).await.unwrap_err();
    assert!(matches!(err, WebifyError::PermissionDenied { action: Action::UpdateAnyProfile }));

    let by_admin = ProfilePatch {
        title: Some("Staff".into()),
        ..Default::default()
    };
    let updated = webify.users().update_profile(&admin.id, &ada.id, &by_admin).await.unwrap();
    assert_eq!(updated.title.as_deref(), Some("Staff"));
    assert_eq!(updated.bio.as_deref(), Some("Engineer"));
}

#[tokio::test]
async fn profile_links_are_validated() {
    let webify = platform();
    let ada = member(&webify, "ada@example.com").await;
    let patch = ProfilePatch {
        website: Some("nope".into()),
        ..Default::default()
    };
    assert!(webify.users().update_profile(&ada.id, &ada.id, &patch).await.unwrap_err().is_invalid_argument());
}

#[tokio::test]
async fn only_admins_change_roles() {
    let webify = platform();
    let admin = admin(&webify).await;
    let collab = collaborator(&webify, "c@example.com").await;
    let ada = member(&webify, "ada@example.com").await;

    let err = webify.users().set_role(&collab.id, &ada.id, Role::Admin).await.unwrap_err();
    assert!(matches!(err, WebifyError::PermissionDenied { action: Action::ChangeRole }));

    let promoted = webify.users().set_role(&admin.id, &ada.id, Role::Collaborator).await.unwrap();
    assert_eq!(promoted.role, Role::Collaborator);

    let collaborators = webify.users().collaborators().await.unwrap();
    assert_eq!(collaborators.len(), 3);
}

#[tokio::test]
async fn delete_user_is_self_or_admin() {
    let webify = platform();
    let admin = admin(&webify).await;
    let ada = member(&webify, "ada@example.com").await;
    let bob = member(&webify, "bob@example.com").await;

    let err = webify.users().delete_user(&bob.id, &ada.id).await.unwrap_err();
    assert!(err.is_permission_denied());

    webify.users().delete_user(&admin.id, &ada.id).await.unwrap();
    assert!(webify.users().get(&ada.id).await.unwrap_err().is_not_found());

    webify.users().delete_user(&bob.id, &bob.id).await.unwrap();
    assert_eq!(webify.users().list().await.unwrap().len(), 1);

    // The email is free again and maps to a new record.
    assert!(webify.users().authenticate("ada@example.com").await.unwrap_err().is_not_found());
    let fresh = webify.users().register("ada@example.com", "Ada", None).await.unwrap();
    assert_ne!(fresh.id, ada.id);
    assert_eq!(count(&webify, "user_emails").await, 2);
}

/// A claim left behind by an interrupted deletion no longer blocks its email.
#[tokio::test]
async fn stale_email_claim_is_released() {
    let webify = platform();
    webify
        .store()
        .insert("user_emails", "ada@example.com", json!({"id": "ada@example.com", "user_id": "gone"}))
        .await
        .unwrap();
    assert!(webify.users().authenticate("ada@example.com").await.unwrap_err().is_not_found());

    let ada = webify.users().register("ada@example.com", "Ada", None).await.unwrap();
    assert_ne!(ada.id, "gone");
    assert_eq!(webify.users().authenticate("ada@example.com").await.unwrap().id, ada.id);
    assert_eq!(count(&webify, "user_emails").await, 1);
}

#[tokio::test]
async fn online_flag_leaves_counters_alone() {
    let webify = platform();
    let author = collaborator(&webify, "c@example.com").await;
    webify.posts().create(&author.id, common::post_draft("hi")).await.unwrap();

    webify.users().set_online(&author.id, true).await.unwrap();
    let user = webify.users().get(&author.id).await.unwrap();
    assert!(user.stats.online);
    assert_eq!(user.stats.posts_created, 1);

    webify.users().set_online(&author.id, false).await.unwrap();
    assert!(!webify.users().get(&author.id).await.unwrap().stats.online);
}

#[tokio::test]
async fn profile_likes_toggle() {
    let webify = platform();
    let ada = member(&webify, "ada@example.com").await;
    let bob = member(&webify, "bob@example.com").await;

    assert!(webify.users().toggle_profile_like(&bob.id, &ada.id).await.unwrap());
    assert_eq!(webify.users().get(&ada.id).await.unwrap().stats.liked_by, vec![bob.id.clone()]);
    assert!(!webify.users().toggle_profile_like(&bob.id, &ada.id).await.unwrap());
    assert!(webify.users().get(&ada.id).await.unwrap().stats.liked_by.is_empty());
}

// ============================================================================
// Skills
// ============================================================================

#[tokio::test]
async fn only_contributors_add_skills() {
    let webify = platform();
    let ada = member(&webify, "ada@example.com").await;
    let err = webify.skills().add_skill(&ada.id, skill("Rust", "Languages")).await.unwrap_err();
    assert!(matches!(err, WebifyError::PermissionDenied { action: Action::CreateSkill }));
    assert_eq!(count(&webify, "skills").await, 0);
}

#[tokio::test]
async fn skills_are_listed_by_name_and_category() {
    let webify = platform();
    let collab = collaborator(&webify, "c@example.com").await;
    let other = collaborator(&webify, "d@example.com").await;

    webify.skills().add_skill(&collab.id, skill("Rust", "Languages")).await.unwrap();
    webify.skills().add_skill(&collab.id, skill("Go", "Languages")).await.unwrap();
    webify.skills().add_skill(&collab.id, skill("Figma", "Design")).await.unwrap();
    webify.skills().add_skill(&other.id, skill("Elixir", "languages")).await.unwrap();

    let mine = webify.skills().user_skills(&collab.id, None).await.unwrap();
    let names: Vec<&str> = mine.iter().map(|skill| skill.name.as_str()).collect();
    assert_eq!(names, ["Figma", "Go", "Rust"]);

    let languages = webify.skills().user_skills(&collab.id, Some("languages")).await.unwrap();
    assert_eq!(languages.len(), 2);

    let everyone = webify.skills().skills_by_category("Languages").await.unwrap();
    assert_eq!(everyone.len(), 3);

    let categories = webify.skills().categories().await.unwrap();
    assert_eq!(categories, ["Design", "Languages", "languages"]);
}

#[tokio::test]
async fn skill_owner_or_admin_edits() {
    let webify = platform();
    let admin = admin(&webify).await;
    let collab = collaborator(&webify, "c@example.com").await;
    let other = collaborator(&webify, "d@example.com").await;
    let rust = webify.skills().add_skill(&collab.id, skill("Rust", "Languages")).await.unwrap();

    let patch = SkillPatch {
        level: Some(SkillLevel::Expert),
        ..Default::default()
    };
    assert!(webify.skills().update_skill(&other.id, &rust.id, &patch).await.unwrap_err().is_permission_denied());
    let updated = webify.skills().update_skill(&collab.id, &rust.id, &patch).await.unwrap();
    assert_eq!(updated.level, SkillLevel::Expert);
    assert_eq!(updated.name, "Rust");

    assert!(webify.skills().delete_skill(&other.id, &rust.id).await.unwrap_err().is_permission_denied());
    webify.skills().delete_skill(&admin.id, &rust.id).await.unwrap();
    assert!(webify.skills().user_skills(&collab.id, None).await.unwrap().is_empty());
}
