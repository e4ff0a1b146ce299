use uuid::Uuid;

use crate::core::avatar::AvatarSource;
use crate::core::errors::LoopMeetError;
use crate::core::models::AuthIdentity;
use crate::core::services::{UpdateProfileRequest, UserProfileRequest};
use crate::infrastructure::identity::AuthUser;
use crate::infrastructure::storage::Storage;
use crate::tests::{MockIdentityProvider, create_test_service, create_test_service_with_identity, seed_user};

#[tokio::test]
async fn test_upsert_profile_creates_user() {
    let service = create_test_service();
    let user_id = Uuid::new_v4();

    let user = service
        .upsert_profile(
            user_id,
            &UserProfileRequest {
                display_name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                phone: Some("+15550100".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(user.id, user_id);
    assert_eq!(user.display_name, "Alice");
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.phone.as_deref(), Some("+15550100"));
}

#[tokio::test]
async fn test_upsert_profile_requires_email_on_creation() {
    let service = create_test_service();

    let result = service
        .upsert_profile(
            Uuid::new_v4(),
            &UserProfileRequest {
                display_name: "Alice".to_string(),
                email: "  ".to_string(),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(LoopMeetError::InvalidEmail)));
}

#[tokio::test]
async fn test_upsert_profile_blank_email_keeps_existing() {
    let service = create_test_service();
    let user = seed_user(&service, "Alice", "alice@example.com").await;

    let updated = service
        .upsert_profile(
            user.id,
            &UserProfileRequest {
                display_name: "Alice Updated".to_string(),
                email: "".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.display_name, "Alice Updated");
    assert_eq!(updated.email, "alice@example.com");
}

#[tokio::test]
async fn test_update_profile_missing_is_not_found() {
    let service = create_test_service();

    let result = service
        .update_profile(Uuid::new_v4(), &UpdateProfileRequest::default())
        .await;
    assert!(matches!(result, Err(LoopMeetError::ProfileNotFound(_))));
}

#[tokio::test]
async fn test_update_profile_changes_only_provided_fields() {
    let service = create_test_service();
    let user = seed_user(&service, "Alice", "alice@example.com").await;

    let updated = service
        .update_profile(
            user.id,
            &UpdateProfileRequest {
                display_name: Some("Alicia".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.display_name, "Alicia");
    assert_eq!(updated.email, "alice@example.com");
    assert_eq!(updated.phone, None);
}

#[tokio::test]
async fn test_avatar_override_beats_social() {
    let service = create_test_service();
    let user_id = Uuid::new_v4();

    let user = service
        .upsert_profile(
            user_id,
            &UserProfileRequest {
                display_name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                social_avatar_url: Some("https://social.example/alice.png".to_string()),
                avatar_override_url: Some("https://cdn.example/custom.png".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let profile = service.build_profile(&user, None).await.unwrap();
    assert_eq!(profile.avatar_url.as_deref(), Some("https://cdn.example/custom.png"));
    assert_eq!(profile.avatar_source, AvatarSource::UserOverride);
}

#[tokio::test]
async fn test_social_avatar_never_clobbers_override() {
    let service = create_test_service();
    let user_id = Uuid::new_v4();

    service
        .upsert_profile(
            user_id,
            &UserProfileRequest {
                display_name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                avatar_override_url: Some("https://cdn.example/custom.png".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // OAuth prefill posts a social URL later.
    let user = service
        .update_profile(
            user_id,
            &UpdateProfileRequest {
                social_avatar_url: Some("https://social.example/alice.png".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(user.avatar_override_url.as_deref(), Some("https://cdn.example/custom.png"));
    assert_eq!(user.social_avatar_url, None);
}

#[tokio::test]
async fn test_social_avatar_used_without_override() {
    let service = create_test_service();
    let user_id = Uuid::new_v4();

    let user = service
        .upsert_profile(
            user_id,
            &UserProfileRequest {
                display_name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                social_avatar_url: Some("https://social.example/alice.png".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let profile = service.build_profile(&user, None).await.unwrap();
    assert_eq!(profile.avatar_url.as_deref(), Some("https://social.example/alice.png"));
    assert_eq!(profile.avatar_source, AvatarSource::Social);
}

#[tokio::test]
async fn test_build_profile_counts_distinct_groups() {
    let service = create_test_service();
    let alice = seed_user(&service, "Alice", "alice@example.com").await;
    let bob = seed_user(&service, "Bob", "bob@example.com").await;

    service.create_group(alice.id, "Owned One").await.unwrap();
    service.create_group(alice.id, "Owned Two").await.unwrap();

    let bobs_group = service.create_group(bob.id, "Bob's Group").await.unwrap();
    let invitation = service
        .create_invitation(bob.id, bobs_group.id, "alice@example.com")
        .await
        .unwrap();
    service
        .accept_invitation(alice.id, "alice@example.com", invitation.id)
        .await
        .unwrap();

    let profile = service.build_profile(&alice, None).await.unwrap();
    assert_eq!(profile.group_count, 3);
    assert_eq!(profile.avatar_source, AvatarSource::None);
    assert!(profile.avatar_url.is_none());
}

#[tokio::test]
async fn test_build_profile_flags_follow_identity_provider() {
    let identity = MockIdentityProvider {
        auth_user: Ok(AuthUser {
            email: Some("alice@example.com".to_string()),
            has_email_identity: false,
        }),
        ..Default::default()
    };
    let service = create_test_service_with_identity(identity);
    let alice = seed_user(&service, "Alice", "alice@example.com").await;

    let profile = service.build_profile(&alice, Some("token")).await.unwrap();
    assert!(!profile.has_email_provider);
    assert!(!profile.requires_current_password);
    assert!(profile.requires_email_for_password_setup);
    assert!(profile.can_change_password);
}

#[tokio::test]
async fn test_build_profile_prefers_stored_email_identity() {
    // Provider would deny the email identity, but a stored record answers
    // first and skips the live lookup.
    let identity = MockIdentityProvider {
        auth_user: Ok(AuthUser {
            email: None,
            has_email_identity: false,
        }),
        ..Default::default()
    };
    let calls = identity.calls.clone();
    let service = create_test_service_with_identity(identity);
    let alice = seed_user(&service, "Alice", "alice@example.com").await;

    service
        .storage
        .add_auth_identity(AuthIdentity {
            id: Uuid::new_v4(),
            user_id: alice.id,
            provider: "email".to_string(),
            provider_subject: alice.id.to_string(),
            created_at: chrono::Utc::now(),
        })
        .await
        .unwrap();

    let profile = service.build_profile(&alice, Some("token")).await.unwrap();
    assert!(profile.has_email_provider);
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_build_profile_degrades_to_true_on_lookup_failure() {
    let identity = MockIdentityProvider {
        auth_user: Err(crate::infrastructure::identity::IdentityError::Lookup("boom".to_string())),
        ..Default::default()
    };
    let service = create_test_service_with_identity(identity);
    let alice = seed_user(&service, "Alice", "alice@example.com").await;

    let profile = service.build_profile(&alice, Some("token")).await.unwrap();
    assert!(profile.has_email_provider);
    assert!(profile.requires_current_password);
}
