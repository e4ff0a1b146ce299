use uuid::Uuid;

use crate::core::errors::LoopMeetError;
use crate::core::models::Role;
use crate::infrastructure::storage::Storage;
use crate::tests::{create_test_service, seed_user};

#[tokio::test]
async fn test_create_group_creates_owner_membership() {
    let service = create_test_service();
    let owner = seed_user(&service, "Owner", "owner@example.com").await;

    let group = service.create_group(owner.id, "Hiking Crew").await.unwrap();

    assert_eq!(group.name, "Hiking Crew");
    assert_eq!(group.owner_user_id, owner.id);
    assert_eq!(group.member_count, 1);

    let membership = service.storage.get_membership(owner.id, group.id).await.unwrap().unwrap();
    assert_eq!(membership.role, Role::Owner);
    assert!(service.storage.group_name_exists(owner.id, "Hiking Crew").await.unwrap());
}

#[tokio::test]
async fn test_create_group_trims_name() {
    let service = create_test_service();
    let owner = seed_user(&service, "Owner", "owner@example.com").await;

    let group = service.create_group(owner.id, "  Hiking Crew  ").await.unwrap();
    assert_eq!(group.name, "Hiking Crew");
}

#[tokio::test]
async fn test_create_group_blank_name_rejected() {
    let service = create_test_service();
    let owner = seed_user(&service, "Owner", "owner@example.com").await;

    let result = service.create_group(owner.id, "   ").await;
    assert!(matches!(result, Err(LoopMeetError::InvalidGroupName)));
}

#[tokio::test]
async fn test_create_group_duplicate_name_for_owner_rejected() {
    let service = create_test_service();
    let owner = seed_user(&service, "Owner", "owner@example.com").await;

    service.create_group(owner.id, "Hiking Crew").await.unwrap();
    let result = service.create_group(owner.id, " Hiking Crew ").await;
    assert!(matches!(result, Err(LoopMeetError::DuplicateGroupName)));
}

#[tokio::test]
async fn test_same_name_allowed_for_different_owners() {
    let service = create_test_service();
    let owner_a = seed_user(&service, "Owner A", "a@example.com").await;
    let owner_b = seed_user(&service, "Owner B", "b@example.com").await;

    service.create_group(owner_a.id, "Hiking Crew").await.unwrap();
    let group = service.create_group(owner_b.id, "Hiking Crew").await.unwrap();
    assert_eq!(group.owner_user_id, owner_b.id);
}

#[tokio::test]
async fn test_rename_group() {
    let service = create_test_service();
    let owner = seed_user(&service, "Owner", "owner@example.com").await;
    let group = service.create_group(owner.id, "Old Name").await.unwrap();

    let renamed = service.rename_group(group.id, owner.id, "New Name").await.unwrap();
    assert_eq!(renamed.name, "New Name");
    assert_eq!(renamed.member_count, 1);

    let stored = service.storage.get_group(group.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "New Name");
}

#[tokio::test]
async fn test_rename_group_to_current_name_is_noop_success() {
    let service = create_test_service();
    let owner = seed_user(&service, "Owner", "owner@example.com").await;
    let group = service.create_group(owner.id, "Same Name").await.unwrap();

    let before = service.storage.get_group(group.id).await.unwrap().unwrap();
    let renamed = service.rename_group(group.id, owner.id, "Same Name").await.unwrap();
    assert_eq!(renamed.name, "Same Name");

    // No update happened: timestamp untouched.
    let after = service.storage.get_group(group.id).await.unwrap().unwrap();
    assert_eq!(before.updated_at, after.updated_at);
}

#[tokio::test]
async fn test_rename_group_missing_is_not_found() {
    let service = create_test_service();
    let owner = seed_user(&service, "Owner", "owner@example.com").await;

    let result = service.rename_group(Uuid::new_v4(), owner.id, "Name").await;
    assert!(matches!(result, Err(LoopMeetError::GroupNotFound(_))));
}

#[tokio::test]
async fn test_rename_group_by_non_owner_is_forbidden() {
    let service = create_test_service();
    let owner = seed_user(&service, "Owner", "owner@example.com").await;
    let intruder = seed_user(&service, "Intruder", "intruder@example.com").await;
    let group = service.create_group(owner.id, "Private Group").await.unwrap();

    let result = service.rename_group(group.id, intruder.id, "Hijacked").await;
    assert!(matches!(result, Err(LoopMeetError::NotGroupOwner(id)) if id == intruder.id));
}

#[tokio::test]
async fn test_rename_group_to_another_owned_name_rejected() {
    let service = create_test_service();
    let owner = seed_user(&service, "Owner", "owner@example.com").await;
    service.create_group(owner.id, "First").await.unwrap();
    let second = service.create_group(owner.id, "Second").await.unwrap();

    let result = service.rename_group(second.id, owner.id, "First").await;
    assert!(matches!(result, Err(LoopMeetError::DuplicateGroupName)));
}

#[tokio::test]
async fn test_get_groups_splits_owned_and_member_sorted_by_name() {
    let service = create_test_service();
    let owner = seed_user(&service, "Owner", "owner@example.com").await;
    let friend = seed_user(&service, "Friend", "friend@example.com").await;

    service.create_group(owner.id, "Zebra Club").await.unwrap();
    service.create_group(owner.id, "Alpha Club").await.unwrap();
    let friends_group = service.create_group(friend.id, "Friends Group").await.unwrap();

    let invitation = service
        .create_invitation(friend.id, friends_group.id, "owner@example.com")
        .await
        .unwrap();
    service
        .accept_invitation(owner.id, "owner@example.com", invitation.id)
        .await
        .unwrap();

    let listing = service.get_groups(owner.id).await.unwrap();
    let owned_names: Vec<&str> = listing.owned.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(owned_names, vec!["Alpha Club", "Zebra Club"]);

    let member_names: Vec<&str> = listing.member.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(member_names, vec!["Friends Group"]);
    assert_eq!(listing.member[0].member_count, 2);
}

#[tokio::test]
async fn test_get_group_detail_sorts_members_by_display_name() {
    let service = create_test_service();
    let owner = seed_user(&service, "Zoe", "zoe@example.com").await;
    let member = seed_user(&service, "Adam", "adam@example.com").await;
    let group = service.create_group(owner.id, "Book Club").await.unwrap();

    let invitation = service
        .create_invitation(owner.id, group.id, "adam@example.com")
        .await
        .unwrap();
    service
        .accept_invitation(member.id, "adam@example.com", invitation.id)
        .await
        .unwrap();

    let detail = service.get_group_detail(group.id).await.unwrap().unwrap();
    assert_eq!(detail.member_count, 2);
    let names: Vec<&str> = detail.members.iter().map(|m| m.display_name.as_str()).collect();
    assert_eq!(names, vec!["Adam", "Zoe"]);
    assert_eq!(detail.members[1].role, Role::Owner);
}

#[tokio::test]
async fn test_get_group_detail_missing_is_none() {
    let service = create_test_service();
    let detail = service.get_group_detail(Uuid::new_v4()).await.unwrap();
    assert!(detail.is_none());
}

#[tokio::test]
async fn test_get_groups_is_cached_until_invalidated() {
    let service = create_test_service();
    let owner = seed_user(&service, "Owner", "owner@example.com").await;
    service.create_group(owner.id, "First").await.unwrap();

    // Warm the cache, then rename behind its back through storage.
    let listing = service.get_groups(owner.id).await.unwrap();
    assert_eq!(listing.owned[0].name, "First");

    let mut raw = service.storage.get_group(listing.owned[0].id).await.unwrap().unwrap();
    raw.name = "Renamed Underneath".to_string();
    service.storage.update_group(raw).await.unwrap();

    let cached = service.get_groups(owner.id).await.unwrap();
    assert_eq!(cached.owned[0].name, "First");

    // A write through the service invalidates the entry.
    service.create_group(owner.id, "Second").await.unwrap();
    let fresh = service.get_groups(owner.id).await.unwrap();
    let names: Vec<&str> = fresh.owned.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["Renamed Underneath", "Second"]);
}
