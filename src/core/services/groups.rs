use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::errors::LoopMeetError;
use crate::core::models::{Group, Membership, Role};
use crate::core::services::LoopMeetService;
use crate::infrastructure::cache::{Cache, cache_keys};
use crate::infrastructure::identity::IdentityProvider;
use crate::infrastructure::storage::Storage;

#[derive(Serialize, Deserialize, Debug, ToSchema, Clone)]
pub struct GroupSummaryResponse {
    pub id: Uuid,
    pub name: String,
    pub owner_user_id: Uuid,
    pub member_count: usize,
}

#[derive(Serialize, Deserialize, Debug, ToSchema, Clone)]
pub struct GroupMemberResponse {
    pub user_id: Uuid,
    pub display_name: String,
    pub role: Role,
}

#[derive(Serialize, Deserialize, Debug, ToSchema, Clone)]
pub struct GroupDetailResponse {
    pub id: Uuid,
    pub name: String,
    pub owner_user_id: Uuid,
    pub member_count: usize,
    pub members: Vec<GroupMemberResponse>,
}

/// Groups as seen by one user: those they own and those they belong to
/// without owning. Cached per user.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct GroupListing {
    pub owned: Vec<GroupSummaryResponse>,
    pub member: Vec<GroupSummaryResponse>,
}

impl<S: Storage, C: Cache, I: IdentityProvider> LoopMeetService<S, C, I> {
    // GROUP COMMANDS

    pub async fn create_group(&self, owner_user_id: Uuid, name: &str) -> Result<GroupSummaryResponse, LoopMeetError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LoopMeetError::InvalidGroupName);
        }
        if self.storage.group_name_exists(owner_user_id, name).await? {
            warn!("User {} already has a group named '{}'", owner_user_id, name);
            return Err(LoopMeetError::DuplicateGroupName);
        }

        let now = Utc::now();
        let group = Group {
            id: Uuid::new_v4(),
            owner_user_id,
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        let group = self.storage.add_group(group).await?;

        self.storage
            .add_membership(Membership {
                id: Uuid::new_v4(),
                group_id: group.id,
                user_id: owner_user_id,
                role: Role::Owner,
                created_at: now,
            })
            .await?;

        self.cache.remove(&cache_keys::groups_key(owner_user_id)).await?;

        info!("Created group {} ('{}') for owner {}", group.id, group.name, owner_user_id);
        Ok(GroupSummaryResponse {
            id: group.id,
            name: group.name,
            owner_user_id,
            member_count: 1,
        })
    }

    pub async fn rename_group(
        &self,
        group_id: Uuid,
        owner_user_id: Uuid,
        name: &str,
    ) -> Result<GroupSummaryResponse, LoopMeetError> {
        let mut group = self
            .storage
            .get_group(group_id)
            .await?
            .ok_or(LoopMeetError::GroupNotFound(group_id))?;
        if group.owner_user_id != owner_user_id {
            warn!("User {} attempted to rename group {} without owning it", owner_user_id, group_id);
            return Err(LoopMeetError::NotGroupOwner(owner_user_id));
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(LoopMeetError::InvalidGroupName);
        }

        // Renaming to the current name is an idempotent no-op: no update, no
        // cache invalidation.
        if group.name != name {
            if self.storage.group_name_exists(owner_user_id, name).await? {
                return Err(LoopMeetError::DuplicateGroupName);
            }

            group.name = name.to_string();
            group.updated_at = Utc::now();
            group = self.storage.update_group(group).await?;

            self.cache.remove(&cache_keys::groups_key(owner_user_id)).await?;
            self.cache.remove(&cache_keys::group_detail_key(group_id)).await?;
            info!("Renamed group {} to '{}'", group_id, group.name);
        }

        let member_count = self.storage.count_members(group_id).await?;
        Ok(GroupSummaryResponse {
            id: group.id,
            name: group.name,
            owner_user_id: group.owner_user_id,
            member_count,
        })
    }

    // GROUP QUERIES

    pub async fn get_groups(&self, user_id: Uuid) -> Result<GroupListing, LoopMeetError> {
        let cache_key = cache_keys::groups_key(user_id);
        debug!("Loading groups for {}", user_id);
        self.cached(&cache_key, || async move {
            let owned_groups = self.storage.list_owned_groups(user_id).await?;
            let member_groups = self.storage.list_member_groups(user_id).await?;

            let mut owned = Vec::with_capacity(owned_groups.len());
            for group in owned_groups {
                owned.push(self.summarize_group(group).await?);
            }

            let mut member = Vec::new();
            for group in member_groups {
                if group.owner_user_id != user_id {
                    member.push(self.summarize_group(group).await?);
                }
            }

            owned.sort_by(|a, b| a.name.cmp(&b.name));
            member.sort_by(|a, b| a.name.cmp(&b.name));

            debug!("Loaded groups for {} owned={} member={}", user_id, owned.len(), member.len());
            Ok(GroupListing { owned, member })
        })
        .await
    }

    pub async fn get_group_detail(&self, group_id: Uuid) -> Result<Option<GroupDetailResponse>, LoopMeetError> {
        let cache_key = cache_keys::group_detail_key(group_id);
        debug!("Loading group detail {}", group_id);
        self.cached(&cache_key, || async move {
            let Some(group) = self.storage.get_group(group_id).await? else {
                warn!("Group detail not found {}", group_id);
                return Ok(None);
            };

            let memberships = self.storage.list_memberships(group_id).await?;
            let user_ids: Vec<Uuid> = memberships.iter().map(|m| m.user_id).collect();
            let users = self.storage.list_users_by_ids(&user_ids).await?;
            let names: HashMap<Uuid, String> = users.into_iter().map(|u| (u.id, u.display_name)).collect();

            let mut members: Vec<GroupMemberResponse> = memberships
                .into_iter()
                .map(|m| GroupMemberResponse {
                    user_id: m.user_id,
                    display_name: names.get(&m.user_id).cloned().unwrap_or_default(),
                    role: m.role,
                })
                .collect();
            members.sort_by(|a, b| a.display_name.cmp(&b.display_name));

            debug!("Loaded group detail {} members={}", group_id, members.len());
            Ok(Some(GroupDetailResponse {
                id: group.id,
                name: group.name,
                owner_user_id: group.owner_user_id,
                member_count: members.len(),
                members,
            }))
        })
        .await
    }

    async fn summarize_group(&self, group: Group) -> Result<GroupSummaryResponse, LoopMeetError> {
        let member_count = self.storage.count_members(group.id).await?;
        Ok(GroupSummaryResponse {
            id: group.id,
            name: group.name,
            owner_user_id: group.owner_user_id,
            member_count,
        })
    }
}
