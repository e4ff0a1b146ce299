use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::errors::LoopMeetError;
use crate::core::models::{Group, Invitation, InvitationStatus, Membership, Role, User};
use crate::core::services::LoopMeetService;
use crate::infrastructure::cache::{Cache, cache_keys};
use crate::infrastructure::identity::IdentityProvider;
use crate::infrastructure::storage::Storage;

/// Invitation enriched with the group name and the owner's/sender's display
/// data, so clients never need follow-up lookups.
#[derive(Serialize, Deserialize, Debug, ToSchema, Clone)]
pub struct InvitationResponse {
    pub id: Uuid,
    pub group_id: Uuid,
    pub group_name: String,
    pub owner_name: String,
    pub owner_email: String,
    pub sender_name: String,
    pub sender_email: String,
    pub invited_email: String,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
}

impl<S: Storage, C: Cache, I: IdentityProvider> LoopMeetService<S, C, I> {
    // INVITATION LIFECYCLE: pending -> accepted | declined, terminal states
    // are absorbing.

    pub async fn create_invitation(
        &self,
        owner_user_id: Uuid,
        group_id: Uuid,
        email: &str,
    ) -> Result<InvitationResponse, LoopMeetError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(LoopMeetError::InvalidEmail);
        }

        let group = self
            .storage
            .get_group(group_id)
            .await?
            .ok_or(LoopMeetError::GroupNotFound(group_id))?;
        if group.owner_user_id != owner_user_id {
            warn!("User {} attempted to invite into group {} without owning it", owner_user_id, group_id);
            return Err(LoopMeetError::NotGroupOwner(owner_user_id));
        }

        let existing_user = self.storage.get_user_by_email(email).await?;
        if let Some(user) = &existing_user {
            if self.storage.get_membership(user.id, group_id).await?.is_some() {
                return Err(LoopMeetError::AlreadyMember(email.to_string()));
            }
        }

        if self.storage.pending_invitation_exists(group_id, email).await? {
            return Err(LoopMeetError::DuplicateInvitation(email.to_string()));
        }

        let invitation = Invitation {
            id: Uuid::new_v4(),
            group_id,
            invited_email: email.to_string(),
            invited_user_id: existing_user.map(|user| user.id),
            inviter_user_id: Some(owner_user_id),
            status: InvitationStatus::Pending,
            created_at: Utc::now(),
            accepted_at: None,
        };
        self.storage.add_invitation(invitation.clone()).await?;

        self.cache.remove(&cache_keys::pending_invitations_key(email)).await?;

        info!("Created invitation {} to group {} for {}", invitation.id, group_id, invitation.invited_email);
        self.enrich_single(invitation).await
    }

    pub async fn accept_invitation(
        &self,
        user_id: Uuid,
        email: &str,
        invitation_id: Uuid,
    ) -> Result<InvitationResponse, LoopMeetError> {
        let mut invitation = self.pending_invitation_for(email, invitation_id).await?;

        if self.storage.get_membership(user_id, invitation.group_id).await?.is_some() {
            warn!("User {} already belongs to group {}", user_id, invitation.group_id);
            return Err(LoopMeetError::AlreadyMember(email.to_string()));
        }

        let now = Utc::now();
        invitation.status = InvitationStatus::Accepted;
        invitation.accepted_at = Some(now);
        invitation.invited_user_id = Some(user_id);
        self.storage.update_invitation(invitation.clone()).await?;

        self.storage
            .add_membership(Membership {
                id: Uuid::new_v4(),
                group_id: invitation.group_id,
                user_id,
                role: Role::Member,
                created_at: now,
            })
            .await?;

        self.cache.remove(&cache_keys::pending_invitations_key(email)).await?;
        self.cache.remove(&cache_keys::groups_key(user_id)).await?;

        info!("User {} accepted invitation {} into group {}", user_id, invitation.id, invitation.group_id);
        self.enrich_single(invitation).await
    }

    pub async fn decline_invitation(
        &self,
        user_id: Uuid,
        email: &str,
        invitation_id: Uuid,
    ) -> Result<InvitationResponse, LoopMeetError> {
        let mut invitation = self.pending_invitation_for(email, invitation_id).await?;

        invitation.status = InvitationStatus::Declined;
        invitation.accepted_at = Some(Utc::now());
        invitation.invited_user_id = Some(user_id);
        self.storage.update_invitation(invitation.clone()).await?;

        self.cache.remove(&cache_keys::pending_invitations_key(email)).await?;

        info!("User {} declined invitation {}", user_id, invitation.id);
        self.enrich_single(invitation).await
    }

    pub async fn list_pending_invitations(&self, email: &str) -> Result<Vec<InvitationResponse>, LoopMeetError> {
        let cache_key = cache_keys::pending_invitations_key(email);
        debug!("Loading pending invitations for {}", email);
        self.cached(&cache_key, || async move {
            let mut invitations = self.storage.list_pending_invitations(email).await?;
            invitations.sort_by_key(|invitation| invitation.created_at);
            self.enrich_invitations(invitations).await
        })
        .await
    }

    /// An invitation may only be acted on while pending and by the owner of
    /// the invited address; anything else reads as not-found.
    async fn pending_invitation_for(&self, email: &str, invitation_id: Uuid) -> Result<Invitation, LoopMeetError> {
        self.storage
            .get_invitation(invitation_id)
            .await?
            .filter(|invitation| invitation.status == InvitationStatus::Pending)
            .filter(|invitation| invitation.invited_email.eq_ignore_ascii_case(email))
            .ok_or(LoopMeetError::InvitationNotFound(invitation_id))
    }

    async fn enrich_single(&self, invitation: Invitation) -> Result<InvitationResponse, LoopMeetError> {
        let mut enriched = self.enrich_invitations(vec![invitation]).await?;
        enriched
            .pop()
            .ok_or_else(|| LoopMeetError::UnexpectedError("invitation enrichment dropped a record".to_string()))
    }

    /// Read-side composition over batched lookups; one group query and one
    /// user query regardless of the number of invitations.
    async fn enrich_invitations(&self, invitations: Vec<Invitation>) -> Result<Vec<InvitationResponse>, LoopMeetError> {
        if invitations.is_empty() {
            return Ok(Vec::new());
        }

        let mut group_ids: Vec<Uuid> = invitations.iter().map(|invitation| invitation.group_id).collect();
        group_ids.sort_unstable();
        group_ids.dedup();
        let groups: HashMap<Uuid, Group> = self
            .storage
            .list_groups_by_ids(&group_ids)
            .await?
            .into_iter()
            .map(|group| (group.id, group))
            .collect();

        let mut user_ids: Vec<Uuid> = groups.values().map(|group| group.owner_user_id).collect();
        user_ids.extend(invitations.iter().filter_map(|invitation| invitation.inviter_user_id));
        user_ids.sort_unstable();
        user_ids.dedup();
        let users: HashMap<Uuid, User> = self
            .storage
            .list_users_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        Ok(invitations
            .into_iter()
            .map(|invitation| {
                let group = groups.get(&invitation.group_id);
                let owner = group.and_then(|group| users.get(&group.owner_user_id));
                // Sender falls back to the owner for invitations recorded
                // before the inviter was tracked.
                let sender = invitation
                    .inviter_user_id
                    .and_then(|inviter_id| users.get(&inviter_id))
                    .or(owner);

                InvitationResponse {
                    id: invitation.id,
                    group_id: invitation.group_id,
                    group_name: group.map(|group| group.name.clone()).unwrap_or_default(),
                    owner_name: owner.map(|user| user.display_name.clone()).unwrap_or_default(),
                    owner_email: owner.map(|user| user.email.clone()).unwrap_or_default(),
                    sender_name: sender.map(|user| user.display_name.clone()).unwrap_or_default(),
                    sender_email: sender.map(|user| user.email.clone()).unwrap_or_default(),
                    invited_email: invitation.invited_email,
                    status: invitation.status,
                    created_at: invitation.created_at,
                }
            })
            .collect())
    }
}
