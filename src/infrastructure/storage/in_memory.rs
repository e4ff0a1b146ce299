use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::errors::LoopMeetError;
use crate::core::models::{AuthIdentity, Group, Invitation, InvitationStatus, Membership, User};
use crate::infrastructure::storage::Storage;

#[derive(Clone, Default)]
pub struct InMemoryStorage {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    groups: Arc<RwLock<HashMap<Uuid, Group>>>,
    memberships: Arc<RwLock<Vec<Membership>>>,
    invitations: Arc<RwLock<HashMap<Uuid, Invitation>>>,
    auth_identities: Arc<RwLock<Vec<AuthIdentity>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        InMemoryStorage::default()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn add_user(&self, user: User) -> Result<User, LoopMeetError> {
        let mut users = self.users.write().await;
        if users.values().any(|existing| existing.email.eq_ignore_ascii_case(&user.email)) {
            return Err(LoopMeetError::StorageError(format!(
                "email {} already registered",
                user.email
            )));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, user: User) -> Result<User, LoopMeetError> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(LoopMeetError::ProfileNotFound(user.id));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, LoopMeetError> {
        let users = self.users.read().await;
        Ok(users.get(&user_id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, LoopMeetError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list_users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, LoopMeetError> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn add_group(&self, group: Group) -> Result<Group, LoopMeetError> {
        let mut groups = self.groups.write().await;
        // Name-per-owner uniqueness is also enforced at this layer.
        if groups
            .values()
            .any(|existing| existing.owner_user_id == group.owner_user_id && existing.name == group.name)
        {
            return Err(LoopMeetError::DuplicateGroupName);
        }
        groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn update_group(&self, group: Group) -> Result<Group, LoopMeetError> {
        let mut groups = self.groups.write().await;
        if !groups.contains_key(&group.id) {
            return Err(LoopMeetError::GroupNotFound(group.id));
        }
        if groups
            .values()
            .any(|existing| existing.id != group.id && existing.owner_user_id == group.owner_user_id && existing.name == group.name)
        {
            return Err(LoopMeetError::DuplicateGroupName);
        }
        groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn get_group(&self, group_id: Uuid) -> Result<Option<Group>, LoopMeetError> {
        let groups = self.groups.read().await;
        Ok(groups.get(&group_id).cloned())
    }

    async fn list_groups_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Group>, LoopMeetError> {
        let groups = self.groups.read().await;
        Ok(ids.iter().filter_map(|id| groups.get(id).cloned()).collect())
    }

    async fn list_owned_groups(&self, owner_user_id: Uuid) -> Result<Vec<Group>, LoopMeetError> {
        let groups = self.groups.read().await;
        Ok(groups
            .values()
            .filter(|group| group.owner_user_id == owner_user_id)
            .cloned()
            .collect())
    }

    async fn list_member_groups(&self, user_id: Uuid) -> Result<Vec<Group>, LoopMeetError> {
        let memberships = self.memberships.read().await;
        let group_ids: Vec<Uuid> = memberships
            .iter()
            .filter(|membership| membership.user_id == user_id)
            .map(|membership| membership.group_id)
            .collect();
        drop(memberships);

        let groups = self.groups.read().await;
        Ok(group_ids.iter().filter_map(|id| groups.get(id).cloned()).collect())
    }

    async fn group_name_exists(&self, owner_user_id: Uuid, name: &str) -> Result<bool, LoopMeetError> {
        let groups = self.groups.read().await;
        Ok(groups
            .values()
            .any(|group| group.owner_user_id == owner_user_id && group.name == name))
    }

    async fn add_membership(&self, membership: Membership) -> Result<(), LoopMeetError> {
        let mut memberships = self.memberships.write().await;
        if memberships
            .iter()
            .any(|existing| existing.group_id == membership.group_id && existing.user_id == membership.user_id)
        {
            return Err(LoopMeetError::AlreadyMember(membership.user_id.to_string()));
        }
        memberships.push(membership);
        Ok(())
    }

    async fn get_membership(&self, user_id: Uuid, group_id: Uuid) -> Result<Option<Membership>, LoopMeetError> {
        let memberships = self.memberships.read().await;
        Ok(memberships
            .iter()
            .find(|membership| membership.user_id == user_id && membership.group_id == group_id)
            .cloned())
    }

    async fn list_memberships(&self, group_id: Uuid) -> Result<Vec<Membership>, LoopMeetError> {
        let memberships = self.memberships.read().await;
        Ok(memberships
            .iter()
            .filter(|membership| membership.group_id == group_id)
            .cloned()
            .collect())
    }

    async fn count_members(&self, group_id: Uuid) -> Result<usize, LoopMeetError> {
        let memberships = self.memberships.read().await;
        Ok(memberships
            .iter()
            .filter(|membership| membership.group_id == group_id)
            .count())
    }

    async fn add_invitation(&self, invitation: Invitation) -> Result<(), LoopMeetError> {
        let mut invitations = self.invitations.write().await;
        if invitation.status == InvitationStatus::Pending
            && invitations.values().any(|existing| {
                existing.group_id == invitation.group_id
                    && existing.status == InvitationStatus::Pending
                    && existing.invited_email == invitation.invited_email
            })
        {
            return Err(LoopMeetError::DuplicateInvitation(invitation.invited_email));
        }
        invitations.insert(invitation.id, invitation);
        Ok(())
    }

    async fn update_invitation(&self, invitation: Invitation) -> Result<(), LoopMeetError> {
        let mut invitations = self.invitations.write().await;
        if !invitations.contains_key(&invitation.id) {
            return Err(LoopMeetError::InvitationNotFound(invitation.id));
        }
        invitations.insert(invitation.id, invitation);
        Ok(())
    }

    async fn get_invitation(&self, invitation_id: Uuid) -> Result<Option<Invitation>, LoopMeetError> {
        let invitations = self.invitations.read().await;
        Ok(invitations.get(&invitation_id).cloned())
    }

    async fn list_pending_invitations(&self, email: &str) -> Result<Vec<Invitation>, LoopMeetError> {
        let invitations = self.invitations.read().await;
        Ok(invitations
            .values()
            .filter(|invitation| invitation.status == InvitationStatus::Pending && invitation.invited_email == email)
            .cloned()
            .collect())
    }

    async fn pending_invitation_exists(&self, group_id: Uuid, email: &str) -> Result<bool, LoopMeetError> {
        let invitations = self.invitations.read().await;
        Ok(invitations.values().any(|invitation| {
            invitation.group_id == group_id
                && invitation.status == InvitationStatus::Pending
                && invitation.invited_email == email
        }))
    }

    async fn add_auth_identity(&self, identity: AuthIdentity) -> Result<(), LoopMeetError> {
        let mut auth_identities = self.auth_identities.write().await;
        if !auth_identities
            .iter()
            .any(|existing| existing.provider == identity.provider && existing.provider_subject == identity.provider_subject)
        {
            auth_identities.push(identity);
        }
        Ok(())
    }

    async fn get_auth_identity(
        &self,
        provider: &str,
        provider_subject: &str,
    ) -> Result<Option<AuthIdentity>, LoopMeetError> {
        let auth_identities = self.auth_identities.read().await;
        Ok(auth_identities
            .iter()
            .find(|identity| identity.provider == provider && identity.provider_subject == provider_subject)
            .cloned())
    }
}
