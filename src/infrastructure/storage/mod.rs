use async_trait::async_trait;
use uuid::Uuid;

use crate::core::errors::LoopMeetError;
use crate::core::models::{AuthIdentity, Group, Invitation, Membership, User};

/// Persistence seam for users, groups, memberships, invitations and auth
/// identities. The in-memory implementation backs the binary and the tests;
/// any other persistence technology satisfies the same contract.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn add_user(&self, user: User) -> Result<User, LoopMeetError>;
    async fn update_user(&self, user: User) -> Result<User, LoopMeetError>;
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, LoopMeetError>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, LoopMeetError>;
    async fn list_users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, LoopMeetError>;

    async fn add_group(&self, group: Group) -> Result<Group, LoopMeetError>;
    async fn update_group(&self, group: Group) -> Result<Group, LoopMeetError>;
    async fn get_group(&self, group_id: Uuid) -> Result<Option<Group>, LoopMeetError>;
    async fn list_groups_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Group>, LoopMeetError>;
    async fn list_owned_groups(&self, owner_user_id: Uuid) -> Result<Vec<Group>, LoopMeetError>;
    /// Groups the user holds any membership in, owned ones included.
    async fn list_member_groups(&self, user_id: Uuid) -> Result<Vec<Group>, LoopMeetError>;
    async fn group_name_exists(&self, owner_user_id: Uuid, name: &str) -> Result<bool, LoopMeetError>;

    async fn add_membership(&self, membership: Membership) -> Result<(), LoopMeetError>;
    async fn get_membership(&self, user_id: Uuid, group_id: Uuid) -> Result<Option<Membership>, LoopMeetError>;
    async fn list_memberships(&self, group_id: Uuid) -> Result<Vec<Membership>, LoopMeetError>;
    async fn count_members(&self, group_id: Uuid) -> Result<usize, LoopMeetError>;

    async fn add_invitation(&self, invitation: Invitation) -> Result<(), LoopMeetError>;
    async fn update_invitation(&self, invitation: Invitation) -> Result<(), LoopMeetError>;
    async fn get_invitation(&self, invitation_id: Uuid) -> Result<Option<Invitation>, LoopMeetError>;
    async fn list_pending_invitations(&self, email: &str) -> Result<Vec<Invitation>, LoopMeetError>;
    async fn pending_invitation_exists(&self, group_id: Uuid, email: &str) -> Result<bool, LoopMeetError>;

    async fn add_auth_identity(&self, identity: AuthIdentity) -> Result<(), LoopMeetError>;
    async fn get_auth_identity(
        &self,
        provider: &str,
        provider_subject: &str,
    ) -> Result<Option<AuthIdentity>, LoopMeetError>;
}

pub mod in_memory;
