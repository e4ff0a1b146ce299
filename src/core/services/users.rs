use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::avatar::{self, AvatarSource};
use crate::core::errors::LoopMeetError;
use crate::core::models::User;
use crate::core::services::LoopMeetService;
use crate::infrastructure::cache::Cache;
use crate::infrastructure::identity::IdentityProvider;
use crate::infrastructure::storage::Storage;

#[derive(Deserialize, Debug, ToSchema, Clone, Default)]
pub struct UserProfileRequest {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    pub social_avatar_url: Option<String>,
    pub avatar_override_url: Option<String>,
}

/// Partial profile update: only the provided fields change. Email and
/// password are never touched here.
#[derive(Deserialize, Debug, ToSchema, Clone, Default)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub social_avatar_url: Option<String>,
    pub avatar_override_url: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema, Clone)]
pub struct UserProfileResponse {
    pub display_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub avatar_source: AvatarSource,
    pub user_since: DateTime<Utc>,
    pub group_count: usize,
    pub can_change_password: bool,
    pub has_email_provider: bool,
    pub requires_current_password: bool,
    pub requires_email_for_password_setup: bool,
}

impl<S: Storage, C: Cache, I: IdentityProvider> LoopMeetService<S, C, I> {
    // PROFILE PROVISIONING

    pub async fn get_profile(&self, user_id: Uuid) -> Result<Option<User>, LoopMeetError> {
        self.storage.get_user(user_id).await
    }

    pub async fn upsert_profile(&self, user_id: Uuid, request: &UserProfileRequest) -> Result<User, LoopMeetError> {
        let now = Utc::now();
        match self.storage.get_user(user_id).await? {
            None => {
                let email = request.email.trim();
                if email.is_empty() {
                    return Err(LoopMeetError::InvalidEmail);
                }

                info!("Creating new profile for user {}", user_id);
                let mut user = User {
                    id: user_id,
                    display_name: request.display_name.clone(),
                    email: email.to_string(),
                    phone: request.phone.clone(),
                    avatar_override_url: None,
                    social_avatar_url: None,
                    created_at: now,
                    updated_at: now,
                };
                avatar::apply_avatar_request(
                    &mut user,
                    request.social_avatar_url.as_deref(),
                    request.avatar_override_url.as_deref(),
                );
                self.storage.add_user(user).await
            }
            Some(mut user) => {
                info!("Updating existing profile for user {}", user_id);
                user.display_name = request.display_name.clone();
                user.phone = request.phone.clone();
                // A blank email must not erase the stored one; OAuth prefill
                // flows post the profile without it.
                let email = request.email.trim();
                if !email.is_empty() {
                    user.email = email.to_string();
                }
                avatar::apply_avatar_request(
                    &mut user,
                    request.social_avatar_url.as_deref(),
                    request.avatar_override_url.as_deref(),
                );
                user.updated_at = now;
                self.storage.update_user(user).await
            }
        }
    }

    pub async fn update_profile(&self, user_id: Uuid, request: &UpdateProfileRequest) -> Result<User, LoopMeetError> {
        let mut user = self
            .storage
            .get_user(user_id)
            .await?
            .ok_or(LoopMeetError::ProfileNotFound(user_id))?;

        if let Some(display_name) = &request.display_name {
            user.display_name = display_name.clone();
        }
        if let Some(phone) = &request.phone {
            user.phone = Some(phone.clone());
        }
        avatar::apply_avatar_request(
            &mut user,
            request.social_avatar_url.as_deref(),
            request.avatar_override_url.as_deref(),
        );
        user.updated_at = Utc::now();
        self.storage.update_user(user).await
    }

    /// Projects a stored profile into the API shape: avatar resolution,
    /// distinct group count and password-capability flags.
    pub async fn build_profile(&self, user: &User, access_token: Option<&str>) -> Result<UserProfileResponse, LoopMeetError> {
        let owned = self.storage.list_owned_groups(user.id).await?;
        let member = self.storage.list_member_groups(user.id).await?;
        let group_count = owned
            .iter()
            .map(|group| group.id)
            .chain(member.iter().map(|group| group.id))
            .collect::<HashSet<_>>()
            .len();

        let has_email_provider = self.resolve_has_email_provider(user.id, access_token).await;

        Ok(UserProfileResponse {
            display_name: user.display_name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            avatar_url: avatar::effective_avatar_url(user).map(str::to_string),
            avatar_source: avatar::avatar_source(user),
            user_since: user.created_at,
            group_count,
            can_change_password: true,
            has_email_provider,
            requires_current_password: has_email_provider,
            requires_email_for_password_setup: !has_email_provider,
        })
    }

    /// Best-effort: a stored "email" auth identity answers without a network
    /// call; otherwise ask the identity provider, degrading to `true` on any
    /// failure.
    async fn resolve_has_email_provider(&self, user_id: Uuid, access_token: Option<&str>) -> bool {
        if let Ok(Some(_)) = self.storage.get_auth_identity("email", &user_id.to_string()).await {
            return true;
        }

        let Some(token) = access_token.map(str::trim).filter(|token| !token.is_empty()) else {
            return true;
        };
        if !self.identity.is_configured() {
            warn!("Unable to resolve auth providers for {}: identity provider not configured", user_id);
            return true;
        }

        match self.identity.get_auth_user(token).await {
            Ok(auth_user) => auth_user.has_email_identity,
            Err(e) => {
                warn!("Failed to resolve auth providers for {}: {}", user_id, e);
                true
            }
        }
    }
}
