pub mod groups;
pub mod invitations;
pub mod password;
pub mod users;

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use tracing::warn;

use crate::auth::jwt::{Claims, JwtService};
use crate::constants::CACHE_TTL;
use crate::core::errors::LoopMeetError;
use crate::core::password_policy::PasswordPolicy;
use crate::infrastructure::cache::Cache;
use crate::infrastructure::identity::IdentityProvider;
use crate::infrastructure::storage::Storage;

pub use groups::{GroupDetailResponse, GroupListing, GroupMemberResponse, GroupSummaryResponse};
pub use invitations::InvitationResponse;
pub use password::{
    EmailDiagnostics, EmailSource, PasswordChangeFailure, PasswordChangeFailureReason, PasswordChangeRequest,
};
pub use users::{UpdateProfileRequest, UserProfileRequest, UserProfileResponse};

pub struct LoopMeetService<S: Storage, C: Cache, I: IdentityProvider> {
    pub(crate) storage: S,
    pub(crate) cache: C,
    pub(crate) identity: I,
    pub(crate) jwt_service: JwtService,
    pub(crate) password_policy: PasswordPolicy,
}

impl<S: Storage, C: Cache, I: IdentityProvider> LoopMeetService<S, C, I> {
    pub fn new(storage: S, cache: C, identity: I, jwt_secret: String, password_policy: PasswordPolicy) -> Self {
        LoopMeetService {
            storage,
            cache,
            identity,
            jwt_service: JwtService::new(jwt_secret),
            password_policy,
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, LoopMeetError> {
        self.jwt_service.validate_token(token)
    }

    /// Read-through cache: returns the cached value under `key` when fresh,
    /// otherwise builds, stores and returns it. An unreadable entry is
    /// treated as a miss.
    pub(crate) async fn cached<T, F, Fut>(&self, key: &str, build: F) -> Result<T, LoopMeetError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, LoopMeetError>>,
    {
        if let Some(value) = self.cache.get(key).await? {
            match serde_json::from_value(value) {
                Ok(hit) => return Ok(hit),
                Err(e) => warn!("Discarding unreadable cache entry {}: {}", key, e),
            }
        }

        let fresh = build().await?;
        let value = serde_json::to_value(&fresh)
            .map_err(|e| LoopMeetError::CacheError(format!("Failed to encode cache entry {}: {}", key, e)))?;
        self.cache.set(key, value, CACHE_TTL).await?;
        Ok(fresh)
    }
}
