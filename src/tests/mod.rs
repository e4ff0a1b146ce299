mod group_tests;
mod user_tests;

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::core::models::User;
use crate::core::password_policy::PasswordPolicy;
use crate::core::services::{LoopMeetService, UserProfileRequest};
use crate::infrastructure::cache::in_memory::InMemoryCache;
use crate::infrastructure::identity::{AuthUser, IdentityError, IdentityProvider};
use crate::infrastructure::storage::in_memory::InMemoryStorage;

pub type TestService = LoopMeetService<InMemoryStorage, InMemoryCache, MockIdentityProvider>;

/// Scripted identity provider; counts every network-shaped call so tests can
/// assert nothing was contacted.
#[derive(Clone)]
pub struct MockIdentityProvider {
    pub configured: bool,
    pub auth_user: Result<AuthUser, IdentityError>,
    pub verify_result: Result<bool, IdentityError>,
    pub update_result: Result<(), IdentityError>,
    pub calls: Arc<AtomicUsize>,
    pub last_update: Arc<Mutex<Option<(String, Option<String>)>>>,
}

impl Default for MockIdentityProvider {
    fn default() -> Self {
        MockIdentityProvider {
            configured: true,
            auth_user: Ok(AuthUser {
                email: Some("user@example.com".to_string()),
                has_email_identity: true,
            }),
            verify_result: Ok(true),
            update_result: Ok(()),
            calls: Arc::new(AtomicUsize::new(0)),
            last_update: Arc::new(Mutex::new(None)),
        }
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn get_auth_user(&self, _access_token: &str) -> Result<AuthUser, IdentityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.auth_user.clone()
    }

    async fn verify_password(&self, _email: &str, _password: &str) -> Result<bool, IdentityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.verify_result.clone()
    }

    async fn update_credentials(
        &self,
        _access_token: &str,
        new_password: &str,
        new_email: Option<&str>,
    ) -> Result<(), IdentityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_update.lock().unwrap() = Some((new_password.to_string(), new_email.map(str::to_string)));
        self.update_result.clone()
    }
}

pub fn create_test_service() -> TestService {
    create_test_service_with_identity(MockIdentityProvider::default())
}

pub fn create_test_service_with_identity(identity: MockIdentityProvider) -> TestService {
    LoopMeetService::new(
        InMemoryStorage::new(),
        InMemoryCache::new(),
        identity,
        "test-secret".to_string(),
        PasswordPolicy::default(),
    )
}

pub async fn seed_user(service: &TestService, display_name: &str, email: &str) -> User {
    service
        .upsert_profile(
            Uuid::new_v4(),
            &UserProfileRequest {
                display_name: display_name.to_string(),
                email: email.to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap()
}
