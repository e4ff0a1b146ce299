use async_trait::async_trait;
use serde_json::json;
use tracing::{error, warn};

use crate::config::CONFIG;
use crate::infrastructure::identity::{AuthUser, IdentityError, IdentityProvider};

/// GoTrue client for the Supabase auth API. Uses the caller's access token
/// for account operations and the project anon key for the API gateway.
#[derive(Clone)]
pub struct SupabaseIdentityProvider {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseIdentityProvider {
    pub fn new(base_url: String, anon_key: String) -> Self {
        SupabaseIdentityProvider {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
        }
    }

    pub fn from_config() -> Self {
        SupabaseIdentityProvider::new(CONFIG.supabase_url.clone(), CONFIG.supabase_anon_key.clone())
    }

    fn user_endpoint(&self) -> String {
        format!("{}/auth/v1/user", self.base_url)
    }
}

#[async_trait]
impl IdentityProvider for SupabaseIdentityProvider {
    fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty() && !self.anon_key.trim().is_empty()
    }

    async fn get_auth_user(&self, access_token: &str) -> Result<AuthUser, IdentityError> {
        let response = self
            .client
            .get(self.user_endpoint())
            .bearer_auth(access_token)
            .header("apikey", &self.anon_key)
            .send()
            .await
            .map_err(|e| IdentityError::Lookup(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Failed to inspect identities: status={} body={}", status, body);
            return Err(IdentityError::Lookup(format!("status {}", status)));
        }

        let root: serde_json::Value = response
            .json()
            .await
            .map_err(|e| IdentityError::Lookup(e.to_string()))?;

        let email = root
            .get("email")
            .and_then(|value| value.as_str())
            .filter(|value| !value.trim().is_empty())
            .map(str::to_string);

        let mut has_email_identity = root
            .get("identities")
            .and_then(|value| value.as_array())
            .is_some_and(|identities| {
                identities.iter().any(|identity| {
                    identity
                        .get("provider")
                        .and_then(|provider| provider.as_str())
                        .is_some_and(|provider| provider.eq_ignore_ascii_case("email"))
                })
            });

        // Older accounts only carry the provider list in app_metadata.
        if !has_email_identity {
            has_email_identity = root
                .get("app_metadata")
                .and_then(|meta| meta.get("providers"))
                .and_then(|value| value.as_array())
                .is_some_and(|providers| {
                    providers
                        .iter()
                        .filter_map(|provider| provider.as_str())
                        .any(|provider| provider.eq_ignore_ascii_case("email"))
                });
        }

        Ok(AuthUser {
            email,
            has_email_identity,
        })
    }

    async fn verify_password(&self, email: &str, password: &str) -> Result<bool, IdentityError> {
        let response = self
            .client
            .post(format!("{}/auth/v1/token?grant_type=password", self.base_url))
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| IdentityError::Unexpected(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(true);
        }
        if status == reqwest::StatusCode::BAD_REQUEST || status == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(false);
        }

        let body = response.text().await.unwrap_or_default();
        warn!("Unexpected response verifying current password: status={} body={}", status, body);
        Err(IdentityError::Unexpected(format!("status {}", status)))
    }

    async fn update_credentials(
        &self,
        access_token: &str,
        new_password: &str,
        new_email: Option<&str>,
    ) -> Result<(), IdentityError> {
        let mut payload = json!({ "password": new_password });
        if let Some(email) = new_email {
            payload["email"] = json!(email);
        }

        let response = self
            .client
            .put(self.user_endpoint())
            .bearer_auth(access_token)
            .header("apikey", &self.anon_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| IdentityError::Unexpected(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        error!("Password update failed: status={} body={}", status, body);
        if status.is_server_error() {
            return Err(IdentityError::Unexpected(format!("status {}", status)));
        }
        Err(IdentityError::UpdateRejected(format!("status {}", status)))
    }
}
