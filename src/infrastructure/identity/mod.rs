pub mod supabase;

use async_trait::async_trait;
use thiserror::Error;

/// What the identity provider reports about the authenticated account.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub email: Option<String>,
    /// True when a password-capable "email" provider is linked.
    pub has_email_identity: bool,
}

#[derive(Error, Debug, Clone)]
pub enum IdentityError {
    /// Could not fetch the account or its linked identities
    #[error("identity lookup failed: {0}")]
    Lookup(String),

    /// Provider rejected the credential update (non-5xx failure)
    #[error("credential update rejected: {0}")]
    UpdateRejected(String),

    /// Provider 5xx or transport-level failure
    #[error("unexpected identity provider error: {0}")]
    Unexpected(String),
}

/// External identity service holding the account's credentials and linked
/// login methods. All calls are best-effort single attempts.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// False when the provider settings (URL, API key) are absent.
    fn is_configured(&self) -> bool;

    async fn get_auth_user(&self, access_token: &str) -> Result<AuthUser, IdentityError>;

    /// Checks a password through the credential grant. `Ok(false)` means the
    /// provider definitively rejected the credentials.
    async fn verify_password(&self, email: &str, password: &str) -> Result<bool, IdentityError>;

    /// Updates the account password, optionally setting the email too.
    async fn update_credentials(
        &self,
        access_token: &str,
        new_password: &str,
        new_email: Option<&str>,
    ) -> Result<(), IdentityError>;
}
