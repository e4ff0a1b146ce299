pub mod jwt;

use uuid::Uuid;

/// Authenticated caller, derived from the bearer token by the auth
/// middleware and carried through request extensions.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub email: Option<String>,
    /// Raw bearer token; forwarded to the identity provider for
    /// account-scoped calls.
    pub access_token: String,
}
