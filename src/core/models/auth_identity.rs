use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Maps an authentication provider ("email", "google", ...) and its subject
/// to a local user. A stored "email" row means the account can hold a
/// password without asking the identity provider.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthIdentity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider: String,
    pub provider_subject: String,
    pub created_at: DateTime<Utc>,
}
