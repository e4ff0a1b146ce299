use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::models::User;

/// Which URL is shown as the user's avatar.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AvatarSource {
    None,
    Social,
    UserOverride,
}

/// Applies avatar fields from a profile request. An explicit override always
/// wins; a social URL is only taken while no override exists.
pub fn apply_avatar_request(user: &mut User, social_avatar_url: Option<&str>, avatar_override_url: Option<&str>) {
    if let Some(override_url) = avatar_override_url {
        if !override_url.trim().is_empty() {
            user.avatar_override_url = Some(override_url.trim().to_string());
        }
    }

    if let Some(social_url) = social_avatar_url {
        if !social_url.trim().is_empty() && user.avatar_override_url.is_none() {
            user.social_avatar_url = Some(social_url.trim().to_string());
        }
    }
}

pub fn effective_avatar_url(user: &User) -> Option<&str> {
    user.avatar_override_url
        .as_deref()
        .filter(|url| !url.trim().is_empty())
        .or_else(|| user.social_avatar_url.as_deref().filter(|url| !url.trim().is_empty()))
}

pub fn avatar_source(user: &User) -> AvatarSource {
    if user.avatar_override_url.as_deref().is_some_and(|url| !url.trim().is_empty()) {
        AvatarSource::UserOverride
    } else if user.social_avatar_url.as_deref().is_some_and(|url| !url.trim().is_empty()) {
        AvatarSource::Social
    } else {
        AvatarSource::None
    }
}
