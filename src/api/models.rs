use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::core::errors::LoopMeetError;
use crate::core::services::{
    GroupSummaryResponse, InvitationResponse, PasswordChangeFailure, PasswordChangeFailureReason,
};

// Request structs for JSON payloads
#[derive(Deserialize, ToSchema)]
pub struct CreateGroupRequest {
    pub name: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateGroupRequest {
    pub name: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateInvitationRequest {
    pub email: String,
}

#[derive(Serialize, ToSchema)]
pub struct GroupsResponse {
    pub owned: Vec<GroupSummaryResponse>,
    pub member: Vec<GroupSummaryResponse>,
    pub pending_invitations: Vec<InvitationResponse>,
}

#[derive(Serialize, ToSchema)]
pub struct InvitationsResponse {
    pub invitations: Vec<InvitationResponse>,
}

// Error envelope shared by every failing endpoint
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

// Wrapper over the service failure types to implement IntoResponse
pub enum ApiError {
    Service(LoopMeetError),
    PasswordChange(PasswordChangeFailure),
}

impl From<LoopMeetError> for ApiError {
    fn from(err: LoopMeetError) -> Self {
        ApiError::Service(err)
    }
}

impl From<PasswordChangeFailure> for ApiError {
    fn from(err: PasswordChangeFailure) -> Self {
        ApiError::PasswordChange(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message) = match self {
            ApiError::Service(err) => match err {
                LoopMeetError::InvalidGroupName => (
                    StatusCode::BAD_REQUEST,
                    "invalid_group_name",
                    "Please provide a group name.".to_string(),
                ),
                LoopMeetError::DuplicateGroupName => (
                    StatusCode::CONFLICT,
                    "duplicate_group_name",
                    "You already have a group with that name.".to_string(),
                ),
                LoopMeetError::GroupNotFound(_) | LoopMeetError::InvitationNotFound(_) | LoopMeetError::ProfileNotFound(_) => {
                    (StatusCode::NOT_FOUND, "not_found", "Not found.".to_string())
                }
                LoopMeetError::NotGroupOwner(_) => (
                    StatusCode::FORBIDDEN,
                    "not_group_owner",
                    "Only the group owner can do that.".to_string(),
                ),
                LoopMeetError::InvalidEmail => (
                    StatusCode::BAD_REQUEST,
                    "invalid_email",
                    "Please provide a valid email address.".to_string(),
                ),
                LoopMeetError::AlreadyMember(_) => (
                    StatusCode::CONFLICT,
                    "already_member",
                    "That user is already in the group.".to_string(),
                ),
                LoopMeetError::DuplicateInvitation(_) => (
                    StatusCode::CONFLICT,
                    "invitation_exists",
                    "An invitation is already pending for that email.".to_string(),
                ),
                LoopMeetError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, "unauthorized", message),
                LoopMeetError::StorageError(detail)
                | LoopMeetError::CacheError(detail)
                | LoopMeetError::UnexpectedError(detail) => {
                    error!("Request failed unexpectedly: {}", detail);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "unexpected_error",
                        "Something went wrong. Please try again.".to_string(),
                    )
                }
            },
            ApiError::PasswordChange(failure) => {
                let (status, code) = match failure.reason {
                    PasswordChangeFailureReason::MissingFields => (StatusCode::BAD_REQUEST, "missing_fields"),
                    PasswordChangeFailureReason::PasswordMismatch => (StatusCode::BAD_REQUEST, "password_mismatch"),
                    PasswordChangeFailureReason::PasswordPolicyFailed => {
                        (StatusCode::BAD_REQUEST, "password_policy_failed")
                    }
                    PasswordChangeFailureReason::MissingEmail => (StatusCode::UNPROCESSABLE_ENTITY, "missing_email"),
                    PasswordChangeFailureReason::IdentityLookupFailed => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "identity_lookup_failed")
                    }
                    PasswordChangeFailureReason::CurrentPasswordInvalid => {
                        (StatusCode::BAD_REQUEST, "current_password_invalid")
                    }
                    PasswordChangeFailureReason::SupabaseUpdateFailed => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "supabase_update_failed")
                    }
                    PasswordChangeFailureReason::SupabaseUnexpectedError => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "supabase_unexpected_error")
                    }
                    PasswordChangeFailureReason::ServiceNotConfigured => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "service_not_configured")
                    }
                };
                (status, code, failure.message)
            }
        };

        (
            status,
            Json(ErrorResponse {
                code: code.to_string(),
                message,
            }),
        )
            .into_response()
    }
}
