use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::{
    api::models::{
        CreateGroupRequest, CreateInvitationRequest, ErrorResponse, GroupsResponse, InvitationsResponse,
        UpdateGroupRequest,
    },
    core::{
        avatar::AvatarSource,
        models::{Group, Invitation, InvitationStatus, Membership, Role, User},
        services::{
            GroupDetailResponse, GroupMemberResponse, GroupSummaryResponse, InvitationResponse,
            PasswordChangeRequest, UpdateProfileRequest, UserProfileRequest, UserProfileResponse,
        },
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::get_groups,
        super::handlers::create_group,
        super::handlers::get_group_detail,
        super::handlers::rename_group,
        super::handlers::list_invitations,
        super::handlers::create_invitation,
        super::handlers::accept_invitation,
        super::handlers::decline_invitation,
        super::handlers::get_profile,
        super::handlers::upsert_profile,
        super::handlers::update_profile,
        super::handlers::change_password,
    ),
    components(schemas(
        CreateGroupRequest,
        UpdateGroupRequest,
        CreateInvitationRequest,
        GroupsResponse,
        InvitationsResponse,
        ErrorResponse,
        GroupSummaryResponse,
        GroupMemberResponse,
        GroupDetailResponse,
        InvitationResponse,
        UserProfileRequest,
        UpdateProfileRequest,
        UserProfileResponse,
        PasswordChangeRequest,
        AvatarSource,
        Group,
        Membership,
        Role,
        Invitation,
        InvitationStatus,
        User,
    )),
    modifiers(&BearerAuth),
    info(
        title = "LoopMeet API",
        description = "Groups, memberships and invitations coordination API"
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "Bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}
