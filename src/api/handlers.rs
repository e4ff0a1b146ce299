use axum::{
    Extension, Json, Router,
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::IntoResponse,
};
use http::header;
use uuid::Uuid;

use std::sync::Arc;

use crate::{
    api::models::*,
    auth::CurrentUser,
    core::{
        errors::LoopMeetError,
        models::User,
        services::{
            GroupDetailResponse, GroupSummaryResponse, InvitationResponse, LoopMeetService, PasswordChangeRequest,
            UpdateProfileRequest, UserProfileRequest, UserProfileResponse,
        },
    },
    infrastructure::{
        cache::in_memory::InMemoryCache, identity::supabase::SupabaseIdentityProvider,
        storage::in_memory::InMemoryStorage,
    },
};

type AppService = LoopMeetService<InMemoryStorage, InMemoryCache, SupabaseIdentityProvider>;

// Middleware to validate the bearer JWT and stash the caller identity
pub async fn auth_middleware(
    State(service): State<Arc<AppService>>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| LoopMeetError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| LoopMeetError::Unauthorized("Invalid Authorization header".to_string()))?
        .to_string();

    let claims = service.validate_token(&token)?;
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| LoopMeetError::Unauthorized("Invalid subject claim".to_string()))?;

    req.extensions_mut().insert(CurrentUser {
        user_id,
        email: claims.email,
        access_token: token,
    });
    Ok(next.run(req).await)
}

// Define API routes
pub fn api_routes(service: Arc<AppService>) -> Router {
    let protected_routes = Router::new()
        .route("/groups", axum::routing::get(get_groups).post(create_group))
        .route(
            "/groups/{group_id}",
            axum::routing::get(get_group_detail).patch(rename_group),
        )
        .route("/groups/{group_id}/invitations", axum::routing::post(create_invitation))
        .route("/invitations", axum::routing::get(list_invitations))
        .route(
            "/invitations/{invitation_id}/accept",
            axum::routing::post(accept_invitation),
        )
        .route(
            "/invitations/{invitation_id}/decline",
            axum::routing::post(decline_invitation),
        )
        .route(
            "/users/profile",
            axum::routing::get(get_profile).post(upsert_profile).patch(update_profile),
        )
        .route("/users/password", axum::routing::post(change_password))
        .route_layer(middleware::from_fn_with_state(service.clone(), auth_middleware));

    Router::new()
        .route("/", axum::routing::get(|| async { "OK" }))
        .merge(protected_routes)
        .with_state(service)
}

#[utoipa::path(
    get,
    path = "/groups",
    responses(
        (status = 200, description = "Groups visible to the caller plus their pending invitations", body = GroupsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_groups(
    State(service): State<Arc<AppService>>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<Json<GroupsResponse>, ApiError> {
    let listing = service.get_groups(current_user.user_id).await?;
    let pending_invitations = match current_user.email.as_deref() {
        Some(email) if !email.trim().is_empty() => service.list_pending_invitations(email).await?,
        _ => Vec::new(),
    };
    Ok(Json(GroupsResponse {
        owned: listing.owned,
        member: listing.member,
        pending_invitations,
    }))
}

#[utoipa::path(
    post,
    path = "/groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 201, description = "Group created with its owner membership", body = GroupSummaryResponse),
        (status = 400, description = "Blank group name", body = ErrorResponse),
        (status = 409, description = "Duplicate group name for this owner", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn create_group(
    State(service): State<Arc<AppService>>,
    Extension(current_user): Extension<CurrentUser>,
    Json(req): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<GroupSummaryResponse>), ApiError> {
    let group = service.create_group(current_user.user_id, &req.name).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

#[utoipa::path(
    get,
    path = "/groups/{group_id}",
    params(("group_id" = Uuid, Path, description = "Group to fetch")),
    responses(
        (status = 200, description = "Group with its member list", body = GroupDetailResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_group_detail(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<GroupDetailResponse>, ApiError> {
    let detail = service
        .get_group_detail(group_id)
        .await?
        .ok_or(LoopMeetError::GroupNotFound(group_id))?;
    Ok(Json(detail))
}

#[utoipa::path(
    patch,
    path = "/groups/{group_id}",
    params(("group_id" = Uuid, Path, description = "Group to rename")),
    request_body = UpdateGroupRequest,
    responses(
        (status = 200, description = "Group renamed (no-op when unchanged)", body = GroupSummaryResponse),
        (status = 403, description = "Caller does not own the group", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse),
        (status = 409, description = "Duplicate group name for this owner", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn rename_group(
    State(service): State<Arc<AppService>>,
    Extension(current_user): Extension<CurrentUser>,
    Path(group_id): Path<Uuid>,
    Json(req): Json<UpdateGroupRequest>,
) -> Result<Json<GroupSummaryResponse>, ApiError> {
    let group = service.rename_group(group_id, current_user.user_id, &req.name).await?;
    Ok(Json(group))
}

#[utoipa::path(
    get,
    path = "/invitations",
    responses(
        (status = 200, description = "Pending invitations for the caller's email, oldest first", body = InvitationsResponse),
        (status = 401, description = "Token carries no email claim", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn list_invitations(
    State(service): State<Arc<AppService>>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<Json<InvitationsResponse>, ApiError> {
    let email = current_user
        .email
        .as_deref()
        .filter(|email| !email.trim().is_empty())
        .ok_or_else(|| LoopMeetError::Unauthorized("Token carries no email claim".to_string()))?;
    let invitations = service.list_pending_invitations(email).await?;
    Ok(Json(InvitationsResponse { invitations }))
}

#[utoipa::path(
    post,
    path = "/groups/{group_id}/invitations",
    params(("group_id" = Uuid, Path, description = "Group to invite into")),
    request_body = CreateInvitationRequest,
    responses(
        (status = 201, description = "Invitation created", body = InvitationResponse),
        (status = 400, description = "Blank email", body = ErrorResponse),
        (status = 403, description = "Caller does not own the group", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse),
        (status = 409, description = "Already a member or invitation pending", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn create_invitation(
    State(service): State<Arc<AppService>>,
    Extension(current_user): Extension<CurrentUser>,
    Path(group_id): Path<Uuid>,
    Json(req): Json<CreateInvitationRequest>,
) -> Result<(StatusCode, Json<InvitationResponse>), ApiError> {
    let invitation = service
        .create_invitation(current_user.user_id, group_id, &req.email)
        .await?;
    Ok((StatusCode::CREATED, Json(invitation)))
}

#[utoipa::path(
    post,
    path = "/invitations/{invitation_id}/accept",
    params(("invitation_id" = Uuid, Path, description = "Invitation to accept")),
    responses(
        (status = 200, description = "Invitation accepted, membership created", body = InvitationResponse),
        (status = 404, description = "Invitation missing, settled, or not addressed to the caller", body = ErrorResponse),
        (status = 409, description = "Caller already belongs to the group", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn accept_invitation(
    State(service): State<Arc<AppService>>,
    Extension(current_user): Extension<CurrentUser>,
    Path(invitation_id): Path<Uuid>,
) -> Result<Json<InvitationResponse>, ApiError> {
    let email = current_user
        .email
        .as_deref()
        .filter(|email| !email.trim().is_empty())
        .ok_or_else(|| LoopMeetError::Unauthorized("Token carries no email claim".to_string()))?;
    let invitation = service
        .accept_invitation(current_user.user_id, email, invitation_id)
        .await?;
    Ok(Json(invitation))
}

#[utoipa::path(
    post,
    path = "/invitations/{invitation_id}/decline",
    params(("invitation_id" = Uuid, Path, description = "Invitation to decline")),
    responses(
        (status = 200, description = "Invitation declined", body = InvitationResponse),
        (status = 404, description = "Invitation missing, settled, or not addressed to the caller", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn decline_invitation(
    State(service): State<Arc<AppService>>,
    Extension(current_user): Extension<CurrentUser>,
    Path(invitation_id): Path<Uuid>,
) -> Result<Json<InvitationResponse>, ApiError> {
    let email = current_user
        .email
        .as_deref()
        .filter(|email| !email.trim().is_empty())
        .ok_or_else(|| LoopMeetError::Unauthorized("Token carries no email claim".to_string()))?;
    let invitation = service
        .decline_invitation(current_user.user_id, email, invitation_id)
        .await?;
    Ok(Json(invitation))
}

#[utoipa::path(
    get,
    path = "/users/profile",
    responses(
        (status = 200, description = "Profile with avatar resolution and password-capability flags", body = UserProfileResponse),
        (status = 404, description = "No profile stored for the caller", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_profile(
    State(service): State<Arc<AppService>>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<Json<UserProfileResponse>, ApiError> {
    let user = service
        .get_profile(current_user.user_id)
        .await?
        .ok_or(LoopMeetError::ProfileNotFound(current_user.user_id))?;
    let profile = service.build_profile(&user, Some(&current_user.access_token)).await?;
    Ok(Json(profile))
}

#[utoipa::path(
    post,
    path = "/users/profile",
    request_body = UserProfileRequest,
    responses(
        (status = 200, description = "Profile created or updated", body = User),
        (status = 400, description = "Missing email on first creation", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn upsert_profile(
    State(service): State<Arc<AppService>>,
    Extension(current_user): Extension<CurrentUser>,
    Json(req): Json<UserProfileRequest>,
) -> Result<Json<User>, ApiError> {
    let user = service.upsert_profile(current_user.user_id, &req).await?;
    Ok(Json(user))
}

#[utoipa::path(
    patch,
    path = "/users/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile fields updated", body = User),
        (status = 404, description = "No profile stored for the caller", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn update_profile(
    State(service): State<Arc<AppService>>,
    Extension(current_user): Extension<CurrentUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<User>, ApiError> {
    let user = service.update_profile(current_user.user_id, &req).await?;
    Ok(Json(user))
}

#[utoipa::path(
    post,
    path = "/users/password",
    request_body = PasswordChangeRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Validation or current-password failure", body = ErrorResponse),
        (status = 422, description = "No email could be resolved", body = ErrorResponse),
        (status = 500, description = "Identity provider failure", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn change_password(
    State(service): State<Arc<AppService>>,
    Extension(current_user): Extension<CurrentUser>,
    Json(req): Json<PasswordChangeRequest>,
) -> Result<StatusCode, ApiError> {
    let profile_email = service
        .get_profile(current_user.user_id)
        .await?
        .map(|user| user.email);
    service
        .change_password(
            current_user.user_id,
            profile_email.as_deref(),
            current_user.email.as_deref(),
            Some(&current_user.access_token),
            &req,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
