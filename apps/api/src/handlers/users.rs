use axum::Json;
use axum::body::Bytes;
use axum::extract::{Extension, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use brokerdesk_application::{ProvisionUser, UserListing};
use brokerdesk_core::{RecordId, UserIdentity};
use brokerdesk_domain::{UserProfile, UserProfilePatch};

use crate::dto::{UpdatePermissionsRequest, UploadQuery};
use crate::error::ApiResult;
use crate::state::Workspace;

use super::uploads::read_upload;

pub async fn list_users_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<UserListing>>> {
    Ok(Json(workspace.users.list(&user).await?))
}

/// Provisions an account with its profile, role and permission rows.
pub async fn provision_user_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<ProvisionUser>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    let profile = workspace.users.provision(&user, payload).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn get_user_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<RecordId>,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(workspace.users.find(&user, id).await?))
}

pub async fn update_user_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<RecordId>,
    Json(patch): Json<UserProfilePatch>,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(workspace.users.update(&user, id, patch).await?))
}

pub async fn delete_user_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<RecordId>,
) -> ApiResult<StatusCode> {
    workspace.cascade.delete_user(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_permissions_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<RecordId>,
    Json(payload): Json<UpdatePermissionsRequest>,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(
        workspace
            .users
            .update_permissions(&user, id, payload.role, payload.permissions)
            .await?,
    ))
}

pub async fn get_profile_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(workspace.users.current(&user).await?))
}

pub async fn update_profile_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Json(patch): Json<UserProfilePatch>,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(workspace.users.update_current(&user, patch).await?))
}

pub async fn upload_avatar_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<UserProfile>> {
    let upload = read_upload(&headers, query, body);
    Ok(Json(workspace.uploads.upload_avatar(&user, upload).await?))
}
