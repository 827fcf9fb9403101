use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use brokerdesk_core::{RecordId, UserIdentity};
use brokerdesk_domain::{DepartmentContent, DepartmentContentDraft, DepartmentContentPatch};

use crate::error::ApiResult;
use crate::state::Workspace;

pub async fn list_contents_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path(department_id): Path<RecordId>,
) -> ApiResult<Json<Vec<DepartmentContent>>> {
    Ok(Json(
        workspace
            .departments
            .list_contents(&user, department_id)
            .await?,
    ))
}

pub async fn create_content_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path(department_id): Path<RecordId>,
    Json(draft): Json<DepartmentContentDraft>,
) -> ApiResult<(StatusCode, Json<DepartmentContent>)> {
    let content = workspace
        .departments
        .create_content(&user, department_id, draft)
        .await?;
    Ok((StatusCode::CREATED, Json(content)))
}

pub async fn update_content_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path((department_id, id)): Path<(RecordId, RecordId)>,
    Json(patch): Json<DepartmentContentPatch>,
) -> ApiResult<Json<DepartmentContent>> {
    Ok(Json(
        workspace
            .departments
            .update_content(&user, department_id, id, patch)
            .await?,
    ))
}

pub async fn delete_content_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path((department_id, id)): Path<(RecordId, RecordId)>,
) -> ApiResult<StatusCode> {
    workspace
        .departments
        .delete_content(&user, department_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
