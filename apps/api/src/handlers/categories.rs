use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use brokerdesk_core::{RecordId, UserIdentity};
use brokerdesk_domain::{ProductCategory, ProductCategoryDraft, ProductCategoryPatch};

use crate::error::ApiResult;
use crate::state::Workspace;

pub async fn list_categories_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<ProductCategory>>> {
    Ok(Json(workspace.categories.list(&user).await?))
}

pub async fn get_category_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<RecordId>,
) -> ApiResult<Json<ProductCategory>> {
    Ok(Json(workspace.categories.find(&user, id).await?))
}

pub async fn create_category_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Json(draft): Json<ProductCategoryDraft>,
) -> ApiResult<(StatusCode, Json<ProductCategory>)> {
    let category = workspace.categories.create(&user, draft).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<RecordId>,
    Json(patch): Json<ProductCategoryPatch>,
) -> ApiResult<Json<ProductCategory>> {
    Ok(Json(workspace.categories.update(&user, id, patch).await?))
}

pub async fn delete_category_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<RecordId>,
) -> ApiResult<StatusCode> {
    workspace.cascade.delete_product_category(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Parents offered when creating a category.
pub async fn new_category_parents_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<ProductCategory>>> {
    Ok(Json(
        workspace.categories.selectable_parents(&user, None).await?,
    ))
}

/// Parents offered when editing a category: never itself or a descendant.
pub async fn selectable_parents_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<RecordId>,
) -> ApiResult<Json<Vec<ProductCategory>>> {
    Ok(Json(
        workspace
            .categories
            .selectable_parents(&user, Some(id))
            .await?,
    ))
}
