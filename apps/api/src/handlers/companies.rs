//! Specifications and specification categories nested under a company.

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use brokerdesk_core::{RecordId, UserIdentity};
use brokerdesk_domain::{
    CompanySpecification, CompanySpecificationDraft, CompanySpecificationPatch,
    SpecificationCategory, SpecificationCategoryDraft, SpecificationCategoryPatch,
};

use crate::error::ApiResult;
use crate::state::Workspace;

pub async fn list_specifications_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path(company_id): Path<RecordId>,
) -> ApiResult<Json<Vec<CompanySpecification>>> {
    Ok(Json(
        workspace
            .specifications
            .list_specifications(&user, company_id)
            .await?,
    ))
}

pub async fn create_specification_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path(company_id): Path<RecordId>,
    Json(draft): Json<CompanySpecificationDraft>,
) -> ApiResult<(StatusCode, Json<CompanySpecification>)> {
    let specification = workspace
        .specifications
        .create_specification(&user, company_id, draft)
        .await?;
    Ok((StatusCode::CREATED, Json(specification)))
}

pub async fn update_specification_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path((company_id, id)): Path<(RecordId, RecordId)>,
    Json(patch): Json<CompanySpecificationPatch>,
) -> ApiResult<Json<CompanySpecification>> {
    Ok(Json(
        workspace
            .specifications
            .update_specification(&user, company_id, id, patch)
            .await?,
    ))
}

pub async fn delete_specification_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path((company_id, id)): Path<(RecordId, RecordId)>,
) -> ApiResult<StatusCode> {
    workspace
        .specifications
        .delete_specification(&user, company_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_specification_categories_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path(company_id): Path<RecordId>,
) -> ApiResult<Json<Vec<SpecificationCategory>>> {
    Ok(Json(
        workspace
            .specifications
            .list_categories(&user, company_id)
            .await?,
    ))
}

pub async fn create_specification_category_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path(company_id): Path<RecordId>,
    Json(draft): Json<SpecificationCategoryDraft>,
) -> ApiResult<(StatusCode, Json<SpecificationCategory>)> {
    let category = workspace
        .specifications
        .create_category(&user, company_id, draft)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_specification_category_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path((company_id, id)): Path<(RecordId, RecordId)>,
    Json(patch): Json<SpecificationCategoryPatch>,
) -> ApiResult<Json<SpecificationCategory>> {
    Ok(Json(
        workspace
            .specifications
            .update_category(&user, company_id, id, patch)
            .await?,
    ))
}

/// Deletes a category; its specifications become uncategorized.
pub async fn delete_specification_category_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path((company_id, id)): Path<(RecordId, RecordId)>,
) -> ApiResult<StatusCode> {
    workspace
        .specifications
        .delete_category(&user, company_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
