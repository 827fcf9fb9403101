use axum::Json;
use axum::body::Bytes;
use axum::extract::{Extension, Path, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use brokerdesk_core::{RecordId, UserIdentity};
use brokerdesk_domain::{Capability, Product, Resource};

use crate::dto::{DocumentQuery, UploadQuery};
use crate::error::ApiResult;
use crate::state::Workspace;

use super::live::{event_stream, json_event};
use super::uploads::read_upload;

pub async fn upload_document_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<RecordId>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Product>> {
    let upload = read_upload(&headers, query, body);
    Ok(Json(
        workspace
            .uploads
            .upload_product_document(&user, id, upload)
            .await?,
    ))
}

pub async fn remove_document_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<RecordId>,
    Query(query): Query<DocumentQuery>,
) -> ApiResult<Json<Product>> {
    Ok(Json(
        workspace
            .uploads
            .remove_product_document(&user, id, &query.url)
            .await?,
    ))
}

/// Live feed of product writes in the caller's tenant.
pub async fn product_changes_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<impl IntoResponse> {
    workspace
        .products
        .require(&user, Capability::View)
        .await?;

    let tenant_id = user.tenant_id();
    let receiver = workspace.changes.subscribe();
    Ok(event_stream(receiver, move |event| {
        (event.tenant_id == tenant_id && event.resource == Product::KIND)
            .then(|| json_event("change", &event))
            .flatten()
    }))
}
