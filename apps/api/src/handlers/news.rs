use axum::Json;
use axum::body::Bytes;
use axum::extract::{Extension, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use brokerdesk_application::NewsLink;
use brokerdesk_core::{RecordId, UserIdentity};
use brokerdesk_domain::{News, NewsDraft, NewsPatch};

use crate::dto::{NewsQuery, UploadQuery};
use crate::error::ApiResult;
use crate::state::Workspace;

use super::uploads::read_upload;

/// Lists articles; `published` or a link filter restricts to readers' view.
pub async fn list_news_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<NewsQuery>,
) -> ApiResult<Json<Vec<News>>> {
    let link = query
        .company_id
        .map(NewsLink::Company)
        .or(query.category_id.map(NewsLink::Category))
        .or(query.product_id.map(NewsLink::Product));

    let news = match link {
        Some(link) => workspace.news.published_for(&user, link).await?,
        None if query.published => workspace.news.published(&user).await?,
        None => workspace.news.list(&user).await?,
    };
    Ok(Json(news))
}

pub async fn get_news_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<RecordId>,
) -> ApiResult<Json<News>> {
    Ok(Json(workspace.news.resources().find(&user, id).await?))
}

pub async fn create_news_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Json(draft): Json<NewsDraft>,
) -> ApiResult<(StatusCode, Json<News>)> {
    let news = workspace.news.create(&user, draft).await?;
    Ok((StatusCode::CREATED, Json(news)))
}

pub async fn update_news_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<RecordId>,
    Json(patch): Json<NewsPatch>,
) -> ApiResult<Json<News>> {
    Ok(Json(
        workspace.news.resources().update(&user, id, patch).await?,
    ))
}

pub async fn delete_news_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<RecordId>,
) -> ApiResult<StatusCode> {
    workspace.news.resources().delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn publish_news_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<RecordId>,
) -> ApiResult<Json<News>> {
    Ok(Json(workspace.news.publish(&user, id).await?))
}

pub async fn unpublish_news_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<RecordId>,
) -> ApiResult<Json<News>> {
    Ok(Json(workspace.news.unpublish(&user, id).await?))
}

pub async fn upload_news_image_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<RecordId>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<News>> {
    let upload = read_upload(&headers, query, body);
    Ok(Json(
        workspace.uploads.upload_news_image(&user, id, upload).await?,
    ))
}
