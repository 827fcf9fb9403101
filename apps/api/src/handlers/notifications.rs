use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::response::IntoResponse;
use brokerdesk_core::{RecordId, UserIdentity};
use brokerdesk_domain::Notification;

use crate::dto::CountResponse;
use crate::error::ApiResult;
use crate::state::Workspace;

use super::live::{event_stream, json_event};

pub async fn list_notifications_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<Notification>>> {
    Ok(Json(workspace.notifications.list_for_actor(&user).await?))
}

pub async fn mark_read_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<RecordId>,
) -> ApiResult<Json<Notification>> {
    Ok(Json(workspace.notifications.mark_read(&user, id).await?))
}

pub async fn mark_all_read_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<CountResponse>> {
    let count = workspace.notifications.mark_all_read(&user).await?;
    Ok(Json(CountResponse { count }))
}

/// Live feed of the caller's own notifications, new and updated.
pub async fn notification_stream_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<impl IntoResponse> {
    let tenant_id = user.tenant_id();
    let subject = user.subject().to_owned();
    let receiver = workspace.changes.subscribe();

    Ok(event_stream(receiver, move |event| {
        if event.tenant_id != tenant_id {
            return None;
        }
        event
            .decode::<Notification>()
            .filter(|notification| notification.user_id.to_string() == subject)
            .and_then(|notification| json_event("notification", &notification))
    }))
}
