use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use brokerdesk_application::ContactMessage;

use crate::dto::GenericMessageResponse;
use crate::error::ApiResult;
use crate::state::AppState;

/// Public marketing contact form.
pub async fn contact_handler(
    State(state): State<AppState>,
    Json(message): Json<ContactMessage>,
) -> ApiResult<(StatusCode, Json<GenericMessageResponse>)> {
    state.contact.submit(message).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(GenericMessageResponse {
            message: "Mensaje enviado correctamente".to_owned(),
        }),
    ))
}
