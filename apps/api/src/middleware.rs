use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use brokerdesk_core::{AppError, UserIdentity};
use tower_sessions::Session;

use crate::error::ApiResult;
use crate::state::{AppState, Workspace};

pub async fn require_auth(
    State(workspace): State<Workspace>,
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = session
        .get::<UserIdentity>(workspace.mode.session_key())
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if is_state_changing_method(request.method()) {
        check_origin(request.headers(), &state.frontend_url)?;
    }

    Ok(next.run(request).await)
}

/// Browsers always send `Origin` or `Sec-Fetch-Site` on mutations; requests
/// carrying neither come from non-browser clients such as the CLI.
fn check_origin(headers: &HeaderMap, allowed_origin: &str) -> Result<(), AppError> {
    let fetch_site = headers.get("sec-fetch-site");
    if fetch_site == Some(&HeaderValue::from_static("cross-site")) {
        return Err(AppError::Unauthorized("cross-site request blocked".to_owned()));
    }

    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok());
    let referer = headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok());

    if fetch_site.is_none() && origin.is_none() && referer.is_none() {
        return Ok(());
    }

    let origin_is_allowed = origin == Some(allowed_origin);
    let referer_is_allowed = referer.is_some_and(|referer| referer.starts_with(allowed_origin));
    if fetch_site == Some(&HeaderValue::from_static("same-origin"))
        || origin_is_allowed
        || referer_is_allowed
    {
        return Ok(());
    }

    Err(AppError::Unauthorized("origin validation failed".to_owned()))
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}
