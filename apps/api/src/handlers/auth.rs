use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use brokerdesk_application::AuthOutcome;
use brokerdesk_core::{AppError, UserIdentity};
use tower_sessions::Session;
use tracing::info;

use crate::dto::{LoginRequest, SessionResponse};
use crate::error::ApiResult;
use crate::state::{DemoWorkspace, Workspace, WorkspaceMode};

/// POST /auth/login - Authenticate with email and password.
pub async fn login_handler(
    State(workspace): State<Workspace>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<SessionResponse>> {
    match workspace
        .users
        .login(&payload.email, &payload.password)
        .await?
    {
        AuthOutcome::Authenticated(identity) => {
            // Regenerate the session id on privilege change.
            session.cycle_id().await.map_err(|error| {
                AppError::Internal(format!("failed to cycle session id: {error}"))
            })?;
            store_identity(&workspace, &session, &identity).await?;
            info!(subject = %identity.subject(), "user signed in");

            session_response(&workspace, &identity).await
        }
        AuthOutcome::Failed => {
            Err(AppError::Unauthorized("invalid email or password".to_owned()).into())
        }
    }
}

/// POST /auth/logout - Forget the identity of this route tree.
pub async fn logout_handler(
    State(workspace): State<Workspace>,
    session: Session,
) -> ApiResult<StatusCode> {
    match workspace.mode {
        WorkspaceMode::Live => session
            .delete()
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?,
        // A demo sign-out keeps any live identity in the same cookie.
        WorkspaceMode::Demo => {
            session
                .remove_value(workspace.mode.session_key())
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to clear demo session: {error}"))
                })?;
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

/// GET /auth/me - The signed-in user and their effective permissions.
pub async fn me_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<SessionResponse>> {
    session_response(&workspace, &user).await
}

/// POST /session - Sign in to the demo tree as the seeded administrator.
pub async fn demo_session_handler(
    State(workspace): State<Workspace>,
    session: Session,
) -> ApiResult<Json<SessionResponse>> {
    let demo = demo_parts(&workspace)?;
    store_identity(&workspace, &session, &demo.identity).await?;

    session_response(&workspace, &demo.identity).await
}

/// POST /reset - Restore the seeded demo records. Needs a demo session.
pub async fn demo_reset_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<StatusCode> {
    demo_parts(&workspace)?.storage.reset().await?;
    info!(subject = %user.subject(), "demo storage reset");
    Ok(StatusCode::NO_CONTENT)
}

fn demo_parts(workspace: &Workspace) -> Result<&DemoWorkspace, AppError> {
    workspace
        .demo
        .as_ref()
        .ok_or_else(|| AppError::NotFound("demo mode is not available here".to_owned()))
}

async fn store_identity(
    workspace: &Workspace,
    session: &Session,
    identity: &UserIdentity,
) -> Result<(), AppError> {
    session
        .insert(workspace.mode.session_key(), identity)
        .await
        .map_err(|error| AppError::Internal(format!("failed to persist session identity: {error}")))
}

async fn session_response(
    workspace: &Workspace,
    identity: &UserIdentity,
) -> ApiResult<Json<SessionResponse>> {
    let summary = workspace.permissions.summary_for(identity).await?;
    Ok(Json(SessionResponse::new(
        identity,
        workspace.mode == WorkspaceMode::Demo,
        summary,
    )))
}
