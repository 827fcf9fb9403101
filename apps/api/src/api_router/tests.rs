use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode, header};
use brokerdesk_application::ContactService;
use brokerdesk_infrastructure::{
    Argon2PasswordHasher, ConsoleContactRelay, FilesystemObjectStorage, LocalStorage, demo_seed,
};
use tempfile::TempDir;
use tower::ServiceExt;
use tower_sessions::{MemoryStore, SessionManagerLayer};

use super::build_router;
use crate::api_services::{WorkspaceSources, build_workspace};
use crate::state::{AppState, DemoWorkspace, Workspace, WorkspaceMode};

const FRONTEND: &str = "http://localhost:3000";

fn workspace(mode: WorkspaceMode, files: &TempDir) -> Workspace {
    let storage = Arc::new(LocalStorage::in_memory());
    let demo = (mode == WorkspaceMode::Demo).then(|| DemoWorkspace {
        storage: Arc::clone(&storage),
        identity: demo_seed::demo_admin_identity(),
    });

    build_workspace(
        mode,
        WorkspaceSources::local(&storage),
        Arc::new(FilesystemObjectStorage::new(
            files.path(),
            "http://localhost:3001/files",
        )),
        Arc::new(Argon2PasswordHasher::new()),
        demo,
    )
}

fn router(files: &TempDir) -> Router {
    let state = AppState {
        live: workspace(WorkspaceMode::Live, files),
        demo: workspace(WorkspaceMode::Demo, files),
        contact: ContactService::new(Arc::new(ConsoleContactRelay::new())),
        postgres_pool: None,
        frontend_url: FRONTEND.to_owned(),
    };
    let sessions = SessionManagerLayer::new(MemoryStore::default()).with_secure(false);

    build_router(state, files.path(), sessions).unwrap_or_else(|_| unreachable!())
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    headers: &[(header::HeaderName, &str)],
) -> Response<Body> {
    let mut request = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        request = request.header(name, *value);
    }

    router
        .clone()
        .oneshot(request.body(Body::empty()).unwrap_or_else(|_| unreachable!()))
        .await
        .unwrap_or_else(|_| unreachable!())
}

fn session_cookie(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::to_owned)
        .unwrap_or_default()
}

#[tokio::test]
async fn anonymous_demo_reset_is_rejected() {
    let files = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
    let router = router(&files);

    let response = send(&router, Method::POST, "/api/demo/reset", &[]).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn live_tree_requires_a_signed_in_session() {
    let files = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
    let router = router(&files);

    let response = send(&router, Method::GET, "/api/companies", &[]).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn demo_session_opens_the_demo_tree_only() {
    let files = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
    let router = router(&files);

    let signed_in = send(&router, Method::POST, "/api/demo/session", &[]).await;
    assert_eq!(signed_in.status(), StatusCode::OK);
    let cookie = session_cookie(&signed_in);
    assert!(!cookie.is_empty());

    let demo = send(
        &router,
        Method::GET,
        "/api/demo/companies",
        &[(header::COOKIE, cookie.as_str())],
    )
    .await;
    assert_eq!(demo.status(), StatusCode::OK);

    let live = send(
        &router,
        Method::GET,
        "/api/companies",
        &[(header::COOKIE, cookie.as_str())],
    )
    .await;
    assert_eq!(live.status(), StatusCode::UNAUTHORIZED);

    let reset = send(
        &router,
        Method::POST,
        "/api/demo/reset",
        &[(header::COOKIE, cookie.as_str())],
    )
    .await;
    assert_eq!(reset.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn cross_site_mutations_are_blocked_before_routing() {
    let files = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
    let router = router(&files);

    let response = send(
        &router,
        Method::POST,
        "/api/demo/session",
        &[(header::ORIGIN, "https://evil.example")],
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
