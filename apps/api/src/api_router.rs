use std::path::Path;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use brokerdesk_application::MAX_UPLOAD_BYTES;
use brokerdesk_core::AppError;
use brokerdesk_domain::{Company, Delegation, Department, Product, SystemAlert};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::handlers::resources::{
    create_handler, delete_handler, get_handler, list_handler, update_handler,
};
use crate::state::{AppState, Workspace, WorkspaceMode};
use crate::{handlers, middleware};

/// Assembles the live tree under `/api`, the demo tree under `/api/demo`,
/// the public routes and the uploaded files under `/files`.
///
/// The server passes a PostgreSQL-backed session layer; any session store
/// works.
pub fn build_router<Store>(
    app_state: AppState,
    storage_root: &Path,
    session_layer: SessionManagerLayer<Store>,
) -> Result<Router, AppError>
where
    Store: SessionStore + Clone,
{
    let cors_layer = frontend_cors(&app_state.frontend_url)?;

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/api/contact", post(handlers::contact::contact_handler))
        .nest("/api/demo", workspace_routes(app_state.demo.clone()))
        .nest("/api", workspace_routes(app_state.live.clone()))
        .nest_service("/files", ServeDir::new(storage_root))
        .layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state))
}

/// Credentialed CORS for the single frontend origin, shared by both trees.
fn frontend_cors(frontend_url: &str) -> Result<CorsLayer, AppError> {
    let origin = HeaderValue::from_str(frontend_url.trim_end_matches('/'))
        .map_err(|error| AppError::Validation(format!("invalid FRONTEND_URL: {error}")))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE]))
}

/// Every route of one workspace, bound to that workspace's services.
fn workspace_routes<S>(workspace: Workspace) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let mut protected = Router::new()
        .route("/auth/me", get(handlers::auth::me_handler))
        .merge(user_routes())
        .merge(collection_routes())
        .merge(company_routes())
        .merge(department_routes())
        .merge(category_routes())
        .merge(product_routes())
        .merge(news_routes())
        .merge(notification_routes())
        .route(
            "/settings",
            get(handlers::settings::get_settings_handler)
                .put(handlers::settings::save_settings_handler),
        )
        .route(
            "/imports/{kind}/preview",
            post(handlers::imports::preview_import_handler),
        )
        .route(
            "/imports/{kind}",
            post(handlers::imports::submit_import_handler),
        );
    if workspace.mode == WorkspaceMode::Demo {
        protected = protected.route("/reset", post(handlers::auth::demo_reset_handler));
    }
    let protected = protected.route_layer(from_fn_with_state(
        workspace.clone(),
        middleware::require_auth,
    ));

    let public = match workspace.mode {
        WorkspaceMode::Live => {
            Router::new().route("/auth/login", post(handlers::auth::login_handler))
        }
        WorkspaceMode::Demo => {
            Router::new().route("/session", post(handlers::auth::demo_session_handler))
        }
    }
    .route("/auth/logout", post(handlers::auth::logout_handler));

    protected.merge(public).with_state(workspace)
}

fn user_routes() -> Router<Workspace> {
    Router::new()
        .route(
            "/users",
            get(handlers::users::list_users_handler).post(handlers::users::provision_user_handler),
        )
        .route(
            "/users/{id}",
            get(handlers::users::get_user_handler)
                .put(handlers::users::update_user_handler)
                .delete(handlers::users::delete_user_handler),
        )
        .route(
            "/users/{id}/permissions",
            put(handlers::users::update_permissions_handler),
        )
        .route(
            "/profile",
            get(handlers::users::get_profile_handler).put(handlers::users::update_profile_handler),
        )
        .route(
            "/profile/avatar",
            post(handlers::users::upload_avatar_handler),
        )
}

fn collection_routes() -> Router<Workspace> {
    Router::new()
        .route(
            "/delegations",
            get(list_handler::<Delegation>).post(create_handler::<Delegation>),
        )
        .route(
            "/delegations/{id}",
            get(get_handler::<Delegation>)
                .put(update_handler::<Delegation>)
                .delete(delete_handler::<Delegation>),
        )
        .route(
            "/companies",
            get(list_handler::<Company>).post(create_handler::<Company>),
        )
        .route(
            "/companies/{id}",
            get(get_handler::<Company>)
                .put(update_handler::<Company>)
                .delete(delete_handler::<Company>),
        )
        .route(
            "/departments",
            get(list_handler::<Department>).post(create_handler::<Department>),
        )
        .route(
            "/departments/{id}",
            get(get_handler::<Department>)
                .put(update_handler::<Department>)
                .delete(delete_handler::<Department>),
        )
        .route(
            "/system-alerts",
            get(list_handler::<SystemAlert>).post(create_handler::<SystemAlert>),
        )
        .route(
            "/system-alerts/{id}",
            get(get_handler::<SystemAlert>)
                .put(update_handler::<SystemAlert>)
                .delete(delete_handler::<SystemAlert>),
        )
}

fn company_routes() -> Router<Workspace> {
    Router::new()
        .route(
            "/companies/{id}/specifications",
            get(handlers::companies::list_specifications_handler)
                .post(handlers::companies::create_specification_handler),
        )
        .route(
            "/companies/{id}/specifications/{specification_id}",
            put(handlers::companies::update_specification_handler)
                .delete(handlers::companies::delete_specification_handler),
        )
        .route(
            "/companies/{id}/specification-categories",
            get(handlers::companies::list_specification_categories_handler)
                .post(handlers::companies::create_specification_category_handler),
        )
        .route(
            "/companies/{id}/specification-categories/{category_id}",
            put(handlers::companies::update_specification_category_handler)
                .delete(handlers::companies::delete_specification_category_handler),
        )
}

fn department_routes() -> Router<Workspace> {
    Router::new()
        .route(
            "/departments/{id}/contents",
            get(handlers::departments::list_contents_handler)
                .post(handlers::departments::create_content_handler),
        )
        .route(
            "/departments/{id}/contents/{content_id}",
            put(handlers::departments::update_content_handler)
                .delete(handlers::departments::delete_content_handler),
        )
}

fn category_routes() -> Router<Workspace> {
    Router::new()
        .route(
            "/product-categories",
            get(handlers::categories::list_categories_handler)
                .post(handlers::categories::create_category_handler),
        )
        .route(
            "/product-categories/selectable-parents",
            get(handlers::categories::new_category_parents_handler),
        )
        .route(
            "/product-categories/{id}",
            get(handlers::categories::get_category_handler)
                .put(handlers::categories::update_category_handler)
                .delete(handlers::categories::delete_category_handler),
        )
        .route(
            "/product-categories/{id}/selectable-parents",
            get(handlers::categories::selectable_parents_handler),
        )
}

fn product_routes() -> Router<Workspace> {
    Router::new()
        .route(
            "/products",
            get(list_handler::<Product>).post(create_handler::<Product>),
        )
        .route(
            "/products/changes",
            get(handlers::products::product_changes_handler),
        )
        .route(
            "/products/{id}",
            get(get_handler::<Product>)
                .put(update_handler::<Product>)
                .delete(delete_handler::<Product>),
        )
        .route(
            "/products/{id}/documents",
            post(handlers::products::upload_document_handler)
                .delete(handlers::products::remove_document_handler),
        )
}

fn news_routes() -> Router<Workspace> {
    Router::new()
        .route(
            "/news",
            get(handlers::news::list_news_handler).post(handlers::news::create_news_handler),
        )
        .route(
            "/news/{id}",
            get(handlers::news::get_news_handler)
                .put(handlers::news::update_news_handler)
                .delete(handlers::news::delete_news_handler),
        )
        .route(
            "/news/{id}/publish",
            post(handlers::news::publish_news_handler),
        )
        .route(
            "/news/{id}/unpublish",
            post(handlers::news::unpublish_news_handler),
        )
        .route(
            "/news/{id}/image",
            post(handlers::news::upload_news_image_handler),
        )
}

fn notification_routes() -> Router<Workspace> {
    Router::new()
        .route(
            "/notifications",
            get(handlers::notifications::list_notifications_handler),
        )
        .route(
            "/notifications/read-all",
            post(handlers::notifications::mark_all_read_handler),
        )
        .route(
            "/notifications/stream",
            get(handlers::notifications::notification_stream_handler),
        )
        .route(
            "/notifications/{id}/read",
            post(handlers::notifications::mark_read_handler),
        )
}

#[cfg(test)]
mod tests;
