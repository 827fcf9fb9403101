//! BrokerDesk API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::sync::Arc;

use brokerdesk_application::{ObjectStorage, PasswordHasher};
use brokerdesk_core::AppError;
use brokerdesk_infrastructure::{
    Argon2PasswordHasher, FilesystemObjectStorage, LocalStorage, demo_seed,
};
use tracing::info;

use crate::api_config::ApiConfig;
use crate::api_services::{
    WorkspaceSources, build_contact_service, build_postgres_session_layer, build_workspace,
    connect_and_migrate,
};
use crate::state::{AppState, DemoWorkspace, WorkspaceMode};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    api_config::init_tracing();

    let config = ApiConfig::load()?;
    let pool = connect_and_migrate(&config.database_url).await?;

    if config.migrate_only {
        info!("database migrations applied");
        return Ok(());
    }

    let session_layer = build_postgres_session_layer(pool.clone(), config.cookie_secure).await?;

    let object_storage: Arc<dyn ObjectStorage> = Arc::new(FilesystemObjectStorage::new(
        config.storage_root.clone(),
        config.public_storage_url.clone(),
    ));
    let password_hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());

    let live = build_workspace(
        WorkspaceMode::Live,
        WorkspaceSources::postgres(&pool),
        Arc::clone(&object_storage),
        Arc::clone(&password_hasher),
        None,
    );

    let demo_storage = Arc::new(match &config.demo_storage_path {
        Some(path) => LocalStorage::open(path).await?,
        None => LocalStorage::in_memory(),
    });
    let demo = build_workspace(
        WorkspaceMode::Demo,
        WorkspaceSources::local(&demo_storage),
        object_storage,
        password_hasher,
        Some(DemoWorkspace {
            storage: Arc::clone(&demo_storage),
            identity: demo_seed::demo_admin_identity(),
        }),
    );

    if let Some(admin) = &config.bootstrap_admin {
        let created = live
            .users
            .bootstrap_admin(admin.tenant_id, "Administrador", &admin.email, &admin.password)
            .await?;
        if let Some(profile) = created {
            info!(
                user_id = %profile.id,
                tenant_id = %admin.tenant_id,
                "bootstrap administrator created"
            );
        }
    }

    let app_state = AppState {
        live,
        demo,
        contact: build_contact_service(&config),
        postgres_pool: Some(pool),
        frontend_url: config.frontend_url.clone(),
    };

    let app = api_router::build_router(app_state, &config.storage_root, session_layer)?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "brokerdesk-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
