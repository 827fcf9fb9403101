use std::sync::Arc;

use axum::Json;
use axum::body::{Bytes, to_bytes};
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use brokerdesk_application::{ContactMessage, ContactService};
use brokerdesk_core::{AppError, RecordId, UserIdentity};
use brokerdesk_domain::{Company, Delegation, DelegationDraft, Product, ProductDraft};
use brokerdesk_infrastructure::{
    Argon2PasswordHasher, ConsoleContactRelay, FilesystemObjectStorage, LocalStorage, demo_seed,
};
use tempfile::TempDir;
use uuid::Uuid;

use crate::api_services::{WorkspaceSources, build_workspace};
use crate::state::{AppState, DemoWorkspace, Workspace, WorkspaceMode};

use super::resources::{create_handler, delete_handler, list_handler};
use super::{auth, categories, contact, imports, news, notifications};

fn seeded_id(sequence: u128) -> RecordId {
    RecordId::from_uuid(Uuid::from_u128(
        0xde30_0000_0000_4000_8000_0000_0000_0000 | sequence,
    ))
}

fn admin() -> UserIdentity {
    demo_seed::demo_admin_identity()
}

fn agent() -> UserIdentity {
    UserIdentity::new(
        seeded_id(0x0101).to_string(),
        "Marta Ruiz",
        Some("marta.ruiz@correduria.es".to_owned()),
        demo_seed::demo_tenant_id(),
    )
}

fn demo_workspace(files: &TempDir) -> Workspace {
    let storage = Arc::new(LocalStorage::in_memory());
    build_workspace(
        WorkspaceMode::Demo,
        WorkspaceSources::local(&storage),
        Arc::new(FilesystemObjectStorage::new(
            files.path(),
            "http://localhost:3001/files",
        )),
        Arc::new(Argon2PasswordHasher::new()),
        Some(DemoWorkspace {
            storage,
            identity: admin(),
        }),
    )
}

fn files() -> TempDir {
    tempfile::tempdir().unwrap_or_else(|_| unreachable!())
}

#[tokio::test]
async fn demo_tree_lists_seeded_delegations() {
    let files = files();
    let workspace = demo_workspace(&files);

    let Json(delegations) = list_handler::<Delegation>(State(workspace), Extension(admin()))
        .await
        .unwrap_or_else(|_| unreachable!());

    assert!(!delegations.is_empty());
}

#[tokio::test]
async fn creating_a_product_returns_created() {
    let files = files();
    let workspace = demo_workspace(&files);

    let (status, Json(product)) = create_handler::<Product>(
        State(workspace.clone()),
        Extension(agent()),
        Json(ProductDraft {
            title: "Decesos Familiar".to_owned(),
            category_id: Some(seeded_id(0x0500)),
            ..ProductDraft::default()
        }),
    )
    .await
    .unwrap_or_else(|_| unreachable!());

    assert_eq!(status, StatusCode::CREATED);
    let Json(products) = list_handler::<Product>(State(workspace), Extension(admin()))
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(products.iter().any(|listed| listed.id == product.id));
}

#[tokio::test]
async fn missing_section_rights_are_forbidden() {
    let files = files();
    let workspace = demo_workspace(&files);

    let created = create_handler::<Delegation>(
        State(workspace.clone()),
        Extension(agent()),
        Json(DelegationDraft {
            name: "Delegación Norte".to_owned(),
            ..DelegationDraft::default()
        }),
    )
    .await;
    assert!(matches!(created, Err(error) if matches!(error.0, AppError::Forbidden(_))));

    let deleted = delete_handler::<Product>(
        State(workspace),
        Extension(agent()),
        Path(seeded_id(0x0600)),
    )
    .await;
    assert!(deleted.is_err_and(|error| error.into_response().status() == StatusCode::FORBIDDEN));
}

#[tokio::test]
async fn selectable_parents_exclude_the_category_subtree() {
    let files = files();
    let workspace = demo_workspace(&files);

    let Json(parents) = categories::selectable_parents_handler(
        State(workspace),
        Extension(admin()),
        Path(seeded_id(0x0500)),
    )
    .await
    .unwrap_or_else(|_| unreachable!());

    let ids: Vec<RecordId> = parents.iter().map(|category| category.id).collect();
    assert!(!ids.contains(&seeded_id(0x0500)));
    assert!(!ids.contains(&seeded_id(0x0501)));
    assert!(ids.contains(&seeded_id(0x0502)));
}

#[tokio::test]
async fn publishing_a_draft_notifies_other_users() {
    let files = files();
    let workspace = demo_workspace(&files);

    let Json(published) = news::publish_news_handler(
        State(workspace.clone()),
        Extension(admin()),
        Path(seeded_id(0x0801)),
    )
    .await
    .unwrap_or_else(|_| unreachable!());
    assert!(published.published);

    let Json(inbox) =
        notifications::list_notifications_handler(State(workspace), Extension(agent()))
            .await
            .unwrap_or_else(|_| unreachable!());
    assert!(
        inbox
            .iter()
            .any(|notification| notification.description == published.title)
    );
}

#[tokio::test]
async fn import_preview_reports_row_errors() {
    let files = files();
    let workspace = demo_workspace(&files);
    let csv = "name,email\nDelegación Sur,sur@correduria.es\n,sin-nombre@correduria.es\n";

    let response = imports::preview_import_handler(
        State(workspace),
        Extension(admin()),
        Path("delegations".to_owned()),
        Bytes::from_static(csv.as_bytes()),
    )
    .await
    .unwrap_or_else(|_| unreachable!());

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    let preview: serde_json::Value = serde_json::from_slice(&body).unwrap_or_default();
    let rows = preview["rows"].as_array().cloned().unwrap_or_default();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["errors"].as_array().map(Vec::len), Some(0));
    assert_eq!(rows[1]["errors"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn kinds_without_a_csv_mapping_are_not_importable() {
    let files = files();
    let workspace = demo_workspace(&files);

    let response = imports::submit_import_handler(
        State(workspace),
        Extension(admin()),
        Path("news".to_owned()),
        Bytes::from_static(b"title\nCierre anual\n"),
    )
    .await;

    assert!(response.is_err_and(|error| matches!(error.0, AppError::Validation(_))));
}

#[tokio::test]
async fn demo_reset_restores_seeded_records() {
    let files = files();
    let workspace = demo_workspace(&files);

    delete_handler::<Product>(
        State(workspace.clone()),
        Extension(admin()),
        Path(seeded_id(0x0600)),
    )
    .await
    .unwrap_or_else(|_| unreachable!());

    let status = auth::demo_reset_handler(State(workspace.clone()), Extension(admin()))
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(status, StatusCode::NO_CONTENT);

    let Json(products) = list_handler::<Product>(State(workspace), Extension(admin()))
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(products.iter().any(|product| product.id == seeded_id(0x0600)));
}

#[tokio::test]
async fn deleting_a_company_cleans_up_its_dependents_in_the_demo_store() {
    let files = files();
    let workspace = demo_workspace(&files);
    let company_id = seeded_id(0x0300);

    let status = delete_handler::<Company>(
        State(workspace.clone()),
        Extension(admin()),
        Path(company_id),
    )
    .await
    .unwrap_or_else(|_| unreachable!());
    assert_eq!(status, StatusCode::NO_CONTENT);

    let specifications = workspace
        .specifications
        .list_specifications(&admin(), company_id)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(specifications.is_empty());
    let specification_categories = workspace
        .specifications
        .list_categories(&admin(), company_id)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(specification_categories.is_empty());

    let Json(products) = list_handler::<Product>(State(workspace.clone()), Extension(admin()))
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(products.iter().all(|product| product.company_id != Some(company_id)));

    let news = workspace
        .news
        .list(&admin())
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(news.iter().all(|article| !article.company_ids.contains(&company_id)));
}

#[tokio::test]
async fn deleting_a_delegation_clears_it_from_demo_users() {
    let files = files();
    let workspace = demo_workspace(&files);
    let delegation_id = seeded_id(0x0200);

    delete_handler::<Delegation>(
        State(workspace.clone()),
        Extension(admin()),
        Path(delegation_id),
    )
    .await
    .unwrap_or_else(|_| unreachable!());

    let marta = workspace
        .users
        .find(&admin(), seeded_id(0x0101))
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(marta.delegation_id, None);
}

#[tokio::test]
async fn contact_form_is_accepted() {
    let files = files();
    let state = AppState {
        live: demo_workspace(&files),
        demo: demo_workspace(&files),
        contact: ContactService::new(Arc::new(ConsoleContactRelay::new())),
        postgres_pool: None,
        frontend_url: "http://localhost:3000".to_owned(),
    };

    let (status, _) = contact::contact_handler(
        State(state),
        Json(ContactMessage {
            name: "Lucía Gómez".to_owned(),
            email: "lucia@example.es".to_owned(),
            company: None,
            phone: Some("600000000".to_owned()),
            message: "Quiero información sobre seguros de flota.".to_owned(),
        }),
    )
    .await
    .unwrap_or_else(|_| unreachable!());

    assert_eq!(status, StatusCode::ACCEPTED);
}
