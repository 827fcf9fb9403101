use brokerdesk_application::DataSource;
use brokerdesk_core::{AppError, RecordId, TenantId};
use brokerdesk_domain::{
    Company, CompanyDraft, CompanyPatch, News, NewsDraft, NewsPatch, Product, ProductDocument,
    ProductDraft,
};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use super::PostgresDataSource;
use crate::PostgresNewsDataSource;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres data source tests: {error}");
    }

    Some(pool)
}

fn company(name: &str) -> CompanyDraft {
    CompanyDraft {
        name: name.to_owned(),
        manager_email: "gestor@aseguradora.es".to_owned(),
        ..CompanyDraft::default()
    }
}

#[tokio::test]
async fn company_rows_round_trip_through_the_generic_source() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let source = PostgresDataSource::<Company>::new(pool);
    let tenant_id = TenantId::new();

    let created = source.create(tenant_id, company("Mapfre")).await;
    assert!(created.is_ok());
    let created = created.unwrap_or_else(|_| unreachable!());

    let updated = source
        .update(
            tenant_id,
            created.id,
            CompanyPatch {
                website: Some(Some("https://www.mapfre.es".to_owned())),
                ..CompanyPatch::default()
            },
        )
        .await;
    assert_eq!(
        updated.ok().and_then(|company| company.website).as_deref(),
        Some("https://www.mapfre.es")
    );

    let other_tenant = source.list(TenantId::new()).await;
    assert_eq!(other_tenant.map(|records| records.len()).ok(), Some(0));

    let found = source.find(tenant_id, created.id).await;
    assert_eq!(found.ok().flatten().map(|company| company.name), Some("Mapfre".to_owned()));

    assert!(source.delete(tenant_id, created.id).await.is_ok());
    assert!(matches!(
        source.delete(tenant_id, created.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn updating_a_missing_record_is_not_found() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let source = PostgresDataSource::<Company>::new(pool);
    let result = source
        .update(TenantId::new(), RecordId::new(), CompanyPatch::default())
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn product_documents_survive_storage() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let source = PostgresDataSource::<Product>::new(pool);
    let tenant_id = TenantId::new();
    let created = source
        .create(
            tenant_id,
            ProductDraft {
                title: "Hogar Plus".to_owned(),
                documents: vec![ProductDocument {
                    name: "nota.pdf".to_owned(),
                    url: "/storage/product-documents/nota.pdf".to_owned(),
                    content_type: "application/pdf".to_owned(),
                    size: 10,
                }],
                ..ProductDraft::default()
            },
        )
        .await;
    assert!(created.is_ok());

    let listed = source.list(tenant_id).await.unwrap_or_default();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].documents[0].name, "nota.pdf");
}

#[tokio::test]
async fn news_links_are_written_with_the_article() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let tenant_id = TenantId::new();
    let companies = PostgresDataSource::<Company>::new(pool.clone());
    let news = PostgresNewsDataSource::new(pool);

    let first = companies.create(tenant_id, company("Allianz")).await;
    let second = companies.create(tenant_id, company("AXA")).await;
    assert!(first.is_ok() && second.is_ok());
    let first = first.unwrap_or_else(|_| unreachable!());
    let second = second.unwrap_or_else(|_| unreachable!());

    let created = news
        .create(
            tenant_id,
            NewsDraft {
                title: "Nuevo acuerdo".to_owned(),
                company_ids: vec![first.id],
                ..NewsDraft::default()
            },
        )
        .await;
    assert!(created.is_ok());
    let created = created.unwrap_or_else(|_| unreachable!());
    assert_eq!(created.company_ids, vec![first.id]);

    let updated = news
        .update(
            tenant_id,
            created.id,
            NewsPatch {
                company_ids: Some(vec![second.id, first.id]),
                ..NewsPatch::default()
            },
        )
        .await;
    assert!(updated.is_ok());

    let listed: Vec<News> = news.list(tenant_id).await.unwrap_or_default();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].company_ids, vec![second.id, first.id]);

    assert!(news.delete(tenant_id, created.id).await.is_ok());
    assert!(news.find(tenant_id, created.id).await.ok().flatten().is_none());
}
