use std::collections::HashMap;

use async_trait::async_trait;
use brokerdesk_application::DataSource;
use brokerdesk_core::{AppError, AppResult, RecordId, TenantId};
use brokerdesk_domain::{News, NewsDraft, NewsPatch, Resource};
use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::postgres_data_source::{
    delete_existing, insert, not_found, select_all, select_one, transaction_error,
    update_existing,
};

/// Join tables linking a news article to companies, categories and products.
const LINK_TABLES: [(&str, &str); 3] = [
    ("news_companies", "company_id"),
    ("news_categories", "category_id"),
    ("news_products", "product_id"),
];

/// PostgreSQL-backed news source that keeps the link tables in step with
/// the article row.
#[derive(Clone)]
pub struct PostgresNewsDataSource {
    pool: PgPool,
}

impl PostgresNewsDataSource {
    /// Creates a data source with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn links_of(news: &News) -> [&[RecordId]; 3] {
    [&news.company_ids, &news.category_ids, &news.product_ids]
}

fn links_of_mut(news: &mut News) -> [&mut Vec<RecordId>; 3] {
    [
        &mut news.company_ids,
        &mut news.category_ids,
        &mut news.product_ids,
    ]
}

async fn load_links(
    connection: &mut PgConnection,
    tenant_id: TenantId,
    news: &mut [News],
) -> AppResult<()> {
    let ids: Vec<Uuid> = news.iter().map(|item| item.id.as_uuid()).collect();
    if ids.is_empty() {
        return Ok(());
    }

    for (index, (table, column)) in LINK_TABLES.iter().enumerate() {
        let sql = format!(
            "SELECT news_id, {column} FROM {table} \
             WHERE tenant_id = $1 AND news_id = ANY($2) ORDER BY position"
        );
        let pairs = sqlx::query_as::<_, (Uuid, Uuid)>(&sql)
            .bind(tenant_id.as_uuid())
            .bind(&ids)
            .fetch_all(&mut *connection)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to load {table} for tenant '{tenant_id}': {error}"
                ))
            })?;

        let mut grouped: HashMap<Uuid, Vec<RecordId>> = HashMap::new();
        for (news_id, linked_id) in pairs {
            grouped
                .entry(news_id)
                .or_default()
                .push(RecordId::from_uuid(linked_id));
        }

        for item in news.iter_mut() {
            let linked = grouped.remove(&item.id.as_uuid()).unwrap_or_default();
            *links_of_mut(item)[index] = linked;
        }
    }

    Ok(())
}

async fn replace_links(
    connection: &mut PgConnection,
    tenant_id: TenantId,
    news: &News,
) -> AppResult<()> {
    for ((table, column), linked) in LINK_TABLES.iter().zip(links_of(news)) {
        sqlx::query(&format!(
            "DELETE FROM {table} WHERE tenant_id = $1 AND news_id = $2"
        ))
        .bind(tenant_id.as_uuid())
        .bind(news.id.as_uuid())
        .execute(&mut *connection)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to clear {table} for news '{}': {error}",
                news.id
            ))
        })?;

        for (position, linked_id) in linked.iter().enumerate() {
            sqlx::query(&format!(
                "INSERT INTO {table} (tenant_id, news_id, {column}, position) \
                 VALUES ($1, $2, $3, $4)"
            ))
            .bind(tenant_id.as_uuid())
            .bind(news.id.as_uuid())
            .bind(linked_id.as_uuid())
            .bind(i32::try_from(position).unwrap_or(i32::MAX))
            .execute(&mut *connection)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to link news '{}' in {table}: {error}",
                    news.id
                ))
            })?;
        }
    }

    Ok(())
}

#[async_trait]
impl DataSource<News> for PostgresNewsDataSource {
    async fn list(&self, tenant_id: TenantId) -> AppResult<Vec<News>> {
        let mut connection = self
            .pool
            .acquire()
            .await
            .map_err(|error| AppError::Internal(format!("failed to acquire connection: {error}")))?;

        let mut news = select_all::<News>(&mut connection, tenant_id).await?;
        load_links(&mut connection, tenant_id, &mut news).await?;
        Ok(news)
    }

    async fn find(&self, tenant_id: TenantId, id: RecordId) -> AppResult<Option<News>> {
        let mut connection = self
            .pool
            .acquire()
            .await
            .map_err(|error| AppError::Internal(format!("failed to acquire connection: {error}")))?;

        let Some(news) = select_one::<News>(&mut connection, tenant_id, id, false).await? else {
            return Ok(None);
        };
        let mut found = [news];
        load_links(&mut connection, tenant_id, &mut found).await?;
        let [news] = found;
        Ok(Some(news))
    }

    async fn create(&self, tenant_id: TenantId, draft: NewsDraft) -> AppResult<News> {
        let record = News::from_draft(RecordId::new(), draft, Utc::now());
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| transaction_error("begin", error))?;

        let mut created = insert(&mut transaction, tenant_id, &record).await?;
        replace_links(&mut transaction, tenant_id, &record).await?;
        created.company_ids = record.company_ids;
        created.category_ids = record.category_ids;
        created.product_ids = record.product_ids;

        transaction
            .commit()
            .await
            .map_err(|error| transaction_error("commit", error))?;

        Ok(created)
    }

    async fn update(&self, tenant_id: TenantId, id: RecordId, patch: NewsPatch) -> AppResult<News> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| transaction_error("begin", error))?;

        let mut found = [select_one::<News>(&mut transaction, tenant_id, id, true)
            .await?
            .ok_or_else(|| not_found::<News>(id))?];
        load_links(&mut transaction, tenant_id, &mut found).await?;
        let [mut record] = found;
        record.apply_patch(&patch, Utc::now());

        let mut updated = update_existing(&mut transaction, tenant_id, &record).await?;
        replace_links(&mut transaction, tenant_id, &record).await?;
        updated.company_ids = record.company_ids;
        updated.category_ids = record.category_ids;
        updated.product_ids = record.product_ids;

        transaction
            .commit()
            .await
            .map_err(|error| transaction_error("commit", error))?;

        Ok(updated)
    }

    async fn delete(&self, tenant_id: TenantId, id: RecordId) -> AppResult<()> {
        let mut connection = self
            .pool
            .acquire()
            .await
            .map_err(|error| AppError::Internal(format!("failed to acquire connection: {error}")))?;

        // Link rows cascade with the article.
        delete_existing::<News>(&mut connection, tenant_id, id).await
    }
}
