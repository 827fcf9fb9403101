use std::marker::PhantomData;

use async_trait::async_trait;
use brokerdesk_application::DataSource;
use brokerdesk_core::{AppError, AppResult, RecordId, TenantId};
use brokerdesk_domain::sort_records;
use chrono::Utc;
use sqlx::{PgConnection, PgPool};

use crate::rows::{TableRecord, bind_value, select_columns};

/// PostgreSQL-backed data source over the table of one resource kind.
pub struct PostgresDataSource<T> {
    pool: PgPool,
    marker: PhantomData<fn() -> T>,
}

impl<T> Clone for PostgresDataSource<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            marker: PhantomData,
        }
    }
}

impl<T: TableRecord> PostgresDataSource<T> {
    /// Creates a data source with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            marker: PhantomData,
        }
    }
}

pub(crate) async fn select_all<T: TableRecord>(
    connection: &mut PgConnection,
    tenant_id: TenantId,
) -> AppResult<Vec<T>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE tenant_id = $1 ORDER BY created_at, id",
        select_columns::<T>(),
        T::table()
    );

    let rows = sqlx::query_as::<_, T::Row>(&sql)
        .bind(tenant_id.as_uuid())
        .fetch_all(connection)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list {} for tenant '{}': {error}",
                T::table(),
                tenant_id
            ))
        })?;

    let mut records = rows
        .into_iter()
        .map(T::from_row)
        .collect::<AppResult<Vec<_>>>()?;
    sort_records(&mut records);
    Ok(records)
}

pub(crate) async fn select_one<T: TableRecord>(
    connection: &mut PgConnection,
    tenant_id: TenantId,
    id: RecordId,
    for_update: bool,
) -> AppResult<Option<T>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE tenant_id = $1 AND id = $2{}",
        select_columns::<T>(),
        T::table(),
        if for_update { " FOR UPDATE" } else { "" }
    );

    sqlx::query_as::<_, T::Row>(&sql)
        .bind(tenant_id.as_uuid())
        .bind(id.as_uuid())
        .fetch_optional(connection)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to find {} record '{}' for tenant '{}': {error}",
                T::table(),
                id,
                tenant_id
            ))
        })?
        .map(T::from_row)
        .transpose()
}

pub(crate) async fn insert<T: TableRecord>(
    connection: &mut PgConnection,
    tenant_id: TenantId,
    record: &T,
) -> AppResult<T> {
    let placeholders = (0..T::COLUMNS.len())
        .map(|index| format!("${}", index + 5))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO {table} (id, tenant_id, created_at, updated_at, {columns}) \
         VALUES ($1, $2, $3, $4, {placeholders}) RETURNING {returning}",
        table = T::table(),
        columns = T::COLUMNS.join(", "),
        returning = select_columns::<T>(),
    );

    let query = sqlx::query_as::<_, T::Row>(&sql)
        .bind(record.id().as_uuid())
        .bind(tenant_id.as_uuid())
        .bind(record.created_at())
        .bind(record.created_at());
    let row = record
        .values()
        .into_iter()
        .fold(query, bind_value)
        .fetch_one(connection)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to insert into {} for tenant '{}': {error}",
                T::table(),
                tenant_id
            ))
        })?;

    T::from_row(row)
}

pub(crate) async fn update_existing<T: TableRecord>(
    connection: &mut PgConnection,
    tenant_id: TenantId,
    record: &T,
) -> AppResult<T> {
    let assignments = T::COLUMNS
        .iter()
        .enumerate()
        .map(|(index, column)| format!("{column} = ${}", index + 4))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE {table} SET {assignments}, updated_at = $3 \
         WHERE tenant_id = $1 AND id = $2 RETURNING {returning}",
        table = T::table(),
        returning = select_columns::<T>(),
    );

    let query = sqlx::query_as::<_, T::Row>(&sql)
        .bind(tenant_id.as_uuid())
        .bind(record.id().as_uuid())
        .bind(Utc::now());
    let row = record
        .values()
        .into_iter()
        .fold(query, bind_value)
        .fetch_optional(connection)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to update {} record '{}' for tenant '{}': {error}",
                T::table(),
                record.id(),
                tenant_id
            ))
        })?
        .ok_or_else(|| not_found::<T>(record.id()))?;

    T::from_row(row)
}

pub(crate) async fn delete_existing<T: TableRecord>(
    connection: &mut PgConnection,
    tenant_id: TenantId,
    id: RecordId,
) -> AppResult<()> {
    let sql = format!(
        "DELETE FROM {} WHERE tenant_id = $1 AND id = $2",
        T::table()
    );

    let result = sqlx::query(&sql)
        .bind(tenant_id.as_uuid())
        .bind(id.as_uuid())
        .execute(connection)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to delete {} record '{}' for tenant '{}': {error}",
                T::table(),
                id,
                tenant_id
            ))
        })?;

    if result.rows_affected() == 0 {
        return Err(not_found::<T>(id));
    }

    Ok(())
}

pub(crate) fn not_found<T: TableRecord>(id: RecordId) -> AppError {
    AppError::NotFound(format!("{} record '{}' does not exist", T::table(), id))
}

pub(crate) fn transaction_error(action: &str, error: sqlx::Error) -> AppError {
    AppError::Internal(format!("failed to {action} transaction: {error}"))
}

#[async_trait]
impl<T: TableRecord> DataSource<T> for PostgresDataSource<T> {
    async fn list(&self, tenant_id: TenantId) -> AppResult<Vec<T>> {
        let mut connection = self
            .pool
            .acquire()
            .await
            .map_err(|error| AppError::Internal(format!("failed to acquire connection: {error}")))?;
        select_all(&mut connection, tenant_id).await
    }

    async fn find(&self, tenant_id: TenantId, id: RecordId) -> AppResult<Option<T>> {
        let mut connection = self
            .pool
            .acquire()
            .await
            .map_err(|error| AppError::Internal(format!("failed to acquire connection: {error}")))?;
        select_one(&mut connection, tenant_id, id, false).await
    }

    async fn create(&self, tenant_id: TenantId, draft: T::Draft) -> AppResult<T> {
        let record = T::from_draft(RecordId::new(), draft, Utc::now());
        let mut connection = self
            .pool
            .acquire()
            .await
            .map_err(|error| AppError::Internal(format!("failed to acquire connection: {error}")))?;
        insert(&mut connection, tenant_id, &record).await
    }

    async fn update(&self, tenant_id: TenantId, id: RecordId, patch: T::Patch) -> AppResult<T> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| transaction_error("begin", error))?;

        let mut record = select_one::<T>(&mut transaction, tenant_id, id, true)
            .await?
            .ok_or_else(|| not_found::<T>(id))?;
        record.apply_patch(&patch, Utc::now());
        let updated = update_existing(&mut transaction, tenant_id, &record).await?;

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
        delete_existing::<T>(&mut connection, tenant_id, id).await
    }
}

#[cfg(test)]
mod tests;
