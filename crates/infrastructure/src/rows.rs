//! Database rows and their mapping to the camelCase domain records.
//!
//! Every table stores `id`, `tenant_id`, `created_at` and `updated_at` next
//! to the columns listed by [`TableRecord::COLUMNS`]. Reads go through a
//! snake_case `*Row` struct; writes bind [`TableRecord::values`] in column
//! order.

mod catalog;
mod company;
mod messages;
mod organization;

use brokerdesk_core::{AppError, AppResult, RecordId};
use brokerdesk_domain::Resource;
use chrono::{DateTime, Utc};
use sqlx::Postgres;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::QueryAs;
use uuid::Uuid;

/// One bindable column value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// `TEXT NOT NULL`.
    Text(String),
    /// Nullable `TEXT`.
    OptionalText(Option<String>),
    /// Nullable `UUID` reference.
    OptionalId(Option<Uuid>),
    /// `UUID NOT NULL` reference.
    Id(Uuid),
    /// `INTEGER`.
    Int(i32),
    /// `BOOLEAN`.
    Bool(bool),
    /// Nullable `TIMESTAMPTZ`.
    OptionalTimestamp(Option<DateTime<Utc>>),
    /// `JSONB`.
    Json(serde_json::Value),
}

impl SqlValue {
    pub(crate) fn optional_id(value: Option<RecordId>) -> Self {
        Self::OptionalId(value.map(|id| id.as_uuid()))
    }
}

/// Table mapping of one resource kind.
pub trait TableRecord: Resource {
    /// Snake_case row read back from the table.
    type Row: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin;

    /// Writable columns, in [`TableRecord::values`] order.
    const COLUMNS: &'static [&'static str];

    /// Table name.
    fn table() -> &'static str {
        Self::KIND.collection()
    }

    /// Converts a row into the domain record.
    fn from_row(row: Self::Row) -> AppResult<Self>;

    /// Column values of the record, in [`TableRecord::COLUMNS`] order.
    fn values(&self) -> Vec<SqlValue>;
}

pub(crate) fn bind_value<'q, O>(
    query: QueryAs<'q, Postgres, O, PgArguments>,
    value: SqlValue,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    match value {
        SqlValue::Text(value) => query.bind(value),
        SqlValue::OptionalText(value) => query.bind(value),
        SqlValue::OptionalId(value) => query.bind(value),
        SqlValue::Id(value) => query.bind(value),
        SqlValue::Int(value) => query.bind(value),
        SqlValue::Bool(value) => query.bind(value),
        SqlValue::OptionalTimestamp(value) => query.bind(value),
        SqlValue::Json(value) => query.bind(value),
    }
}

/// Column list used in `SELECT` and `RETURNING` clauses.
pub(crate) fn select_columns<T: TableRecord>() -> String {
    let mut columns = vec!["id", "created_at", "updated_at"];
    columns.extend_from_slice(T::COLUMNS);
    columns.join(", ")
}

pub(crate) fn record_id(value: Uuid) -> RecordId {
    RecordId::from_uuid(value)
}

pub(crate) fn optional_record_id(value: Option<Uuid>) -> Option<RecordId> {
    value.map(RecordId::from_uuid)
}

pub(crate) fn decode_json<V: serde::de::DeserializeOwned>(
    column: &str,
    value: serde_json::Value,
) -> AppResult<V> {
    serde_json::from_value(value).map_err(|error| {
        AppError::Internal(format!("failed to decode column '{column}': {error}"))
    })
}

pub(crate) fn encode_json<V: serde::Serialize>(value: &V) -> SqlValue {
    SqlValue::Json(serde_json::to_value(value).unwrap_or(serde_json::Value::Null))
}
