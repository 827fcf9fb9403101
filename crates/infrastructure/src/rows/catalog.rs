use brokerdesk_core::AppResult;
use brokerdesk_domain::{Product, ProductCategory, ProductDocument};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::{SqlValue, TableRecord, decode_json, encode_json, optional_record_id, record_id};

#[derive(Debug, FromRow)]
pub struct ProductCategoryRow {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    name: String,
    description: Option<String>,
    parent_id: Option<Uuid>,
    level: i32,
}

impl TableRecord for ProductCategory {
    type Row = ProductCategoryRow;

    const COLUMNS: &'static [&'static str] = &["name", "description", "parent_id", "level"];

    fn from_row(row: Self::Row) -> AppResult<Self> {
        Ok(Self {
            id: record_id(row.id),
            name: row.name,
            description: row.description,
            parent_id: optional_record_id(row.parent_id),
            level: row.level,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Text(self.name.clone()),
            SqlValue::OptionalText(self.description.clone()),
            SqlValue::optional_id(self.parent_id),
            SqlValue::Int(self.level),
        ]
    }
}

#[derive(Debug, FromRow)]
pub struct ProductRow {
    pub(super) id: Uuid,
    pub(super) created_at: DateTime<Utc>,
    pub(super) updated_at: DateTime<Utc>,
    pub(super) title: String,
    pub(super) process: String,
    pub(super) strengths: String,
    pub(super) observations: String,
    pub(super) category_id: Option<Uuid>,
    pub(super) company_id: Option<Uuid>,
    pub(super) documents: serde_json::Value,
}

impl TableRecord for Product {
    type Row = ProductRow;

    const COLUMNS: &'static [&'static str] = &[
        "title",
        "process",
        "strengths",
        "observations",
        "category_id",
        "company_id",
        "documents",
    ];

    fn from_row(row: Self::Row) -> AppResult<Self> {
        let documents: Vec<ProductDocument> = decode_json("documents", row.documents)?;

        Ok(Self {
            id: record_id(row.id),
            title: row.title,
            process: row.process,
            strengths: row.strengths,
            observations: row.observations,
            category_id: optional_record_id(row.category_id),
            company_id: optional_record_id(row.company_id),
            documents,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Text(self.title.clone()),
            SqlValue::Text(self.process.clone()),
            SqlValue::Text(self.strengths.clone()),
            SqlValue::Text(self.observations.clone()),
            SqlValue::optional_id(self.category_id),
            SqlValue::optional_id(self.company_id),
            encode_json(&self.documents),
        ]
    }
}
