use brokerdesk_core::AppResult;
use brokerdesk_domain::{Company, CompanySpecification, SpecificationCategory};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::{SqlValue, TableRecord, optional_record_id, record_id};

#[derive(Debug, FromRow)]
pub struct CompanyRow {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    name: String,
    broker_access: String,
    commercial_manager: String,
    manager_email: String,
    website: Option<String>,
}

impl TableRecord for Company {
    type Row = CompanyRow;

    const COLUMNS: &'static [&'static str] = &[
        "name",
        "broker_access",
        "commercial_manager",
        "manager_email",
        "website",
    ];

    fn from_row(row: Self::Row) -> AppResult<Self> {
        Ok(Self {
            id: record_id(row.id),
            name: row.name,
            broker_access: row.broker_access,
            commercial_manager: row.commercial_manager,
            manager_email: row.manager_email,
            website: row.website,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Text(self.name.clone()),
            SqlValue::Text(self.broker_access.clone()),
            SqlValue::Text(self.commercial_manager.clone()),
            SqlValue::Text(self.manager_email.clone()),
            SqlValue::OptionalText(self.website.clone()),
        ]
    }
}

#[derive(Debug, FromRow)]
pub struct SpecificationCategoryRow {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    company_id: Uuid,
    name: String,
    sort_order: i32,
}

impl TableRecord for SpecificationCategory {
    type Row = SpecificationCategoryRow;

    const COLUMNS: &'static [&'static str] = &["company_id", "name", "sort_order"];

    fn from_row(row: Self::Row) -> AppResult<Self> {
        Ok(Self {
            id: record_id(row.id),
            company_id: record_id(row.company_id),
            name: row.name,
            order: row.sort_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Id(self.company_id.as_uuid()),
            SqlValue::Text(self.name.clone()),
            SqlValue::Int(self.order),
        ]
    }
}

#[derive(Debug, FromRow)]
pub struct CompanySpecificationRow {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    company_id: Uuid,
    category_id: Option<Uuid>,
    title: String,
    content: String,
    sort_order: i32,
}

impl TableRecord for CompanySpecification {
    type Row = CompanySpecificationRow;

    const COLUMNS: &'static [&'static str] =
        &["company_id", "category_id", "title", "content", "sort_order"];

    fn from_row(row: Self::Row) -> AppResult<Self> {
        Ok(Self {
            id: record_id(row.id),
            company_id: record_id(row.company_id),
            category_id: optional_record_id(row.category_id),
            title: row.title,
            content: row.content,
            order: row.sort_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Id(self.company_id.as_uuid()),
            SqlValue::optional_id(self.category_id),
            SqlValue::Text(self.title.clone()),
            SqlValue::Text(self.content.clone()),
            SqlValue::Int(self.order),
        ]
    }
}
