use brokerdesk_core::AppResult;
use brokerdesk_domain::{Delegation, Department, DepartmentContent};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::{SqlValue, TableRecord, record_id};

#[derive(Debug, FromRow)]
pub struct DelegationRow {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    name: String,
    legal_name: String,
    address: String,
    phone: String,
    email: String,
    contact_person: String,
    website: Option<String>,
}

impl TableRecord for Delegation {
    type Row = DelegationRow;

    const COLUMNS: &'static [&'static str] = &[
        "name",
        "legal_name",
        "address",
        "phone",
        "email",
        "contact_person",
        "website",
    ];

    fn from_row(row: Self::Row) -> AppResult<Self> {
        Ok(Self {
            id: record_id(row.id),
            name: row.name,
            legal_name: row.legal_name,
            address: row.address,
            phone: row.phone,
            email: row.email,
            contact_person: row.contact_person,
            website: row.website,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Text(self.name.clone()),
            SqlValue::Text(self.legal_name.clone()),
            SqlValue::Text(self.address.clone()),
            SqlValue::Text(self.phone.clone()),
            SqlValue::Text(self.email.clone()),
            SqlValue::Text(self.contact_person.clone()),
            SqlValue::OptionalText(self.website.clone()),
        ]
    }
}

#[derive(Debug, FromRow)]
pub struct DepartmentRow {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    name: String,
    responsible_name: String,
    responsible_email: String,
    description: String,
}

impl TableRecord for Department {
    type Row = DepartmentRow;

    const COLUMNS: &'static [&'static str] =
        &["name", "responsible_name", "responsible_email", "description"];

    fn from_row(row: Self::Row) -> AppResult<Self> {
        Ok(Self {
            id: record_id(row.id),
            name: row.name,
            responsible_name: row.responsible_name,
            responsible_email: row.responsible_email,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Text(self.name.clone()),
            SqlValue::Text(self.responsible_name.clone()),
            SqlValue::Text(self.responsible_email.clone()),
            SqlValue::Text(self.description.clone()),
        ]
    }
}

#[derive(Debug, FromRow)]
pub struct DepartmentContentRow {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    department_id: Uuid,
    title: String,
    content: String,
    image_url: Option<String>,
    published: bool,
}

impl TableRecord for DepartmentContent {
    type Row = DepartmentContentRow;

    const COLUMNS: &'static [&'static str] =
        &["department_id", "title", "content", "image_url", "published"];

    fn from_row(row: Self::Row) -> AppResult<Self> {
        Ok(Self {
            id: record_id(row.id),
            department_id: record_id(row.department_id),
            title: row.title,
            content: row.content,
            image_url: row.image_url,
            published: row.published,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Id(self.department_id.as_uuid()),
            SqlValue::Text(self.title.clone()),
            SqlValue::Text(self.content.clone()),
            SqlValue::OptionalText(self.image_url.clone()),
            SqlValue::Bool(self.published),
        ]
    }
}
