use brokerdesk_core::AppResult;
use brokerdesk_domain::{AlertSeverity, News, Notification, SystemAlert};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::{SqlValue, TableRecord, record_id};

/// News row without its join tables; the link ids are loaded separately.
#[derive(Debug, FromRow)]
pub struct NewsRow {
    pub(super) id: Uuid,
    pub(super) created_at: DateTime<Utc>,
    pub(super) updated_at: DateTime<Utc>,
    pub(super) title: String,
    pub(super) content: String,
    pub(super) image_url: Option<String>,
    pub(super) published: bool,
    pub(super) published_at: Option<DateTime<Utc>>,
}

impl TableRecord for News {
    type Row = NewsRow;

    const COLUMNS: &'static [&'static str] =
        &["title", "content", "image_url", "published", "published_at"];

    fn from_row(row: Self::Row) -> AppResult<Self> {
        Ok(Self {
            id: record_id(row.id),
            title: row.title,
            content: row.content,
            image_url: row.image_url,
            published: row.published,
            published_at: row.published_at,
            company_ids: Vec::new(),
            category_ids: Vec::new(),
            product_ids: Vec::new(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Text(self.title.clone()),
            SqlValue::Text(self.content.clone()),
            SqlValue::OptionalText(self.image_url.clone()),
            SqlValue::Bool(self.published),
            SqlValue::OptionalTimestamp(self.published_at),
        ]
    }
}

#[derive(Debug, FromRow)]
pub struct NotificationRow {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    user_id: Uuid,
    title: String,
    description: String,
    url: Option<String>,
    read: bool,
}

impl TableRecord for Notification {
    type Row = NotificationRow;

    const COLUMNS: &'static [&'static str] = &["user_id", "title", "description", "url", "read"];

    fn from_row(row: Self::Row) -> AppResult<Self> {
        Ok(Self {
            id: record_id(row.id),
            user_id: record_id(row.user_id),
            title: row.title,
            description: row.description,
            url: row.url,
            read: row.read,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Id(self.user_id.as_uuid()),
            SqlValue::Text(self.title.clone()),
            SqlValue::Text(self.description.clone()),
            SqlValue::OptionalText(self.url.clone()),
            SqlValue::Bool(self.read),
        ]
    }
}

#[derive(Debug, FromRow)]
pub struct SystemAlertRow {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    title: String,
    message: String,
    severity: String,
    active: bool,
}

impl TableRecord for SystemAlert {
    type Row = SystemAlertRow;

    const COLUMNS: &'static [&'static str] = &["title", "message", "severity", "active"];

    fn from_row(row: Self::Row) -> AppResult<Self> {
        Ok(Self {
            id: record_id(row.id),
            title: row.title,
            message: row.message,
            severity: row.severity.parse::<AlertSeverity>()?,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Text(self.title.clone()),
            SqlValue::Text(self.message.clone()),
            SqlValue::Text(self.severity.as_str().to_owned()),
            SqlValue::Bool(self.active),
        ]
    }
}
