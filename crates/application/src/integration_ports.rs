use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use brokerdesk_core::{AppError, AppResult, TenantId};
use brokerdesk_domain::BrokerageConfig;
use serde::{Deserialize, Serialize};

/// Repository port for the tenant-wide settings row.
#[async_trait]
pub trait BrokerageConfigRepository: Send + Sync {
    /// Returns the stored configuration, if any.
    async fn find(&self, tenant_id: TenantId) -> AppResult<Option<BrokerageConfig>>;

    /// Inserts or replaces the configuration.
    async fn save(&self, tenant_id: TenantId, config: &BrokerageConfig) -> AppResult<()>;
}

/// Public object storage buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bucket {
    /// User avatars.
    #[serde(rename = "avatars")]
    Avatars,
    /// News featured images.
    #[serde(rename = "news")]
    News,
    /// Documents attached to products.
    #[serde(rename = "product-documents")]
    ProductDocuments,
}

impl Bucket {
    /// Returns the bucket name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Avatars => "avatars",
            Self::News => "news",
            Self::ProductDocuments => "product-documents",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Bucket {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "avatars" => Ok(Self::Avatars),
            "news" => Ok(Self::News),
            "product-documents" => Ok(Self::ProductDocuments),
            _ => Err(AppError::Validation(format!("unknown bucket '{value}'"))),
        }
    }
}

/// Object stored in a bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Bucket the object lives in.
    pub bucket: Bucket,
    /// Key inside the bucket.
    pub key: String,
    /// Public URL.
    pub public_url: String,
}

/// Port for public file storage.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Writes an object and returns its public location.
    async fn put(&self, bucket: Bucket, key: &str, bytes: Vec<u8>) -> AppResult<StoredObject>;

    /// Removes an object. Missing objects are ignored.
    async fn remove(&self, bucket: Bucket, key: &str) -> AppResult<()>;
}

/// Marketing contact form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    /// Sender name.
    pub name: String,
    /// Sender email.
    pub email: String,
    /// Optional company of the sender.
    #[serde(default)]
    pub company: Option<String>,
    /// Optional phone.
    #[serde(default)]
    pub phone: Option<String>,
    /// Message body.
    pub message: String,
}

/// Port delivering contact submissions to the sales inbox.
#[async_trait]
pub trait ContactRelay: Send + Sync {
    /// Relays one validated message.
    async fn relay(&self, message: &ContactMessage) -> AppResult<()>;
}
