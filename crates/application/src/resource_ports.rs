use async_trait::async_trait;

use brokerdesk_core::{AppResult, RecordId, TenantId};
use brokerdesk_domain::{Resource, ResourceKind};
use serde::{Deserialize, Serialize};

/// Storage port for one resource kind.
///
/// Implemented by the database adapter, the local demo store and the HTTP
/// client; the composition root picks one per workspace.
#[async_trait]
pub trait DataSource<T: Resource>: Send + Sync {
    /// Lists every record of the tenant.
    async fn list(&self, tenant_id: TenantId) -> AppResult<Vec<T>>;

    /// Returns one record by id.
    async fn find(&self, tenant_id: TenantId, id: RecordId) -> AppResult<Option<T>>;

    /// Stores a new record and returns it with its assigned id.
    async fn create(&self, tenant_id: TenantId, draft: T::Draft) -> AppResult<T>;

    /// Applies a patch and returns the stored record.
    ///
    /// Returns `NotFound` when the record does not exist.
    async fn update(&self, tenant_id: TenantId, id: RecordId, patch: T::Patch) -> AppResult<T>;

    /// Deletes a record.
    ///
    /// Returns `NotFound` when the record does not exist.
    async fn delete(&self, tenant_id: TenantId, id: RecordId) -> AppResult<()>;
}

/// Kind of write a change event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// A record was created.
    Inserted,
    /// A record was updated.
    Updated,
    /// A record was deleted.
    Deleted,
}

/// Write notification pushed to live subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    /// Tenant the write happened in.
    pub tenant_id: TenantId,
    /// Kind of the written record.
    pub resource: ResourceKind,
    /// Write kind.
    pub change: ChangeKind,
    /// Written record id.
    pub id: RecordId,
    /// New record state, absent for deletes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<serde_json::Value>,
}

impl ChangeEvent {
    /// Builds an event carrying the serialized record.
    #[must_use]
    pub fn for_record<T: Resource>(tenant_id: TenantId, change: ChangeKind, record: &T) -> Self {
        Self {
            tenant_id,
            resource: T::KIND,
            change,
            id: record.id(),
            record: serde_json::to_value(record).ok(),
        }
    }

    /// Builds a delete event.
    #[must_use]
    pub fn deleted(tenant_id: TenantId, resource: ResourceKind, id: RecordId) -> Self {
        Self {
            tenant_id,
            resource,
            change: ChangeKind::Deleted,
            id,
            record: None,
        }
    }

    /// Decodes the carried record, if any.
    #[must_use]
    pub fn decode<T: Resource>(&self) -> Option<T> {
        if self.resource != T::KIND {
            return None;
        }

        self.record
            .clone()
            .and_then(|value| serde_json::from_value(value).ok())
    }
}

/// Port receiving write notifications.
pub trait ChangePublisher: Send + Sync {
    /// Publishes one event. Delivery is best effort.
    fn publish(&self, event: ChangeEvent);
}

/// Publisher that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardChanges;

impl ChangePublisher for DiscardChanges {
    fn publish(&self, _event: ChangeEvent) {}
}
