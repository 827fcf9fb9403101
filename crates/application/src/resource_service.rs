use std::marker::PhantomData;
use std::sync::Arc;

use brokerdesk_core::{AppError, AppResult, RecordId, TenantId, UserIdentity};
use brokerdesk_domain::{Capability, Resource, sort_records};

use crate::{ChangeEvent, ChangeKind, ChangePublisher, DataSource, PermissionService};

/// Permission-gated CRUD over one resource kind.
pub struct ResourceService<T: Resource> {
    source: Arc<dyn DataSource<T>>,
    permissions: PermissionService,
    changes: Arc<dyn ChangePublisher>,
    _kind: PhantomData<fn() -> T>,
}

impl<T: Resource> Clone for ResourceService<T> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            permissions: self.permissions.clone(),
            changes: Arc::clone(&self.changes),
            _kind: PhantomData,
        }
    }
}

impl<T: Resource> ResourceService<T> {
    /// Creates a service over a data source.
    #[must_use]
    pub fn new(
        source: Arc<dyn DataSource<T>>,
        permissions: PermissionService,
        changes: Arc<dyn ChangePublisher>,
    ) -> Self {
        Self {
            source,
            permissions,
            changes,
            _kind: PhantomData,
        }
    }

    /// Returns the permission service used for checks.
    #[must_use]
    pub fn permissions(&self) -> &PermissionService {
        &self.permissions
    }

    /// Ensures the actor holds a capability in this kind's section.
    pub async fn require(&self, actor: &UserIdentity, capability: Capability) -> AppResult<()> {
        self.permissions
            .require(actor, T::KIND.section(), capability)
            .await
    }

    /// Lists records in display order.
    pub async fn list(&self, actor: &UserIdentity) -> AppResult<Vec<T>> {
        self.require(actor, Capability::View).await?;
        self.list_unchecked(actor.tenant_id()).await
    }

    /// Returns one record.
    pub async fn find(&self, actor: &UserIdentity, id: RecordId) -> AppResult<T> {
        self.require(actor, Capability::View).await?;
        self.find_unchecked(actor.tenant_id(), id).await
    }

    /// Validates and stores a new record.
    pub async fn create(&self, actor: &UserIdentity, draft: T::Draft) -> AppResult<T> {
        self.require(actor, Capability::Create).await?;
        T::validate_draft(&draft)?;

        let record = self.source.create(actor.tenant_id(), draft).await?;
        tracing::info!(
            kind = T::KIND.collection(),
            id = %record.id(),
            subject = actor.subject(),
            "record created"
        );
        self.changes.publish(ChangeEvent::for_record(
            actor.tenant_id(),
            ChangeKind::Inserted,
            &record,
        ));
        Ok(record)
    }

    /// Validates and applies an update.
    pub async fn update(&self, actor: &UserIdentity, id: RecordId, patch: T::Patch) -> AppResult<T> {
        self.require(actor, Capability::Edit).await?;
        T::validate_patch(&patch)?;
        let record = self.update_unchecked(actor.tenant_id(), id, patch).await?;
        tracing::info!(
            kind = T::KIND.collection(),
            %id,
            subject = actor.subject(),
            "record updated"
        );
        Ok(record)
    }

    /// Deletes a record.
    pub async fn delete(&self, actor: &UserIdentity, id: RecordId) -> AppResult<()> {
        self.require(actor, Capability::Delete).await?;
        self.delete_unchecked(actor.tenant_id(), id).await?;
        tracing::info!(
            kind = T::KIND.collection(),
            %id,
            subject = actor.subject(),
            "record deleted"
        );
        Ok(())
    }

    pub(crate) async fn list_unchecked(&self, tenant_id: TenantId) -> AppResult<Vec<T>> {
        let mut records = self.source.list(tenant_id).await?;
        sort_records(&mut records);
        Ok(records)
    }

    pub(crate) async fn find_unchecked(&self, tenant_id: TenantId, id: RecordId) -> AppResult<T> {
        self.source.find(tenant_id, id).await?.ok_or_else(|| {
            AppError::NotFound(format!(
                "{} '{id}' does not exist",
                T::KIND.default_singular()
            ))
        })
    }

    pub(crate) async fn update_unchecked(
        &self,
        tenant_id: TenantId,
        id: RecordId,
        patch: T::Patch,
    ) -> AppResult<T> {
        let record = self.source.update(tenant_id, id, patch).await?;
        self.changes.publish(ChangeEvent::for_record(
            tenant_id,
            ChangeKind::Updated,
            &record,
        ));
        Ok(record)
    }

    pub(crate) async fn delete_unchecked(&self, tenant_id: TenantId, id: RecordId) -> AppResult<()> {
        self.source.delete(tenant_id, id).await?;
        self.changes
            .publish(ChangeEvent::deleted(tenant_id, T::KIND, id));
        Ok(())
    }
}
