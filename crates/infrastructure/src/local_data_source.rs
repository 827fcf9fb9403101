use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use brokerdesk_application::DataSource;
use brokerdesk_core::{AppError, AppResult, RecordId, TenantId};
use brokerdesk_domain::{Resource, sort_records};
use chrono::Utc;

use crate::LocalStorage;

/// Demo data source keeping one resource kind in the local blob.
///
/// The blob holds a single demo workspace, so the tenant argument is only
/// used in messages.
pub struct LocalDataSource<T> {
    storage: Arc<LocalStorage>,
    marker: PhantomData<fn() -> T>,
}

impl<T> Clone for LocalDataSource<T> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            marker: PhantomData,
        }
    }
}

impl<T: Resource> LocalDataSource<T> {
    /// Creates a data source over the shared blob.
    #[must_use]
    pub fn new(storage: Arc<LocalStorage>) -> Self {
        Self {
            storage,
            marker: PhantomData,
        }
    }

    fn key() -> &'static str {
        T::KIND.collection()
    }

    fn not_found(id: RecordId) -> AppError {
        AppError::NotFound(format!(
            "{} record '{}' does not exist",
            Self::key(),
            id
        ))
    }
}

#[async_trait]
impl<T: Resource> DataSource<T> for LocalDataSource<T> {
    async fn list(&self, _tenant_id: TenantId) -> AppResult<Vec<T>> {
        let mut records: Vec<T> = self.storage.read(Self::key()).await?.unwrap_or_default();
        sort_records(&mut records);
        Ok(records)
    }

    async fn find(&self, _tenant_id: TenantId, id: RecordId) -> AppResult<Option<T>> {
        let records: Vec<T> = self.storage.read(Self::key()).await?.unwrap_or_default();
        Ok(records.into_iter().find(|record| record.id() == id))
    }

    async fn create(&self, tenant_id: TenantId, draft: T::Draft) -> AppResult<T> {
        let record = T::from_draft(RecordId::new(), draft, Utc::now());
        let stored = record.clone();
        self.storage
            .update::<Vec<T>, _>(Self::key(), move |records| {
                records.push(stored);
                Ok(())
            })
            .await?;

        tracing::debug!(kind = Self::key(), %tenant_id, id = %record.id(), "local record created");
        Ok(record)
    }

    async fn update(&self, _tenant_id: TenantId, id: RecordId, patch: T::Patch) -> AppResult<T> {
        self.storage
            .update::<Vec<T>, _>(Self::key(), |records| {
                let record = records
                    .iter_mut()
                    .find(|record| record.id() == id)
                    .ok_or_else(|| Self::not_found(id))?;
                record.apply_patch(&patch, Utc::now());
                Ok(record.clone())
            })
            .await
    }

    async fn delete(&self, _tenant_id: TenantId, id: RecordId) -> AppResult<()> {
        self.storage
            .update::<Vec<T>, _>(Self::key(), |records| {
                let before = records.len();
                records.retain(|record| record.id() != id);
                if records.len() == before {
                    return Err(Self::not_found(id));
                }
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use brokerdesk_application::DataSource;
    use brokerdesk_core::{AppError, RecordId, TenantId};
    use brokerdesk_domain::{Company, CompanyDraft, CompanyPatch, Product};

    use super::LocalDataSource;
    use crate::LocalStorage;

    #[tokio::test]
    async fn demo_collections_start_seeded() {
        let source = LocalDataSource::<Product>::new(Arc::new(LocalStorage::in_memory()));
        let products = source.list(TenantId::new()).await.unwrap_or_default();
        assert!(!products.is_empty());
    }

    #[tokio::test]
    async fn writes_are_visible_to_other_sources_over_the_same_blob() {
        let storage = Arc::new(LocalStorage::in_memory());
        let writer = LocalDataSource::<Company>::new(Arc::clone(&storage));
        let reader = LocalDataSource::<Company>::new(storage);
        let tenant_id = TenantId::new();

        let created = writer
            .create(
                tenant_id,
                CompanyDraft {
                    name: "Reale".to_owned(),
                    ..CompanyDraft::default()
                },
            )
            .await;
        assert!(created.is_ok());
        let created = created.unwrap_or_else(|_| unreachable!());

        let renamed = writer
            .update(
                tenant_id,
                created.id,
                CompanyPatch {
                    name: Some("Reale Seguros".to_owned()),
                    ..CompanyPatch::default()
                },
            )
            .await;
        assert!(renamed.is_ok());

        let found = reader.find(tenant_id, created.id).await.ok().flatten();
        assert_eq!(found.map(|company| company.name), Some("Reale Seguros".to_owned()));

        assert!(reader.delete(tenant_id, created.id).await.is_ok());
        assert!(matches!(
            writer.delete(tenant_id, created.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn missing_records_are_not_found() {
        let source = LocalDataSource::<Company>::new(Arc::new(LocalStorage::in_memory()));
        let result = source
            .update(TenantId::new(), RecordId::new(), CompanyPatch::default())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
