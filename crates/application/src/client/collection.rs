use std::sync::Arc;

use brokerdesk_core::{AppResult, RecordId, TenantId};
use brokerdesk_domain::Resource;
use tokio::sync::Mutex;

use crate::csv_import::{CsvImportable, ImportFailure, ImportOutcome, ImportPreview};
use crate::{ChangeEvent, DataSource};

use super::{Mutation, MutationState, OptimisticCollection, QueryCache, QuerySnapshot};

/// Port for user-facing notifications.
pub trait Toaster: Send + Sync {
    /// Shows a success message.
    fn success(&self, message: &str);

    /// Shows an error message.
    fn error(&self, message: &str);
}

/// Toaster writing to the log, for headless clients.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingToaster;

impl Toaster for TracingToaster {
    fn success(&self, message: &str) {
        tracing::info!(target: "toast", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "toast", "{message}");
    }
}

#[derive(Clone, Copy)]
enum Operation {
    Create,
    Update,
    Delete,
}

/// Query and mutations for one resource kind over any data source.
///
/// Every mutation cancels reads in flight, applies a speculative change,
/// sends the request, then either reconciles or restores the snapshot, and
/// always refetches afterwards.
pub struct ResourceCollection<T: Resource> {
    source: Arc<dyn DataSource<T>>,
    tenant_id: TenantId,
    cache: QueryCache<OptimisticCollection<T>>,
    toaster: Arc<dyn Toaster>,
    singular: String,
    mutation_state: Mutex<MutationState>,
}

impl<T: Resource> ResourceCollection<T> {
    /// Creates a collection using the built-in display name.
    #[must_use]
    pub fn new(source: Arc<dyn DataSource<T>>, tenant_id: TenantId, toaster: Arc<dyn Toaster>) -> Self {
        Self {
            source,
            tenant_id,
            cache: QueryCache::new(T::KIND.collection()),
            toaster,
            singular: T::KIND.default_singular().to_owned(),
            mutation_state: Mutex::new(MutationState::Idle),
        }
    }

    /// Overrides the singular name used in messages.
    #[must_use]
    pub fn with_display_name(mut self, singular: impl Into<String>) -> Self {
        self.singular = singular.into();
        self
    }

    /// Returns the read state, fetching on first use or after invalidation.
    pub async fn query(&self) -> QuerySnapshot<Vec<T>> {
        if self.cache.is_stale().await {
            // Stored in the snapshot below.
            let _ = self.refetch().await;
        }
        self.snapshot().await
    }

    /// Returns the read state without fetching.
    pub async fn snapshot(&self) -> QuerySnapshot<Vec<T>> {
        let snapshot = self.cache.snapshot().await;
        QuerySnapshot {
            data: snapshot.data.map(|collection| collection.values()),
            is_loading: snapshot.is_loading,
            error: snapshot.error,
        }
    }

    /// Returns the cached entries with their keys.
    pub async fn entries(&self) -> Option<OptimisticCollection<T>> {
        self.cache.snapshot().await.data
    }

    /// Returns the state of the latest mutation.
    pub async fn mutation_state(&self) -> MutationState {
        *self.mutation_state.lock().await
    }

    /// Fetches from the data source, sharing a fetch already in flight.
    pub async fn refetch(&self) -> AppResult<Vec<T>> {
        let source = Arc::clone(&self.source);
        let tenant_id = self.tenant_id;
        self.cache
            .fetch(|| async move {
                let mut records = source.list(tenant_id).await?;
                brokerdesk_domain::sort_records(&mut records);
                Ok(OptimisticCollection::from_records(records))
            })
            .await
            .map(|collection| collection.values())
    }

    /// Creates a record optimistically.
    pub async fn create(&self, draft: T::Draft) -> AppResult<T> {
        let mutation = self
            .begin(|collection| collection.begin_create(draft.clone()))
            .await;
        let result = self.source.create(self.tenant_id, draft).await;
        self.settle(Operation::Create, mutation, result).await
    }

    /// Updates a record optimistically.
    pub async fn update(&self, id: RecordId, patch: T::Patch) -> AppResult<T> {
        let mutation = self
            .begin(|collection| collection.begin_update(id, &patch))
            .await;
        let result = self.source.update(self.tenant_id, id, patch).await;
        self.settle(Operation::Update, mutation, result).await
    }

    /// Deletes a record optimistically.
    pub async fn delete(&self, id: RecordId) -> AppResult<()> {
        let mutation = self
            .begin(|collection| collection.begin_delete(id))
            .await;
        let result = self.source.delete(self.tenant_id, id).await;
        self.settle(Operation::Delete, mutation, result.map(|()| None))
            .await
            .map(|_| ())
    }

    /// Reacts to a live change event for this kind.
    pub async fn apply_change(&self, event: &ChangeEvent) -> AppResult<()> {
        if event.resource != T::KIND || event.tenant_id != self.tenant_id {
            return Ok(());
        }

        self.cache.invalidate().await;
        self.refetch().await.map(|_| ())
    }

    async fn begin(
        &self,
        speculate: impl FnOnce(&mut OptimisticCollection<T>) -> Mutation<T>,
    ) -> Option<Mutation<T>> {
        self.cache.cancel_in_flight().await;
        *self.mutation_state.lock().await = MutationState::Pending;
        self.cache.update(speculate).await
    }

    async fn settle<R>(
        &self,
        operation: Operation,
        mutation: Option<Mutation<T>>,
        result: AppResult<R>,
    ) -> AppResult<R>
    where
        R: Clone + Into<Option<T>>,
    {
        let state = match &result {
            Ok(value) => {
                if let Some(mut mutation) = mutation {
                    let record: Option<T> = value.clone().into();
                    self.cache
                        .update(|collection| collection.commit(&mut mutation, record))
                        .await;
                }
                self.toaster.success(&self.success_message(operation));
                MutationState::Committed
            }
            Err(error) => {
                if let Some(mut mutation) = mutation {
                    self.cache
                        .update(|collection| collection.rollback(&mut mutation))
                        .await;
                }
                tracing::error!(
                    kind = T::KIND.collection(),
                    %error,
                    "mutation failed"
                );
                self.toaster.error(&self.error_message(operation));
                MutationState::RolledBack
            }
        };
        *self.mutation_state.lock().await = state;

        self.cache.invalidate().await;
        if let Err(error) = self.refetch().await {
            tracing::warn!(kind = T::KIND.collection(), %error, "refetch after mutation failed");
        }

        result
    }

    fn error_message(&self, operation: Operation) -> String {
        let verb = match operation {
            Operation::Create => "crear",
            Operation::Update => "actualizar",
            Operation::Delete => "eliminar",
        };
        format!(
            "Error al {verb} {} {}",
            T::KIND.article(),
            self.singular.to_lowercase()
        )
    }

    fn success_message(&self, operation: Operation) -> String {
        let feminine = T::KIND.article() == "la";
        let participle = match (operation, feminine) {
            (Operation::Create, false) => "creado",
            (Operation::Create, true) => "creada",
            (Operation::Update, false) => "actualizado",
            (Operation::Update, true) => "actualizada",
            (Operation::Delete, false) => "eliminado",
            (Operation::Delete, true) => "eliminada",
        };
        format!("{} {participle} correctamente", capitalize(&self.singular))
    }
}

impl<T: CsvImportable> ResourceCollection<T> {
    /// Bulk-creates the valid rows of a preview through [`Self::create`].
    pub async fn import(&self, preview: &ImportPreview<T>) -> ImportOutcome {
        let mut outcome = ImportOutcome {
            skipped: preview.invalid_count(),
            ..ImportOutcome::default()
        };

        for (line, draft) in preview.valid_lines().into_iter().zip(preview.valid_drafts()) {
            match self.create(draft).await {
                Ok(record) => outcome.created.push(record.id()),
                Err(error) => outcome.failed.push(ImportFailure {
                    line,
                    message: error.to_string(),
                }),
            }
        }

        outcome
    }
}

fn capitalize(value: &str) -> String {
    let mut characters = value.chars();
    match characters.next() {
        Some(first) => first.to_uppercase().chain(characters).collect(),
        None => String::new(),
    }
}
