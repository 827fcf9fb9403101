use std::sync::Arc;

use async_trait::async_trait;
use brokerdesk_application::BrokerageConfigRepository;
use brokerdesk_core::{AppResult, TenantId};
use brokerdesk_domain::BrokerageConfig;

use crate::LocalStorage;

pub(crate) const CONFIG_KEY: &str = "brokerage_config";

/// Demo settings kept in the local blob.
#[derive(Clone)]
pub struct LocalBrokerageConfigRepository {
    storage: Arc<LocalStorage>,
}

impl LocalBrokerageConfigRepository {
    /// Creates a repository over the shared blob.
    #[must_use]
    pub fn new(storage: Arc<LocalStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl BrokerageConfigRepository for LocalBrokerageConfigRepository {
    async fn find(&self, _tenant_id: TenantId) -> AppResult<Option<BrokerageConfig>> {
        self.storage.read(CONFIG_KEY).await
    }

    async fn save(&self, _tenant_id: TenantId, config: &BrokerageConfig) -> AppResult<()> {
        self.storage
            .update::<Option<BrokerageConfig>, _>(CONFIG_KEY, |stored| {
                *stored = Some(config.clone());
                Ok(())
            })
            .await
    }
}
