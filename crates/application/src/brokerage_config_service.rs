use std::sync::Arc;

use brokerdesk_core::{AppResult, TenantId, UserIdentity};
use brokerdesk_domain::{BrokerageConfig, BrokerageConfigInput, Capability, ResourceKind, Section};
use chrono::Utc;

use crate::{BrokerageConfigRepository, PermissionService};

/// Tenant-wide settings and terminology.
#[derive(Clone)]
pub struct BrokerageConfigService {
    repository: Arc<dyn BrokerageConfigRepository>,
    permissions: PermissionService,
}

impl BrokerageConfigService {
    /// Creates the service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn BrokerageConfigRepository>,
        permissions: PermissionService,
    ) -> Self {
        Self {
            repository,
            permissions,
        }
    }

    /// Returns the stored configuration, or defaults when never saved.
    ///
    /// Readable by anyone signed in to the tenant; the header needs it.
    pub async fn get(&self, tenant_id: TenantId) -> AppResult<BrokerageConfig> {
        Ok(self
            .repository
            .find(tenant_id)
            .await?
            .unwrap_or_default())
    }

    /// Validates and stores a new configuration.
    pub async fn save(
        &self,
        actor: &UserIdentity,
        input: BrokerageConfigInput,
    ) -> AppResult<BrokerageConfig> {
        self.permissions
            .require(actor, Section::Settings, Capability::Edit)
            .await?;

        let config = BrokerageConfig::from_input(input, Utc::now())?;
        self.repository.save(actor.tenant_id(), &config).await?;
        tracing::info!(subject = actor.subject(), "brokerage configuration saved");
        Ok(config)
    }

    /// Returns the display name of a kind, honouring terminology overrides.
    pub async fn display_name(
        &self,
        tenant_id: TenantId,
        kind: ResourceKind,
        plural: bool,
    ) -> AppResult<String> {
        Ok(self.get(tenant_id).await?.display_name(kind, plural))
    }
}
