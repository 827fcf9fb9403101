use async_trait::async_trait;
use brokerdesk_application::BrokerageConfigRepository;
use brokerdesk_core::{AppError, AppResult, TenantId};
use brokerdesk_domain::BrokerageConfig;
use sqlx::PgPool;

/// PostgreSQL-backed settings row, stored as one JSONB document per tenant.
#[derive(Clone)]
pub struct PostgresBrokerageConfigRepository {
    pool: PgPool,
}

impl PostgresBrokerageConfigRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BrokerageConfigRepository for PostgresBrokerageConfigRepository {
    async fn find(&self, tenant_id: TenantId) -> AppResult<Option<BrokerageConfig>> {
        let stored = sqlx::query_scalar::<_, serde_json::Value>(
            r#"
            SELECT config
            FROM brokerage_configs
            WHERE tenant_id = $1
            "#,
        )
        .bind(tenant_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load brokerage config for tenant '{tenant_id}': {error}"
            ))
        })?;

        stored
            .map(|value| {
                serde_json::from_value(value).map_err(|error| {
                    AppError::Internal(format!(
                        "stored brokerage config for tenant '{tenant_id}' is invalid: {error}"
                    ))
                })
            })
            .transpose()
    }

    async fn save(&self, tenant_id: TenantId, config: &BrokerageConfig) -> AppResult<()> {
        let value = serde_json::to_value(config).map_err(|error| {
            AppError::Internal(format!("failed to encode brokerage config: {error}"))
        })?;

        sqlx::query(
            r#"
            INSERT INTO brokerage_configs (tenant_id, config, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (tenant_id) DO UPDATE
            SET config = EXCLUDED.config, updated_at = now()
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to save brokerage config for tenant '{tenant_id}': {error}"
            ))
        })?;

        Ok(())
    }
}
