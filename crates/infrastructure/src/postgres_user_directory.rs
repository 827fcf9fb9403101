use std::collections::HashMap;

use async_trait::async_trait;
use brokerdesk_application::{UserAccount, UserDirectory};
use brokerdesk_core::{AppError, AppResult, RecordId, TenantId};
use brokerdesk_domain::{
    CapabilitySet, EmailAddress, PermissionMatrix, Role, SectionPermission, UserProfile,
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::postgres_data_source::transaction_error;

/// PostgreSQL-backed accounts, profiles and permission rows.
#[derive(Clone)]
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    /// Creates a directory with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    tenant_id: Uuid,
    name: String,
    email: String,
    role: String,
    delegation_id: Option<Uuid>,
    avatar_url: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    user_id: Uuid,
    section: String,
    can_view: bool,
    can_create: bool,
    can_edit: bool,
    can_delete: bool,
}

impl PermissionRow {
    fn into_permission(self) -> AppResult<SectionPermission> {
        Ok(SectionPermission {
            section: self.section.parse()?,
            capabilities: CapabilitySet {
                can_view: self.can_view,
                can_create: self.can_create,
                can_edit: self.can_edit,
                can_delete: self.can_delete,
            },
        })
    }
}

const USER_COLUMNS: &str = "id, tenant_id, name, email, role, delegation_id, avatar_url, \
                            password_hash, created_at, updated_at";

fn account_from_rows(row: UserRow, permissions: Vec<PermissionRow>) -> AppResult<UserAccount> {
    let role: Role = row.role.parse()?;
    let rows = permissions
        .into_iter()
        .map(PermissionRow::into_permission)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(UserAccount {
        tenant_id: TenantId::from_uuid(row.tenant_id),
        profile: UserProfile {
            id: RecordId::from_uuid(row.id),
            name: row.name,
            email: EmailAddress::new(row.email)?,
            delegation_id: row.delegation_id.map(RecordId::from_uuid),
            permissions: PermissionMatrix::for_role(role, &rows),
            avatar_url: row.avatar_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        },
        password_hash: row.password_hash,
    })
}

async fn permission_rows(
    pool: &PgPool,
    user_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Vec<PermissionRow>>> {
    let rows = sqlx::query_as::<_, PermissionRow>(
        r#"
        SELECT user_id, section, can_view, can_create, can_edit, can_delete
        FROM user_permissions
        WHERE user_id = ANY($1)
        ORDER BY section
        "#,
    )
    .bind(user_ids)
    .fetch_all(pool)
    .await
    .map_err(|error| AppError::Internal(format!("failed to load permission rows: {error}")))?;

    let mut grouped: HashMap<Uuid, Vec<PermissionRow>> = HashMap::new();
    for row in rows {
        grouped.entry(row.user_id).or_default().push(row);
    }
    Ok(grouped)
}

async fn write_permissions(
    connection: &mut PgConnection,
    tenant_id: TenantId,
    user_id: RecordId,
    permissions: &PermissionMatrix,
) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE users
        SET role = $3, updated_at = now()
        WHERE tenant_id = $1 AND id = $2
        "#,
    )
    .bind(tenant_id.as_uuid())
    .bind(user_id.as_uuid())
    .bind(permissions.role().as_str())
    .execute(&mut *connection)
    .await
    .map_err(|error| {
        AppError::Internal(format!("failed to save role of user '{user_id}': {error}"))
    })?;

    sqlx::query("DELETE FROM user_permissions WHERE tenant_id = $1 AND user_id = $2")
        .bind(tenant_id.as_uuid())
        .bind(user_id.as_uuid())
        .execute(&mut *connection)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to clear permission rows of user '{user_id}': {error}"
            ))
        })?;

    for row in permissions.rows() {
        sqlx::query(
            r#"
            INSERT INTO user_permissions
                (tenant_id, user_id, section, can_view, can_create, can_edit, can_delete)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(row.section.as_str())
        .bind(row.capabilities.can_view)
        .bind(row.capabilities.can_create)
        .bind(row.capabilities.can_edit)
        .bind(row.capabilities.can_delete)
        .execute(&mut *connection)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to save '{}' permissions of user '{user_id}': {error}",
                row.section.as_str()
            ))
        })?;
    }

    Ok(())
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .is_some_and(|database_error| database_error.is_unique_violation())
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn list_profiles(&self, tenant_id: TenantId) -> AppResult<Vec<UserProfile>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE tenant_id = $1 ORDER BY name, id"
        ))
        .bind(tenant_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list users for tenant '{tenant_id}': {error}"
            ))
        })?;

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let mut permissions = permission_rows(&self.pool, &ids).await?;

        rows.into_iter()
            .map(|row| {
                let rows = permissions.remove(&row.id).unwrap_or_default();
                account_from_rows(row, rows).map(|account| account.profile)
            })
            .collect()
    }

    async fn find_profile(
        &self,
        tenant_id: TenantId,
        user_id: RecordId,
    ) -> AppResult<Option<UserProfile>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE tenant_id = $1 AND id = $2"
        ))
        .bind(tenant_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find user '{user_id}': {error}"))
        })?;

        let Some(row) = row else {
            return Ok(None);
        };
        let rows = permission_rows(&self.pool, &[row.id])
            .await?
            .remove(&row.id)
            .unwrap_or_default();
        account_from_rows(row, rows).map(|account| Some(account.profile))
    }

    async fn find_account_by_email(&self, email: &str) -> AppResult<Option<UserAccount>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)"
        ))
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find account by email: {error}")))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let rows = permission_rows(&self.pool, &[row.id])
            .await?
            .remove(&row.id)
            .unwrap_or_default();
        account_from_rows(row, rows).map(Some)
    }

    async fn create_account(&self, account: UserAccount) -> AppResult<()> {
        let profile = &account.profile;
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| transaction_error("begin", error))?;

        sqlx::query(
            r#"
            INSERT INTO users (
                id, tenant_id, name, email, role, delegation_id, avatar_url,
                password_hash, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(profile.id.as_uuid())
        .bind(account.tenant_id.as_uuid())
        .bind(profile.name.as_str())
        .bind(profile.email.as_str())
        .bind(profile.role().as_str())
        .bind(profile.delegation_id.map(|id| id.as_uuid()))
        .bind(profile.avatar_url.as_str())
        .bind(account.password_hash.as_str())
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            if is_unique_violation(&error) {
                AppError::Conflict(format!(
                    "email '{}' is already registered",
                    profile.email.as_str()
                ))
            } else {
                AppError::Internal(format!("failed to create user account: {error}"))
            }
        })?;

        write_permissions(
            &mut transaction,
            account.tenant_id,
            profile.id,
            &profile.permissions,
        )
        .await?;

        transaction
            .commit()
            .await
            .map_err(|error| transaction_error("commit", error))?;

        Ok(())
    }

    async fn save_profile(&self, tenant_id: TenantId, profile: &UserProfile) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = $3, delegation_id = $4, avatar_url = $5, updated_at = $6
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(profile.id.as_uuid())
        .bind(profile.name.as_str())
        .bind(profile.delegation_id.map(|id| id.as_uuid()))
        .bind(profile.avatar_url.as_str())
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to save user '{}': {error}", profile.id))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "user '{}' does not exist",
                profile.id
            )));
        }

        Ok(())
    }

    async fn save_permissions(
        &self,
        tenant_id: TenantId,
        user_id: RecordId,
        permissions: &PermissionMatrix,
    ) -> AppResult<()> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| transaction_error("begin", error))?;

        write_permissions(&mut transaction, tenant_id, user_id, permissions).await?;

        transaction
            .commit()
            .await
            .map_err(|error| transaction_error("commit", error))
    }

    async fn delete_account(&self, tenant_id: TenantId, user_id: RecordId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id.as_uuid())
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to delete user '{user_id}': {error}"))
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("user '{user_id}' does not exist")));
        }

        Ok(())
    }
}
