use std::sync::Arc;

use async_trait::async_trait;
use brokerdesk_application::{UserAccount, UserDirectory};
use brokerdesk_core::{AppError, AppResult, RecordId, TenantId};
use brokerdesk_domain::{PermissionMatrix, UserProfile};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::LocalStorage;

pub(crate) const ACCOUNTS_KEY: &str = "accounts";

/// Serialized form of an account inside the local blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredAccount {
    pub(crate) tenant_id: TenantId,
    pub(crate) profile: UserProfile,
    pub(crate) password_hash: String,
}

impl From<StoredAccount> for UserAccount {
    fn from(value: StoredAccount) -> Self {
        Self {
            tenant_id: value.tenant_id,
            profile: value.profile,
            password_hash: value.password_hash,
        }
    }
}

impl From<UserAccount> for StoredAccount {
    fn from(value: UserAccount) -> Self {
        Self {
            tenant_id: value.tenant_id,
            profile: value.profile,
            password_hash: value.password_hash,
        }
    }
}

/// Demo user directory kept in the local blob.
#[derive(Clone)]
pub struct LocalUserDirectory {
    storage: Arc<LocalStorage>,
}

impl LocalUserDirectory {
    /// Creates a directory over the shared blob.
    #[must_use]
    pub fn new(storage: Arc<LocalStorage>) -> Self {
        Self { storage }
    }

    async fn accounts(&self) -> AppResult<Vec<StoredAccount>> {
        Ok(self.storage.read(ACCOUNTS_KEY).await?.unwrap_or_default())
    }
}

fn missing_user(user_id: RecordId) -> AppError {
    AppError::NotFound(format!("user '{user_id}' does not exist"))
}

#[async_trait]
impl UserDirectory for LocalUserDirectory {
    async fn list_profiles(&self, _tenant_id: TenantId) -> AppResult<Vec<UserProfile>> {
        let mut profiles: Vec<UserProfile> = self
            .accounts()
            .await?
            .into_iter()
            .map(|account| account.profile)
            .collect();
        profiles.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(profiles)
    }

    async fn find_profile(
        &self,
        _tenant_id: TenantId,
        user_id: RecordId,
    ) -> AppResult<Option<UserProfile>> {
        Ok(self
            .accounts()
            .await?
            .into_iter()
            .find(|account| account.profile.id == user_id)
            .map(|account| account.profile))
    }

    async fn find_account_by_email(&self, email: &str) -> AppResult<Option<UserAccount>> {
        let email = email.trim().to_lowercase();
        Ok(self
            .accounts()
            .await?
            .into_iter()
            .find(|account| account.profile.email.as_str() == email)
            .map(UserAccount::from))
    }

    async fn create_account(&self, account: UserAccount) -> AppResult<()> {
        self.storage
            .update::<Vec<StoredAccount>, _>(ACCOUNTS_KEY, |accounts| {
                if accounts
                    .iter()
                    .any(|stored| stored.profile.email == account.profile.email)
                {
                    return Err(AppError::Conflict(format!(
                        "email '{}' is already registered",
                        account.profile.email.as_str()
                    )));
                }
                accounts.push(StoredAccount::from(account));
                Ok(())
            })
            .await
    }

    async fn save_profile(&self, _tenant_id: TenantId, profile: &UserProfile) -> AppResult<()> {
        self.storage
            .update::<Vec<StoredAccount>, _>(ACCOUNTS_KEY, |accounts| {
                let stored = accounts
                    .iter_mut()
                    .find(|stored| stored.profile.id == profile.id)
                    .ok_or_else(|| missing_user(profile.id))?;
                let permissions = stored.profile.permissions.clone();
                stored.profile = profile.clone();
                stored.profile.permissions = permissions;
                Ok(())
            })
            .await
    }

    async fn save_permissions(
        &self,
        _tenant_id: TenantId,
        user_id: RecordId,
        permissions: &PermissionMatrix,
    ) -> AppResult<()> {
        self.storage
            .update::<Vec<StoredAccount>, _>(ACCOUNTS_KEY, |accounts| {
                let stored = accounts
                    .iter_mut()
                    .find(|stored| stored.profile.id == user_id)
                    .ok_or_else(|| missing_user(user_id))?;
                stored.profile.permissions = permissions.clone();
                stored.profile.updated_at = Utc::now();
                Ok(())
            })
            .await
    }

    async fn delete_account(&self, _tenant_id: TenantId, user_id: RecordId) -> AppResult<()> {
        self.storage
            .update::<Vec<StoredAccount>, _>(ACCOUNTS_KEY, |accounts| {
                let before = accounts.len();
                accounts.retain(|stored| stored.profile.id != user_id);
                if accounts.len() == before {
                    return Err(missing_user(user_id));
                }
                Ok(())
            })
            .await
    }
}
