//! Fakes shared by the service tests.

use std::sync::Arc;

use async_trait::async_trait;
use brokerdesk_core::{AppError, AppResult, RecordId, TenantId, UserIdentity};
use brokerdesk_domain::{
    EmailAddress, PermissionMatrix, Resource, Role, SectionPermission, UserProfile,
};
use chrono::Utc;
use tokio::sync::Mutex;

use crate::{ChangeEvent, ChangePublisher, DataSource, PasswordHasher, UserAccount, UserDirectory};

/// Data source over a vector, failing on demand.
pub(crate) struct InMemorySource<T: Resource> {
    records: Mutex<Vec<T>>,
    fail_writes: Mutex<bool>,
    calls: Mutex<usize>,
}

impl<T: Resource> Default for InMemorySource<T> {
    fn default() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail_writes: Mutex::new(false),
            calls: Mutex::new(0),
        }
    }
}

impl<T: Resource> InMemorySource<T> {
    pub(crate) fn with_records(records: Vec<T>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    pub(crate) async fn snapshot(&self) -> Vec<T> {
        self.records.lock().await.clone()
    }

    pub(crate) async fn fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().await = fail;
    }

    pub(crate) async fn list_calls(&self) -> usize {
        *self.calls.lock().await
    }

    async fn check_writable(&self) -> AppResult<()> {
        if *self.fail_writes.lock().await {
            return Err(AppError::Internal("storage unavailable".to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl<T: Resource> DataSource<T> for InMemorySource<T> {
    async fn list(&self, _tenant_id: TenantId) -> AppResult<Vec<T>> {
        *self.calls.lock().await += 1;
        Ok(self.records.lock().await.clone())
    }

    async fn find(&self, _tenant_id: TenantId, id: RecordId) -> AppResult<Option<T>> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .find(|record| record.id() == id)
            .cloned())
    }

    async fn create(&self, _tenant_id: TenantId, draft: T::Draft) -> AppResult<T> {
        self.check_writable().await?;
        let record = T::from_draft(RecordId::new(), draft, Utc::now());
        self.records.lock().await.push(record.clone());
        Ok(record)
    }

    async fn update(&self, _tenant_id: TenantId, id: RecordId, patch: T::Patch) -> AppResult<T> {
        self.check_writable().await?;
        let mut records = self.records.lock().await;
        let record = records
            .iter_mut()
            .find(|record| record.id() == id)
            .ok_or_else(|| AppError::NotFound(format!("record '{id}' does not exist")))?;
        record.apply_patch(&patch, Utc::now());
        Ok(record.clone())
    }

    async fn delete(&self, _tenant_id: TenantId, id: RecordId) -> AppResult<()> {
        self.check_writable().await?;
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|record| record.id() != id);
        if records.len() == before {
            return Err(AppError::NotFound(format!("record '{id}' does not exist")));
        }
        Ok(())
    }
}

/// Publisher keeping every event.
#[derive(Default)]
pub(crate) struct RecordingChanges {
    events: std::sync::Mutex<Vec<ChangeEvent>>,
}

impl RecordingChanges {
    pub(crate) fn events(&self) -> Vec<ChangeEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl ChangePublisher for RecordingChanges {
    fn publish(&self, event: ChangeEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// User directory holding one tenant, seeded with the acting user.
#[derive(Clone)]
pub(crate) struct StubDirectory {
    tenant_id: TenantId,
    actor_id: RecordId,
    accounts: Arc<Mutex<Vec<UserAccount>>>,
}

impl StubDirectory {
    pub(crate) fn with_role(role: Role) -> Self {
        Self::with_permissions(role, &[])
    }

    pub(crate) fn with_permissions(role: Role, rows: &[SectionPermission]) -> Self {
        let tenant_id = TenantId::new();
        let profile = profile("Actor", "actor@correduria.es", PermissionMatrix::for_role(role, rows));
        Self {
            tenant_id,
            actor_id: profile.id,
            accounts: Arc::new(Mutex::new(vec![UserAccount {
                tenant_id,
                profile,
                password_hash: "hashed:actor-password".to_owned(),
            }])),
        }
    }

    pub(crate) fn identity(&self) -> UserIdentity {
        UserIdentity::new(
            self.actor_id.to_string(),
            "Actor",
            Some("actor@correduria.es".to_owned()),
            self.tenant_id,
        )
    }

    pub(crate) async fn add_user(&self, name: &str, email: &str, role: Role) -> UserProfile {
        let profile = profile(name, email, PermissionMatrix::for_role(role, &[]));
        self.accounts.lock().await.push(UserAccount {
            tenant_id: self.tenant_id,
            profile: profile.clone(),
            password_hash: format!("hashed:{name}"),
        });
        profile
    }

    pub(crate) async fn profiles(&self) -> Vec<UserProfile> {
        self.accounts
            .lock()
            .await
            .iter()
            .map(|account| account.profile.clone())
            .collect()
    }
}

fn profile(name: &str, email: &str, permissions: PermissionMatrix) -> UserProfile {
    let now = Utc::now();
    UserProfile {
        id: RecordId::new(),
        name: name.to_owned(),
        email: EmailAddress::new(email).unwrap_or_else(|_| unreachable!()),
        delegation_id: None,
        permissions,
        avatar_url: String::new(),
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl UserDirectory for StubDirectory {
    async fn list_profiles(&self, tenant_id: TenantId) -> AppResult<Vec<UserProfile>> {
        Ok(self
            .accounts
            .lock()
            .await
            .iter()
            .filter(|account| account.tenant_id == tenant_id)
            .map(|account| account.profile.clone())
            .collect())
    }

    async fn find_profile(
        &self,
        tenant_id: TenantId,
        user_id: RecordId,
    ) -> AppResult<Option<UserProfile>> {
        Ok(self
            .accounts
            .lock()
            .await
            .iter()
            .find(|account| account.tenant_id == tenant_id && account.profile.id == user_id)
            .map(|account| account.profile.clone()))
    }

    async fn find_account_by_email(&self, email: &str) -> AppResult<Option<UserAccount>> {
        let email = email.to_lowercase();
        Ok(self
            .accounts
            .lock()
            .await
            .iter()
            .find(|account| account.profile.email.as_str() == email)
            .cloned())
    }

    async fn create_account(&self, account: UserAccount) -> AppResult<()> {
        self.accounts.lock().await.push(account);
        Ok(())
    }

    async fn save_profile(&self, tenant_id: TenantId, profile: &UserProfile) -> AppResult<()> {
        let mut accounts = self.accounts.lock().await;
        let account = accounts
            .iter_mut()
            .find(|account| account.tenant_id == tenant_id && account.profile.id == profile.id)
            .ok_or_else(|| AppError::NotFound("user does not exist".to_owned()))?;
        account.profile.name = profile.name.clone();
        account.profile.delegation_id = profile.delegation_id;
        account.profile.avatar_url = profile.avatar_url.clone();
        Ok(())
    }

    async fn save_permissions(
        &self,
        tenant_id: TenantId,
        user_id: RecordId,
        permissions: &PermissionMatrix,
    ) -> AppResult<()> {
        let mut accounts = self.accounts.lock().await;
        let account = accounts
            .iter_mut()
            .find(|account| account.tenant_id == tenant_id && account.profile.id == user_id)
            .ok_or_else(|| AppError::NotFound("user does not exist".to_owned()))?;
        account.profile.permissions = permissions.clone();
        Ok(())
    }

    async fn delete_account(&self, tenant_id: TenantId, user_id: RecordId) -> AppResult<()> {
        self.accounts
            .lock()
            .await
            .retain(|account| !(account.tenant_id == tenant_id && account.profile.id == user_id));
        Ok(())
    }
}

/// Reversible stand-in for argon2.
pub(crate) struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        Ok(format!("hashed:{password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        Ok(hash == format!("hashed:{password}"))
    }
}
