use async_trait::async_trait;

use brokerdesk_core::{AppResult, RecordId, TenantId};
use brokerdesk_domain::{PermissionMatrix, UserProfile};

/// Stored credentials of one account.
#[derive(Debug, Clone, PartialEq)]
pub struct UserAccount {
    /// Tenant the account belongs to.
    pub tenant_id: TenantId,
    /// Profile linked to the account.
    pub profile: UserProfile,
    /// Argon2id PHC string.
    pub password_hash: String,
}

/// Repository port for accounts, profiles, roles and permission rows.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Lists the profiles of a tenant.
    async fn list_profiles(&self, tenant_id: TenantId) -> AppResult<Vec<UserProfile>>;

    /// Returns one profile by id.
    async fn find_profile(
        &self,
        tenant_id: TenantId,
        user_id: RecordId,
    ) -> AppResult<Option<UserProfile>>;

    /// Finds an account by login email (case-insensitive) across tenants.
    async fn find_account_by_email(&self, email: &str) -> AppResult<Option<UserAccount>>;

    /// Creates account, profile, role and permission rows together.
    ///
    /// Returns `Conflict` when the email is already registered.
    async fn create_account(&self, account: UserAccount) -> AppResult<()>;

    /// Persists profile fields (name, delegation, avatar).
    async fn save_profile(&self, tenant_id: TenantId, profile: &UserProfile) -> AppResult<()>;

    /// Replaces the role and explicit permission rows of a user.
    async fn save_permissions(
        &self,
        tenant_id: TenantId,
        user_id: RecordId,
        permissions: &PermissionMatrix,
    ) -> AppResult<()>;

    /// Deletes the account and its profile.
    async fn delete_account(&self, tenant_id: TenantId, user_id: RecordId) -> AppResult<()>;
}

/// Port for password hashing operations.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}
