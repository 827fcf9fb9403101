//! User provisioning, profile management and login.
//!
//! Accounts are only ever created by an administrator; there is no
//! self-registration.

use std::sync::Arc;

use brokerdesk_core::{AppError, AppResult, RecordId, UserIdentity};
use brokerdesk_domain::{
    Capability, PermissionMatrix, PermissionSummary, Role, Section, SectionPermission,
    UserProfile, UserProfilePatch,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    ChangeEvent, ChangeKind, ChangePublisher, PasswordHasher, PermissionService, UserDirectory,
};

mod login;
mod provision;

pub use login::AuthOutcome;
pub use provision::ProvisionUser;

/// Profile plus the per-section summary shown in user listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListing {
    /// Stored profile.
    pub profile: UserProfile,
    /// Effective flags of every section.
    pub summary: PermissionSummary,
}

/// Application service for users.
#[derive(Clone)]
pub struct UserService {
    directory: Arc<dyn UserDirectory>,
    password_hasher: Arc<dyn PasswordHasher>,
    permissions: PermissionService,
    changes: Arc<dyn ChangePublisher>,
}

impl UserService {
    /// Creates the service.
    #[must_use]
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        password_hasher: Arc<dyn PasswordHasher>,
        permissions: PermissionService,
        changes: Arc<dyn ChangePublisher>,
    ) -> Self {
        Self {
            directory,
            password_hasher,
            permissions,
            changes,
        }
    }

    /// Lists users with their permission summaries.
    pub async fn list(&self, actor: &UserIdentity) -> AppResult<Vec<UserListing>> {
        self.permissions
            .require(actor, Section::Users, Capability::View)
            .await?;

        let mut profiles = self.directory.list_profiles(actor.tenant_id()).await?;
        profiles.sort_by(|left, right| left.name.to_lowercase().cmp(&right.name.to_lowercase()));

        Ok(profiles
            .into_iter()
            .map(|profile| UserListing {
                summary: PermissionSummary::from(&profile.permissions),
                profile,
            })
            .collect())
    }

    /// Returns one user.
    pub async fn find(&self, actor: &UserIdentity, user_id: RecordId) -> AppResult<UserProfile> {
        self.permissions
            .require(actor, Section::Users, Capability::View)
            .await?;
        self.profile(actor, user_id).await
    }

    /// Returns the actor's own profile.
    pub async fn current(&self, actor: &UserIdentity) -> AppResult<UserProfile> {
        let user_id = actor.record_id()?;
        self.profile(actor, user_id).await
    }

    /// Updates another user's profile.
    pub async fn update(
        &self,
        actor: &UserIdentity,
        user_id: RecordId,
        patch: UserProfilePatch,
    ) -> AppResult<UserProfile> {
        self.permissions
            .require(actor, Section::Users, Capability::Edit)
            .await?;
        self.write_profile(actor, user_id, patch).await
    }

    /// Updates the actor's own profile. No section permission is needed.
    pub async fn update_current(
        &self,
        actor: &UserIdentity,
        patch: UserProfilePatch,
    ) -> AppResult<UserProfile> {
        let user_id = actor.record_id()?;
        self.write_profile(actor, user_id, patch).await
    }

    /// Replaces the role and explicit section rows of a user.
    pub async fn update_permissions(
        &self,
        actor: &UserIdentity,
        user_id: RecordId,
        role: Role,
        rows: Vec<SectionPermission>,
    ) -> AppResult<UserProfile> {
        self.permissions
            .require(actor, Section::Users, Capability::Edit)
            .await?;
        let mut profile = self.profile(actor, user_id).await?;

        if actor.record_id()? == user_id && role != Role::Admin && profile.role() == Role::Admin {
            return Err(AppError::Conflict(
                "administrators cannot demote themselves".to_owned(),
            ));
        }

        profile.permissions = PermissionMatrix::for_role(role, &rows);
        profile.updated_at = Utc::now();
        self.directory
            .save_permissions(actor.tenant_id(), user_id, &profile.permissions)
            .await?;
        tracing::info!(user_id = %user_id, role = role.as_str(), subject = actor.subject(), "permissions updated");
        self.publish(actor, ChangeKind::Updated, &profile);
        Ok(profile)
    }

    /// Deletes a user. Users cannot delete themselves.
    pub async fn delete(&self, actor: &UserIdentity, user_id: RecordId) -> AppResult<()> {
        self.permissions
            .require(actor, Section::Users, Capability::Delete)
            .await?;
        if actor.record_id()? == user_id {
            return Err(AppError::Conflict(
                "users cannot delete their own account".to_owned(),
            ));
        }

        self.profile(actor, user_id).await?;
        self.directory
            .delete_account(actor.tenant_id(), user_id)
            .await?;
        tracing::info!(user_id = %user_id, subject = actor.subject(), "user deleted");
        self.changes.publish(ChangeEvent::deleted(
            actor.tenant_id(),
            brokerdesk_domain::ResourceKind::User,
            user_id,
        ));
        Ok(())
    }

    async fn profile(&self, actor: &UserIdentity, user_id: RecordId) -> AppResult<UserProfile> {
        self.directory
            .find_profile(actor.tenant_id(), user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))
    }

    async fn write_profile(
        &self,
        actor: &UserIdentity,
        user_id: RecordId,
        patch: UserProfilePatch,
    ) -> AppResult<UserProfile> {
        patch.validate()?;
        let mut profile = self.profile(actor, user_id).await?;
        profile.apply_patch(&patch, Utc::now());
        self.directory
            .save_profile(actor.tenant_id(), &profile)
            .await?;
        self.publish(actor, ChangeKind::Updated, &profile);
        Ok(profile)
    }

    fn publish(&self, actor: &UserIdentity, change: ChangeKind, profile: &UserProfile) {
        self.changes.publish(ChangeEvent {
            tenant_id: actor.tenant_id(),
            resource: brokerdesk_domain::ResourceKind::User,
            change,
            id: profile.id,
            record: serde_json::to_value(profile).ok(),
        });
    }
}
