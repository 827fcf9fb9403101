use std::sync::Arc;

use brokerdesk_core::{AppError, AppResult, UserIdentity};
use brokerdesk_domain::{Capability, PermissionMatrix, PermissionSummary, Section};

use crate::UserDirectory;

/// Resolves and enforces section permissions of the acting user.
#[derive(Clone)]
pub struct PermissionService {
    directory: Arc<dyn UserDirectory>,
}

impl PermissionService {
    /// Creates a permission service over the user directory.
    #[must_use]
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// Returns the effective matrix of the actor.
    ///
    /// Unknown actors are rejected as unauthorized.
    pub async fn matrix_for(&self, actor: &UserIdentity) -> AppResult<PermissionMatrix> {
        let user_id = actor.record_id()?;
        self.directory
            .find_profile(actor.tenant_id(), user_id)
            .await?
            .map(|profile| profile.permissions)
            .ok_or_else(|| {
                AppError::Unauthorized(format!("unknown user '{}'", actor.subject()))
            })
    }

    /// Returns the per-section summary of the actor.
    pub async fn summary_for(&self, actor: &UserIdentity) -> AppResult<PermissionSummary> {
        let matrix = self.matrix_for(actor).await?;
        Ok(PermissionSummary::from(&matrix))
    }

    /// Ensures the actor holds a capability in a section.
    pub async fn require(
        &self,
        actor: &UserIdentity,
        section: Section,
        capability: Capability,
    ) -> AppResult<()> {
        let matrix = self.matrix_for(actor).await?;
        if matrix.allows(section, capability) {
            return Ok(());
        }

        tracing::warn!(
            subject = actor.subject(),
            section = section.as_str(),
            capability = capability.as_str(),
            "permission check rejected"
        );
        Err(AppError::Forbidden(format!(
            "user '{}' cannot {} in section '{}'",
            actor.subject(),
            capability.as_str(),
            section.as_str()
        )))
    }
}
