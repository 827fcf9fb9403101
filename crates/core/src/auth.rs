use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult, RecordId, TenantId};

/// User information persisted in the authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    subject: String,
    display_name: String,
    email: Option<String>,
    tenant_id: TenantId,
}

impl UserIdentity {
    /// Creates a user identity from authentication and tenancy data.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        display_name: impl Into<String>,
        email: Option<String>,
        tenant_id: TenantId,
    ) -> Self {
        Self {
            subject: subject.into(),
            display_name: display_name.into(),
            email,
            tenant_id,
        }
    }

    /// Returns the stable subject, the user's record id.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the display name for the current user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the email, if known.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the tenant linked to the identity.
    #[must_use]
    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// Returns the user's record id, parsed from the subject.
    ///
    /// A session whose subject is not a record id cannot act on any
    /// resource and is treated as unauthenticated.
    pub fn record_id(&self) -> AppResult<RecordId> {
        self.subject.parse().map_err(|_| {
            AppError::Unauthorized(format!("invalid subject '{}'", self.subject))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::UserIdentity;
    use crate::{AppError, RecordId, TenantId};

    #[test]
    fn record_id_parses_the_subject() {
        let id = RecordId::new();
        let identity = UserIdentity::new(id.to_string(), "Ana", None, TenantId::new());
        assert_eq!(identity.record_id().ok(), Some(id));
    }

    #[test]
    fn non_uuid_subjects_are_unauthorized() {
        let identity = UserIdentity::new("ana", "Ana", None, TenantId::new());
        assert!(matches!(identity.record_id(), Err(AppError::Unauthorized(_))));
    }
}
