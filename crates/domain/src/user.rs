//! User profile types and validation rules.

use brokerdesk_core::{AppError, AppResult, RecordId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{PermissionMatrix, Role};

/// Validated, lower-cased email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Performs structural validation only: exactly one `@`, non-empty local
    /// part, and a domain containing at least one `.`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let trimmed = value.into().trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        };

        if domain.contains('@') {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        }

        if local.is_empty() {
            return Err(AppError::Validation(
                "email local part must not be empty".to_owned(),
            ));
        }

        if domain.is_empty() || !domain.contains('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        if trimmed.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        Ok(Self(trimmed))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Minimum password length for provisioned accounts.
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Maximum password length, bounding hashing cost.
pub const PASSWORD_MAX_LENGTH: usize = 128;

/// Validates a plaintext password supplied at provisioning time.
pub fn validate_password(password: &str) -> AppResult<()> {
    let char_count = password.chars().count();

    if char_count < PASSWORD_MIN_LENGTH {
        return Err(AppError::Validation(format!(
            "password must be at least {PASSWORD_MIN_LENGTH} characters"
        )));
    }

    if char_count > PASSWORD_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "password must not exceed {PASSWORD_MAX_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Application user as shown in user management.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// User id, also the session subject.
    pub id: RecordId,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: EmailAddress,
    /// Optional branch office.
    pub delegation_id: Option<RecordId>,
    /// Role and per-section rows.
    pub permissions: PermissionMatrix,
    /// Public avatar URL, empty when unset.
    #[serde(default)]
    pub avatar_url: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Returns the user's role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.permissions.role()
    }

    /// Applies a profile update in place.
    pub fn apply_patch(&mut self, patch: &UserProfilePatch, now: DateTime<Utc>) {
        brokerdesk_core::patch::apply(&mut self.name, &patch.name);
        brokerdesk_core::patch::apply_nullable(&mut self.delegation_id, &patch.delegation_id);
        brokerdesk_core::patch::apply(&mut self.avatar_url, &patch.avatar_url);
        self.updated_at = now;
    }
}

/// Editable profile fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfilePatch {
    /// New display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New branch office, `null` to clear.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "brokerdesk_core::patch::double_option"
    )]
    pub delegation_id: Option<Option<RecordId>>,
    /// New avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl UserProfilePatch {
    /// Checks the fields this patch sets.
    pub fn validate(&self) -> AppResult<()> {
        crate::resource::require_patch_text("name", &self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::{EmailAddress, validate_password};

    #[test]
    fn email_is_normalized() {
        let email = EmailAddress::new("  Ana.Lopez@Correduria.ES ");
        assert_eq!(
            email.map(String::from).ok().as_deref(),
            Some("ana.lopez@correduria.es")
        );
    }

    #[test]
    fn email_rejects_malformed_values() {
        assert!(EmailAddress::new("").is_err());
        assert!(EmailAddress::new("no-at-sign").is_err());
        assert!(EmailAddress::new("a@b@c.es").is_err());
        assert!(EmailAddress::new("@correduria.es").is_err());
        assert!(EmailAddress::new("ana@localhost").is_err());
    }

    #[test]
    fn password_length_bounds() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough").is_ok());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }
}
