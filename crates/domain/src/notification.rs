use std::str::FromStr;

use brokerdesk_core::patch::apply;
use brokerdesk_core::{AppError, AppResult, RecordId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resource::{require_patch_text, require_text, trim_optional};
use crate::{Resource, ResourceKind};

/// Message addressed to one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Record id.
    pub id: RecordId,
    /// Recipient.
    pub user_id: RecordId,
    /// Short title.
    pub title: String,
    /// Body text.
    pub description: String,
    /// Optional in-app link.
    pub url: Option<String>,
    /// Whether the recipient has read it.
    pub read: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct NotificationDraft {
    pub user_id: RecordId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Fields changed by a notification update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPatch {
    /// New read flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
}

impl Resource for Notification {
    type Draft = NotificationDraft;
    type Patch = NotificationPatch;

    const KIND: ResourceKind = ResourceKind::Notification;

    fn id(&self) -> RecordId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_draft(id: RecordId, draft: Self::Draft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: draft.user_id,
            title: draft.title.trim().to_owned(),
            description: draft.description,
            url: trim_optional(draft.url),
            read: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: &Self::Patch, now: DateTime<Utc>) {
        apply(&mut self.read, &patch.read);
        self.updated_at = now;
    }

    fn validate_draft(draft: &Self::Draft) -> AppResult<()> {
        require_text("title", &draft.title)
    }
}

/// Severity of a system alert banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    /// Informational banner.
    #[default]
    Info,
    /// Something needs attention.
    Warning,
    /// Service disruption.
    Critical,
}

impl AlertSeverity {
    /// Returns a stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl FromStr for AlertSeverity {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "critical" => Ok(Self::Critical),
            _ => Err(AppError::Validation(format!(
                "unknown alert severity '{value}'"
            ))),
        }
    }
}

/// Tenant-wide banner shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemAlert {
    /// Record id.
    pub id: RecordId,
    /// Banner title.
    pub title: String,
    /// Banner text.
    pub message: String,
    /// Severity.
    pub severity: AlertSeverity,
    /// Shown while active.
    pub active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

fn active_by_default() -> bool {
    true
}

/// Fields supplied when creating a system alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct SystemAlertDraft {
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub severity: AlertSeverity,
    #[serde(default = "active_by_default")]
    pub active: bool,
}

/// Fields changed by a system alert update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct SystemAlertPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<AlertSeverity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl Resource for SystemAlert {
    type Draft = SystemAlertDraft;
    type Patch = SystemAlertPatch;

    const KIND: ResourceKind = ResourceKind::SystemAlert;

    fn id(&self) -> RecordId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_draft(id: RecordId, draft: Self::Draft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title.trim().to_owned(),
            message: draft.message,
            severity: draft.severity,
            active: draft.active,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: &Self::Patch, now: DateTime<Utc>) {
        apply(&mut self.title, &patch.title);
        apply(&mut self.message, &patch.message);
        apply(&mut self.severity, &patch.severity);
        apply(&mut self.active, &patch.active);
        self.updated_at = now;
    }

    fn validate_draft(draft: &Self::Draft) -> AppResult<()> {
        require_text("title", &draft.title)
    }

    fn validate_patch(patch: &Self::Patch) -> AppResult<()> {
        require_patch_text("title", &patch.title)
    }
}
