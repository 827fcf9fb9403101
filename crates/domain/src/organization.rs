use brokerdesk_core::patch::{apply, apply_nullable, double_option};
use brokerdesk_core::{AppResult, RecordId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resource::{require_patch_text, require_text, trim_optional};
use crate::{EmailAddress, Resource, ResourceKind};

/// Branch office of the brokerage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delegation {
    /// Record id.
    pub id: RecordId,
    /// Short name.
    pub name: String,
    /// Registered legal name.
    pub legal_name: String,
    /// Postal address.
    pub address: String,
    /// Contact phone.
    pub phone: String,
    /// Contact email.
    pub email: String,
    /// Person in charge.
    pub contact_person: String,
    /// Optional public website.
    pub website: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a delegation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DelegationDraft {
    /// Short name.
    pub name: String,
    /// Registered legal name.
    pub legal_name: String,
    /// Postal address.
    pub address: String,
    /// Contact phone.
    pub phone: String,
    /// Contact email.
    pub email: String,
    /// Person in charge.
    pub contact_person: String,
    /// Optional public website.
    pub website: Option<String>,
}

/// Fields changed by a delegation update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct DelegationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub website: Option<Option<String>>,
}

impl Resource for Delegation {
    type Draft = DelegationDraft;
    type Patch = DelegationPatch;

    const KIND: ResourceKind = ResourceKind::Delegation;

    fn id(&self) -> RecordId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_draft(id: RecordId, draft: Self::Draft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name.trim().to_owned(),
            legal_name: draft.legal_name,
            address: draft.address,
            phone: draft.phone,
            email: draft.email.trim().to_lowercase(),
            contact_person: draft.contact_person,
            website: trim_optional(draft.website),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: &Self::Patch, now: DateTime<Utc>) {
        apply(&mut self.name, &patch.name);
        apply(&mut self.legal_name, &patch.legal_name);
        apply(&mut self.address, &patch.address);
        apply(&mut self.phone, &patch.phone);
        apply(&mut self.email, &patch.email);
        apply(&mut self.contact_person, &patch.contact_person);
        apply_nullable(&mut self.website, &patch.website);
        self.updated_at = now;
    }

    fn validate_draft(draft: &Self::Draft) -> AppResult<()> {
        require_text("name", &draft.name)?;
        if !draft.email.trim().is_empty() {
            EmailAddress::new(draft.email.as_str())?;
        }
        Ok(())
    }

    fn validate_patch(patch: &Self::Patch) -> AppResult<()> {
        require_patch_text("name", &patch.name)?;
        if let Some(email) = patch.email.as_deref().filter(|value| !value.trim().is_empty()) {
            EmailAddress::new(email)?;
        }
        Ok(())
    }
}

/// Internal department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    /// Record id.
    pub id: RecordId,
    /// Department name.
    pub name: String,
    /// Responsible person.
    pub responsible_name: String,
    /// Responsible person's email.
    pub responsible_email: String,
    /// Free-text description.
    pub description: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a department.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)]
pub struct DepartmentDraft {
    pub name: String,
    pub responsible_name: String,
    pub responsible_email: String,
    pub description: String,
}

/// Fields changed by a department update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct DepartmentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Resource for Department {
    type Draft = DepartmentDraft;
    type Patch = DepartmentPatch;

    const KIND: ResourceKind = ResourceKind::Department;

    fn id(&self) -> RecordId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_draft(id: RecordId, draft: Self::Draft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name.trim().to_owned(),
            responsible_name: draft.responsible_name,
            responsible_email: draft.responsible_email.trim().to_lowercase(),
            description: draft.description,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: &Self::Patch, now: DateTime<Utc>) {
        apply(&mut self.name, &patch.name);
        apply(&mut self.responsible_name, &patch.responsible_name);
        apply(&mut self.responsible_email, &patch.responsible_email);
        apply(&mut self.description, &patch.description);
        self.updated_at = now;
    }

    fn validate_draft(draft: &Self::Draft) -> AppResult<()> {
        require_text("name", &draft.name)?;
        if !draft.responsible_email.trim().is_empty() {
            EmailAddress::new(draft.responsible_email.as_str())?;
        }
        Ok(())
    }

    fn validate_patch(patch: &Self::Patch) -> AppResult<()> {
        require_patch_text("name", &patch.name)
    }
}

/// Post published inside a department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentContent {
    /// Record id.
    pub id: RecordId,
    /// Owning department.
    pub department_id: RecordId,
    /// Post title.
    pub title: String,
    /// Rich-text body.
    pub content: String,
    /// Optional illustration.
    pub image_url: Option<String>,
    /// Visible to readers.
    pub published: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a department post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct DepartmentContentDraft {
    pub department_id: RecordId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub published: bool,
}

/// Fields changed by a department post update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct DepartmentContentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub image_url: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
}

impl Resource for DepartmentContent {
    type Draft = DepartmentContentDraft;
    type Patch = DepartmentContentPatch;

    const KIND: ResourceKind = ResourceKind::DepartmentContent;

    fn id(&self) -> RecordId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_draft(id: RecordId, draft: Self::Draft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            department_id: draft.department_id,
            title: draft.title.trim().to_owned(),
            content: draft.content,
            image_url: trim_optional(draft.image_url),
            published: draft.published,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: &Self::Patch, now: DateTime<Utc>) {
        apply(&mut self.title, &patch.title);
        apply(&mut self.content, &patch.content);
        apply_nullable(&mut self.image_url, &patch.image_url);
        apply(&mut self.published, &patch.published);
        self.updated_at = now;
    }

    fn validate_draft(draft: &Self::Draft) -> AppResult<()> {
        require_text("title", &draft.title)
    }

    fn validate_patch(patch: &Self::Patch) -> AppResult<()> {
        require_patch_text("title", &patch.title)
    }
}

#[cfg(test)]
mod tests {
    use brokerdesk_core::RecordId;
    use chrono::Utc;

    use super::{Delegation, DelegationDraft, DelegationPatch};
    use crate::Resource;

    fn draft() -> DelegationDraft {
        DelegationDraft {
            name: " Valencia Centro ".to_owned(),
            legal_name: "Correduría Levante S.L.".to_owned(),
            email: "Valencia@Correduria.es".to_owned(),
            website: Some("  ".to_owned()),
            ..DelegationDraft::default()
        }
    }

    #[test]
    fn draft_requires_name_and_valid_email() {
        assert!(Delegation::validate_draft(&draft()).is_ok());
        assert!(
            Delegation::validate_draft(&DelegationDraft {
                name: " ".to_owned(),
                ..draft()
            })
            .is_err()
        );
        assert!(
            Delegation::validate_draft(&DelegationDraft {
                email: "nope".to_owned(),
                ..draft()
            })
            .is_err()
        );
    }

    #[test]
    fn from_draft_normalizes_fields() {
        let delegation = Delegation::from_draft(RecordId::new(), draft(), Utc::now());

        assert_eq!(delegation.name, "Valencia Centro");
        assert_eq!(delegation.email, "valencia@correduria.es");
        assert_eq!(delegation.website, None);
    }

    #[test]
    fn patch_clears_website_only_when_null_is_sent() -> Result<(), serde_json::Error> {
        let mut delegation = Delegation::from_draft(
            RecordId::new(),
            DelegationDraft {
                website: Some("https://levante.es".to_owned()),
                ..draft()
            },
            Utc::now(),
        );

        let untouched: DelegationPatch = serde_json::from_str(r#"{"phone":"961000000"}"#)?;
        delegation.apply_patch(&untouched, Utc::now());
        assert_eq!(delegation.website.as_deref(), Some("https://levante.es"));
        assert_eq!(delegation.phone, "961000000");

        let cleared: DelegationPatch = serde_json::from_str(r#"{"website":null}"#)?;
        delegation.apply_patch(&cleared, Utc::now());
        assert_eq!(delegation.website, None);
        Ok(())
    }
}
