use brokerdesk_core::patch::{apply, apply_nullable, double_option};
use brokerdesk_core::{AppResult, RecordId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resource::{require_patch_text, require_text, trim_optional};
use crate::{EmailAddress, Resource, ResourceKind};

/// Insurer the brokerage works with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    /// Record id.
    pub id: RecordId,
    /// Commercial name.
    pub name: String,
    /// How brokers access the insurer's platform.
    pub broker_access: String,
    /// Commercial manager assigned to the brokerage.
    pub commercial_manager: String,
    /// Commercial manager's email.
    pub manager_email: String,
    /// Optional public website.
    pub website: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a company.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)]
pub struct CompanyDraft {
    pub name: String,
    pub broker_access: String,
    pub commercial_manager: String,
    pub manager_email: String,
    pub website: Option<String>,
}

/// Fields changed by a company update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct CompanyPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broker_access: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commercial_manager: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_email: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub website: Option<Option<String>>,
}

impl Resource for Company {
    type Draft = CompanyDraft;
    type Patch = CompanyPatch;

    const KIND: ResourceKind = ResourceKind::Company;

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
            broker_access: draft.broker_access,
            commercial_manager: draft.commercial_manager,
            manager_email: draft.manager_email.trim().to_lowercase(),
            website: trim_optional(draft.website),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: &Self::Patch, now: DateTime<Utc>) {
        apply(&mut self.name, &patch.name);
        apply(&mut self.broker_access, &patch.broker_access);
        apply(&mut self.commercial_manager, &patch.commercial_manager);
        apply(&mut self.manager_email, &patch.manager_email);
        apply_nullable(&mut self.website, &patch.website);
        self.updated_at = now;
    }

    fn validate_draft(draft: &Self::Draft) -> AppResult<()> {
        require_text("name", &draft.name)?;
        if !draft.manager_email.trim().is_empty() {
            EmailAddress::new(draft.manager_email.as_str())?;
        }
        Ok(())
    }

    fn validate_patch(patch: &Self::Patch) -> AppResult<()> {
        require_patch_text("name", &patch.name)?;
        if let Some(email) = patch
            .manager_email
            .as_deref()
            .filter(|value| !value.trim().is_empty())
        {
            EmailAddress::new(email)?;
        }
        Ok(())
    }
}

/// Grouping of one company's specifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecificationCategory {
    /// Record id.
    pub id: RecordId,
    /// Owning company.
    pub company_id: RecordId,
    /// Category name.
    pub name: String,
    /// Display order inside the company.
    pub order: i32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a specification category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct SpecificationCategoryDraft {
    pub company_id: RecordId,
    pub name: String,
    #[serde(default)]
    pub order: i32,
}

/// Fields changed by a specification category update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct SpecificationCategoryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

impl Resource for SpecificationCategory {
    type Draft = SpecificationCategoryDraft;
    type Patch = SpecificationCategoryPatch;

    const KIND: ResourceKind = ResourceKind::SpecificationCategory;

    fn id(&self) -> RecordId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_draft(id: RecordId, draft: Self::Draft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            company_id: draft.company_id,
            name: draft.name.trim().to_owned(),
            order: draft.order,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: &Self::Patch, now: DateTime<Utc>) {
        apply(&mut self.name, &patch.name);
        apply(&mut self.order, &patch.order);
        self.updated_at = now;
    }

    fn validate_draft(draft: &Self::Draft) -> AppResult<()> {
        require_text("name", &draft.name)
    }

    fn validate_patch(patch: &Self::Patch) -> AppResult<()> {
        require_patch_text("name", &patch.name)
    }

    fn display_order(&self) -> i32 {
        self.order
    }
}

/// Knowledge-base entry describing an insurer's product details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySpecification {
    /// Record id.
    pub id: RecordId,
    /// Owning company.
    pub company_id: RecordId,
    /// Category, `None` when uncategorized.
    pub category_id: Option<RecordId>,
    /// Entry title.
    pub title: String,
    /// HTML body.
    pub content: String,
    /// Display order inside the company.
    pub order: i32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct CompanySpecificationDraft {
    pub company_id: RecordId,
    #[serde(default)]
    pub category_id: Option<RecordId>,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub order: i32,
}

/// Fields changed by a specification update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct CompanySpecificationPatch {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub category_id: Option<Option<RecordId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

impl CompanySpecificationPatch {
    /// Patch that moves a specification out of its category.
    #[must_use]
    pub fn uncategorize() -> Self {
        Self {
            category_id: Some(None),
            ..Self::default()
        }
    }
}

impl Resource for CompanySpecification {
    type Draft = CompanySpecificationDraft;
    type Patch = CompanySpecificationPatch;

    const KIND: ResourceKind = ResourceKind::CompanySpecification;

    fn id(&self) -> RecordId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_draft(id: RecordId, draft: Self::Draft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            company_id: draft.company_id,
            category_id: draft.category_id,
            title: draft.title.trim().to_owned(),
            content: draft.content,
            order: draft.order,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: &Self::Patch, now: DateTime<Utc>) {
        apply_nullable(&mut self.category_id, &patch.category_id);
        apply(&mut self.title, &patch.title);
        apply(&mut self.content, &patch.content);
        apply(&mut self.order, &patch.order);
        self.updated_at = now;
    }

    fn validate_draft(draft: &Self::Draft) -> AppResult<()> {
        require_text("title", &draft.title)
    }

    fn validate_patch(patch: &Self::Patch) -> AppResult<()> {
        require_patch_text("title", &patch.title)
    }

    fn display_order(&self) -> i32 {
        self.order
    }
}

#[cfg(test)]
mod tests {
    use brokerdesk_core::RecordId;
    use chrono::Utc;

    use super::{CompanySpecification, CompanySpecificationDraft, CompanySpecificationPatch};
    use crate::{Resource, sort_records};

    fn specification(order: i32, category_id: Option<RecordId>) -> CompanySpecification {
        CompanySpecification::from_draft(
            RecordId::new(),
            CompanySpecificationDraft {
                company_id: RecordId::new(),
                category_id,
                title: format!("Ficha {order}"),
                content: "<p>Coberturas</p>".to_owned(),
                order,
            },
            Utc::now(),
        )
    }

    #[test]
    fn uncategorize_patch_clears_category_and_keeps_content() {
        let mut value = specification(1, Some(RecordId::new()));
        value.apply_patch(&CompanySpecificationPatch::uncategorize(), Utc::now());

        assert_eq!(value.category_id, None);
        assert_eq!(value.content, "<p>Coberturas</p>");
    }

    #[test]
    fn specifications_sort_by_order() {
        let mut values = vec![specification(3, None), specification(1, None)];
        sort_records(&mut values);
        assert_eq!(values[0].order, 1);
    }
}
