use std::fmt::Debug;
use std::str::FromStr;

use brokerdesk_core::{AppError, AppResult, RecordId};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::Section;

/// Every kind of record managed through a data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Application users (profiles).
    User,
    /// Branch offices.
    Delegation,
    /// Insurers.
    Company,
    /// Grouping of company specifications.
    SpecificationCategory,
    /// Knowledge-base entries of a company.
    CompanySpecification,
    /// Hierarchical product categories.
    ProductCategory,
    /// Insurance products.
    Product,
    /// Internal departments.
    Department,
    /// Posts published by a department.
    DepartmentContent,
    /// News articles.
    News,
    /// Per-user notifications.
    Notification,
    /// Tenant-wide banners.
    SystemAlert,
}

struct KindLabels {
    collection: &'static str,
    article: &'static str,
    singular: &'static str,
    plural: &'static str,
}

impl ResourceKind {
    /// Returns all kinds.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[ResourceKind] = &[
            ResourceKind::User,
            ResourceKind::Delegation,
            ResourceKind::Company,
            ResourceKind::SpecificationCategory,
            ResourceKind::CompanySpecification,
            ResourceKind::ProductCategory,
            ResourceKind::Product,
            ResourceKind::Department,
            ResourceKind::DepartmentContent,
            ResourceKind::News,
            ResourceKind::Notification,
            ResourceKind::SystemAlert,
        ];

        ALL
    }

    fn labels(self) -> KindLabels {
        let (collection, article, singular, plural) = match self {
            Self::User => ("users", "el", "usuario", "usuarios"),
            Self::Delegation => ("delegations", "la", "delegación", "delegaciones"),
            Self::Company => ("companies", "la", "compañía", "compañías"),
            Self::SpecificationCategory => (
                "specification_categories",
                "la",
                "categoría de especificaciones",
                "categorías de especificaciones",
            ),
            Self::CompanySpecification => (
                "company_specifications",
                "la",
                "especificación",
                "especificaciones",
            ),
            Self::ProductCategory => ("product_categories", "la", "categoría", "categorías"),
            Self::Product => ("products", "el", "producto", "productos"),
            Self::Department => ("departments", "el", "departamento", "departamentos"),
            Self::DepartmentContent => ("department_contents", "el", "contenido", "contenidos"),
            Self::News => ("news", "la", "noticia", "noticias"),
            Self::Notification => ("notifications", "la", "notificación", "notificaciones"),
            Self::SystemAlert => ("system_alerts", "la", "alerta", "alertas"),
        };

        KindLabels {
            collection,
            article,
            singular,
            plural,
        }
    }

    /// Returns the stable storage collection (table or blob key) name.
    #[must_use]
    pub fn collection(self) -> &'static str {
        self.labels().collection
    }

    /// Returns the built-in singular display name.
    #[must_use]
    pub fn default_singular(self) -> &'static str {
        self.labels().singular
    }

    /// Returns the built-in plural display name.
    #[must_use]
    pub fn default_plural(self) -> &'static str {
        self.labels().plural
    }

    /// Returns the definite article used with the singular name.
    #[must_use]
    pub fn article(self) -> &'static str {
        self.labels().article
    }

    /// Returns the permission section guarding this kind.
    #[must_use]
    pub fn section(self) -> Section {
        match self {
            Self::User => Section::Users,
            Self::Delegation => Section::Delegations,
            Self::Company | Self::SpecificationCategory | Self::CompanySpecification => {
                Section::Companies
            }
            Self::ProductCategory => Section::Categories,
            Self::Product => Section::Products,
            Self::Department | Self::DepartmentContent => Section::Departments,
            Self::News => Section::News,
            Self::Notification => Section::Dashboard,
            Self::SystemAlert => Section::Settings,
        }
    }
}

impl FromStr for ResourceKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().replace('-', "_");
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.collection() == normalized)
            .ok_or_else(|| AppError::Validation(format!("unknown resource kind '{value}'")))
    }
}

/// A record type managed through a generic data source.
///
/// `Draft` carries the caller-supplied fields of a create, `Patch` the
/// optional fields of an update.
pub trait Resource:
    Clone + Debug + PartialEq + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Fields supplied on create.
    type Draft: Clone + Debug + PartialEq + Send + Sync + Serialize + DeserializeOwned + 'static;
    /// Optional fields supplied on update.
    type Patch: Clone
        + Debug
        + Default
        + PartialEq
        + Send
        + Sync
        + Serialize
        + DeserializeOwned
        + 'static;

    /// Kind tag of this record type.
    const KIND: ResourceKind;

    /// Returns the record id.
    fn id(&self) -> RecordId;

    /// Returns the creation timestamp.
    fn created_at(&self) -> DateTime<Utc>;

    /// Builds a record from a draft with the given identity and timestamp.
    fn from_draft(id: RecordId, draft: Self::Draft, now: DateTime<Utc>) -> Self;

    /// Applies an update in place.
    fn apply_patch(&mut self, patch: &Self::Patch, now: DateTime<Utc>);

    /// Checks required fields of a draft.
    fn validate_draft(draft: &Self::Draft) -> AppResult<()>;

    /// Checks the fields a patch sets.
    fn validate_patch(_patch: &Self::Patch) -> AppResult<()> {
        Ok(())
    }

    /// Explicit display order, for kinds that have one.
    fn display_order(&self) -> i32 {
        0
    }
}

/// Sorts records by display order, then creation time.
pub fn sort_records<T: Resource>(records: &mut [T]) {
    records.sort_by(|left, right| {
        left.display_order()
            .cmp(&right.display_order())
            .then_with(|| left.created_at().cmp(&right.created_at()))
            .then_with(|| left.id().cmp(&right.id()))
    });
}

pub(crate) fn require_text(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }

    Ok(())
}

pub(crate) fn require_patch_text(field: &str, value: &Option<String>) -> AppResult<()> {
    match value {
        Some(value) => require_text(field, value),
        None => Ok(()),
    }
}

pub(crate) fn trim_optional(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim().to_owned();
        (!trimmed.is_empty()).then_some(trimmed)
    })
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::ResourceKind;
    use crate::Section;

    #[test]
    fn kind_parses_from_collection_or_route_segment() {
        assert_eq!(
            ResourceKind::from_str("product-categories").ok(),
            Some(ResourceKind::ProductCategory)
        );
        assert_eq!(ResourceKind::from_str("news").ok(), Some(ResourceKind::News));
        assert!(ResourceKind::from_str("invoices").is_err());
    }

    #[test]
    fn specification_kinds_are_guarded_by_companies_section() {
        assert_eq!(
            ResourceKind::CompanySpecification.section(),
            Section::Companies
        );
        assert_eq!(
            ResourceKind::SpecificationCategory.section(),
            Section::Companies
        );
    }
}
