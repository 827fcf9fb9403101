use std::collections::{BTreeMap, BTreeSet};

use brokerdesk_core::patch::{apply, apply_nullable, double_option};
use brokerdesk_core::{AppError, AppResult, RecordId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resource::{require_patch_text, require_text, trim_optional};
use crate::{Resource, ResourceKind};

/// Node of the product category tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCategory {
    /// Record id.
    pub id: RecordId,
    /// Category name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Parent category, `None` for roots.
    pub parent_id: Option<RecordId>,
    /// Depth in the tree, 1 for roots.
    pub level: i32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

fn root_level() -> i32 {
    1
}

/// Fields supplied when creating a product category.
///
/// `level` is recomputed from the parent before the draft is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct ProductCategoryDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_id: Option<RecordId>,
    #[serde(default = "root_level")]
    pub level: i32,
}

/// Fields changed by a product category update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct ProductCategoryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub description: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub parent_id: Option<Option<RecordId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<i32>,
}

impl Resource for ProductCategory {
    type Draft = ProductCategoryDraft;
    type Patch = ProductCategoryPatch;

    const KIND: ResourceKind = ResourceKind::ProductCategory;

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
            description: trim_optional(draft.description),
            parent_id: draft.parent_id,
            level: draft.level.max(1),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: &Self::Patch, now: DateTime<Utc>) {
        apply(&mut self.name, &patch.name);
        apply_nullable(&mut self.description, &patch.description);
        apply_nullable(&mut self.parent_id, &patch.parent_id);
        apply(&mut self.level, &patch.level);
        self.updated_at = now;
    }

    fn validate_draft(draft: &Self::Draft) -> AppResult<()> {
        require_text("name", &draft.name)
    }

    fn validate_patch(patch: &Self::Patch) -> AppResult<()> {
        require_patch_text("name", &patch.name)
    }

    fn display_order(&self) -> i32 {
        self.level
    }
}

/// Read-only view over a set of categories answering tree questions.
#[derive(Debug, Clone)]
pub struct CategoryHierarchy {
    parents: BTreeMap<RecordId, Option<RecordId>>,
}

impl CategoryHierarchy {
    /// Indexes the given categories.
    #[must_use]
    pub fn new(categories: &[ProductCategory]) -> Self {
        Self {
            parents: categories
                .iter()
                .map(|category| (category.id, category.parent_id))
                .collect(),
        }
    }

    /// Returns whether the category is known.
    #[must_use]
    pub fn contains(&self, id: RecordId) -> bool {
        self.parents.contains_key(&id)
    }

    /// Returns the ancestors of a category, nearest first.
    ///
    /// Stops when a stored cycle is detected.
    #[must_use]
    pub fn ancestors(&self, id: RecordId) -> Vec<RecordId> {
        let mut chain = Vec::new();
        let mut seen = BTreeSet::from([id]);
        let mut current = self.parents.get(&id).copied().flatten();

        while let Some(parent) = current {
            if !seen.insert(parent) {
                break;
            }
            chain.push(parent);
            current = self.parents.get(&parent).copied().flatten();
        }

        chain
    }

    /// Returns every category below the given one.
    #[must_use]
    pub fn descendants(&self, id: RecordId) -> BTreeSet<RecordId> {
        self.parents
            .keys()
            .copied()
            .filter(|candidate| *candidate != id && self.ancestors(*candidate).contains(&id))
            .collect()
    }

    /// Returns the level a category gets under the given parent.
    pub fn level_under(&self, parent_id: Option<RecordId>) -> AppResult<i32> {
        match parent_id {
            None => Ok(1),
            Some(parent_id) if self.contains(parent_id) => {
                let depth = self.ancestors(parent_id).len() + 2;
                i32::try_from(depth).map_err(|_| {
                    AppError::Validation("category tree is too deep".to_owned())
                })
            }
            Some(parent_id) => Err(AppError::NotFound(format!(
                "parent category '{parent_id}' does not exist"
            ))),
        }
    }

    /// Rejects a parent that is the category itself or one of its descendants.
    pub fn validate_parent(&self, id: RecordId, parent_id: Option<RecordId>) -> AppResult<()> {
        let Some(parent_id) = parent_id else {
            return Ok(());
        };

        if parent_id == id {
            return Err(AppError::Validation(
                "a category cannot be its own parent".to_owned(),
            ));
        }

        if self.descendants(id).contains(&parent_id) {
            return Err(AppError::Validation(
                "a category cannot be moved below one of its descendants".to_owned(),
            ));
        }

        if !self.contains(parent_id) {
            return Err(AppError::NotFound(format!(
                "parent category '{parent_id}' does not exist"
            )));
        }

        Ok(())
    }

    /// Returns the ids offered in the parent selector when editing `editing`.
    ///
    /// New categories (`None`) may pick any existing category.
    #[must_use]
    pub fn selectable_parents(&self, editing: Option<RecordId>) -> BTreeSet<RecordId> {
        let excluded = editing
            .map(|id| {
                let mut excluded = self.descendants(id);
                excluded.insert(id);
                excluded
            })
            .unwrap_or_default();

        self.parents
            .keys()
            .copied()
            .filter(|id| !excluded.contains(id))
            .collect()
    }

    /// Returns the level every indexed category should have.
    #[must_use]
    pub fn expected_levels(&self) -> BTreeMap<RecordId, i32> {
        self.parents
            .keys()
            .map(|id| {
                let depth = i32::try_from(self.ancestors(*id).len() + 1).unwrap_or(i32::MAX);
                (*id, depth)
            })
            .collect()
    }
}

/// File attached to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDocument {
    /// Original file name.
    pub name: String,
    /// Public URL.
    pub url: String,
    /// MIME type.
    #[serde(rename = "type")]
    pub content_type: String,
    /// Size in bytes.
    pub size: i64,
}

/// Insurance product in the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Record id.
    pub id: RecordId,
    /// Product title.
    pub title: String,
    /// How to place the product (rich text).
    pub process: String,
    /// Selling points (rich text).
    pub strengths: String,
    /// Remarks (rich text).
    pub observations: String,
    /// Optional category.
    pub category_id: Option<RecordId>,
    /// Optional insurer.
    pub company_id: Option<RecordId>,
    /// Attached documents.
    #[serde(default)]
    pub documents: Vec<ProductDocument>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)]
pub struct ProductDraft {
    pub title: String,
    pub process: String,
    pub strengths: String,
    pub observations: String,
    pub category_id: Option<RecordId>,
    pub company_id: Option<RecordId>,
    pub documents: Vec<ProductDocument>,
}

/// Fields changed by a product update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strengths: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub category_id: Option<Option<RecordId>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub company_id: Option<Option<RecordId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<ProductDocument>>,
}

impl Resource for Product {
    type Draft = ProductDraft;
    type Patch = ProductPatch;

    const KIND: ResourceKind = ResourceKind::Product;

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
            process: draft.process,
            strengths: draft.strengths,
            observations: draft.observations,
            category_id: draft.category_id,
            company_id: draft.company_id,
            documents: draft.documents,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: &Self::Patch, now: DateTime<Utc>) {
        apply(&mut self.title, &patch.title);
        apply(&mut self.process, &patch.process);
        apply(&mut self.strengths, &patch.strengths);
        apply(&mut self.observations, &patch.observations);
        apply_nullable(&mut self.category_id, &patch.category_id);
        apply_nullable(&mut self.company_id, &patch.company_id);
        apply(&mut self.documents, &patch.documents);
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
    use proptest::prelude::*;

    use super::{CategoryHierarchy, ProductCategory, ProductCategoryDraft};
    use crate::Resource;

    fn category(parent_id: Option<RecordId>, level: i32) -> ProductCategory {
        ProductCategory::from_draft(
            RecordId::new(),
            ProductCategoryDraft {
                name: "Categoría".to_owned(),
                description: None,
                parent_id,
                level,
            },
            Utc::now(),
        )
    }

    /// Builds a forest where node `i` points at an earlier node or is a root.
    fn forest(parent_choices: &[Option<usize>]) -> Vec<ProductCategory> {
        let mut categories: Vec<ProductCategory> = Vec::new();
        for choice in parent_choices {
            let parent = choice
                .and_then(|index| categories.get(index % categories.len().max(1)))
                .map(|parent| (parent.id, parent.level));
            let value = match parent {
                Some((parent_id, parent_level)) => category(Some(parent_id), parent_level + 1),
                None => category(None, 1),
            };
            categories.push(value);
        }
        categories
    }

    proptest! {
        #[test]
        fn level_is_parent_level_plus_one(
            choices in proptest::collection::vec(proptest::option::of(0usize..16), 1..16)
        ) {
            let categories = forest(&choices);
            let hierarchy = CategoryHierarchy::new(&categories);
            let levels = hierarchy.expected_levels();

            for category in &categories {
                let expected = match category.parent_id {
                    Some(parent_id) => levels.get(&parent_id).copied().unwrap_or(0) + 1,
                    None => 1,
                };
                prop_assert_eq!(levels.get(&category.id).copied(), Some(expected));
                prop_assert_eq!(category.level, expected);
                prop_assert_eq!(hierarchy.level_under(category.parent_id).ok(), Some(expected));
            }
        }

        #[test]
        fn no_category_may_pick_itself_or_a_descendant(
            choices in proptest::collection::vec(proptest::option::of(0usize..16), 1..16)
        ) {
            let categories = forest(&choices);
            let hierarchy = CategoryHierarchy::new(&categories);

            for category in &categories {
                let selectable = hierarchy.selectable_parents(Some(category.id));
                prop_assert!(!selectable.contains(&category.id));
                for descendant in hierarchy.descendants(category.id) {
                    prop_assert!(!selectable.contains(&descendant));
                    prop_assert!(hierarchy.validate_parent(category.id, Some(descendant)).is_err());
                }
                prop_assert!(hierarchy.validate_parent(category.id, Some(category.id)).is_err());
            }
        }
    }

    #[test]
    fn ancestor_remains_selectable_for_child() {
        let root = category(None, 1);
        let child = category(Some(root.id), 2);
        let grandchild = category(Some(child.id), 3);
        let hierarchy = CategoryHierarchy::new(&[root.clone(), child.clone(), grandchild.clone()]);

        let for_child = hierarchy.selectable_parents(Some(child.id));
        assert!(for_child.contains(&root.id));
        assert!(!for_child.contains(&grandchild.id));

        let for_root = hierarchy.selectable_parents(Some(root.id));
        assert!(for_root.is_empty());
        assert_eq!(hierarchy.selectable_parents(None).len(), 3);
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let root = category(None, 1);
        let hierarchy = CategoryHierarchy::new(std::slice::from_ref(&root));
        assert!(hierarchy.level_under(Some(RecordId::new())).is_err());
        assert!(
            hierarchy
                .validate_parent(root.id, Some(RecordId::new()))
                .is_err()
        );
    }
}
