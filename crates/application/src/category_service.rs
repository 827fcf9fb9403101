use std::collections::BTreeSet;

use brokerdesk_core::{AppResult, RecordId, TenantId, UserIdentity};
use brokerdesk_domain::{
    Capability, CategoryHierarchy, ProductCategory, ProductCategoryDraft, ProductCategoryPatch,
};

use crate::ResourceService;

/// Product category tree maintenance.
///
/// Levels are always derived from the parent chain; callers never set them.
#[derive(Clone)]
pub struct CategoryService {
    categories: ResourceService<ProductCategory>,
}

impl CategoryService {
    /// Creates the service.
    #[must_use]
    pub fn new(categories: ResourceService<ProductCategory>) -> Self {
        Self { categories }
    }

    /// Lists categories, roots first.
    pub async fn list(&self, actor: &UserIdentity) -> AppResult<Vec<ProductCategory>> {
        self.categories.list(actor).await
    }

    /// Returns one category.
    pub async fn find(&self, actor: &UserIdentity, id: RecordId) -> AppResult<ProductCategory> {
        self.categories.find(actor, id).await
    }

    /// Creates a category at the level implied by its parent.
    pub async fn create(
        &self,
        actor: &UserIdentity,
        mut draft: ProductCategoryDraft,
    ) -> AppResult<ProductCategory> {
        self.categories.require(actor, Capability::Create).await?;
        let hierarchy = self.hierarchy(actor.tenant_id()).await?;
        draft.level = hierarchy.level_under(draft.parent_id)?;

        self.categories.create(actor, draft).await
    }

    /// Updates a category, re-levelling its subtree after a move.
    pub async fn update(
        &self,
        actor: &UserIdentity,
        id: RecordId,
        mut patch: ProductCategoryPatch,
    ) -> AppResult<ProductCategory> {
        self.categories.require(actor, Capability::Edit).await?;
        let hierarchy = self.hierarchy(actor.tenant_id()).await?;
        self.categories.find_unchecked(actor.tenant_id(), id).await?;

        patch.level = match patch.parent_id {
            Some(parent_id) => {
                hierarchy.validate_parent(id, parent_id)?;
                Some(hierarchy.level_under(parent_id)?)
            }
            None => None,
        };
        let moved = patch.parent_id.is_some();

        let updated = self.categories.update(actor, id, patch).await?;
        if moved {
            self.relevel(actor.tenant_id()).await?;
        }

        Ok(updated)
    }

    /// Deletes a category. Its children move up to its parent.
    pub async fn delete(&self, actor: &UserIdentity, id: RecordId) -> AppResult<()> {
        self.categories.require(actor, Capability::Delete).await?;
        let tenant_id = actor.tenant_id();
        let deleted = self.categories.find_unchecked(tenant_id, id).await?;

        let children: Vec<RecordId> = self
            .categories
            .list_unchecked(tenant_id)
            .await?
            .into_iter()
            .filter(|category| category.parent_id == Some(id))
            .map(|category| category.id)
            .collect();
        for child in children {
            self.categories
                .update_unchecked(
                    tenant_id,
                    child,
                    ProductCategoryPatch {
                        parent_id: Some(deleted.parent_id),
                        ..ProductCategoryPatch::default()
                    },
                )
                .await?;
        }

        self.categories.delete(actor, id).await?;
        self.relevel(tenant_id).await
    }

    /// Returns the categories that may become the parent of `editing`.
    ///
    /// Excludes the category itself and every descendant.
    pub async fn selectable_parents(
        &self,
        actor: &UserIdentity,
        editing: Option<RecordId>,
    ) -> AppResult<Vec<ProductCategory>> {
        let categories = self.categories.list(actor).await?;
        let allowed: BTreeSet<RecordId> =
            CategoryHierarchy::new(&categories).selectable_parents(editing);

        Ok(categories
            .into_iter()
            .filter(|category| allowed.contains(&category.id))
            .collect())
    }

    async fn hierarchy(&self, tenant_id: TenantId) -> AppResult<CategoryHierarchy> {
        let categories = self.categories.list_unchecked(tenant_id).await?;
        Ok(CategoryHierarchy::new(&categories))
    }

    async fn relevel(&self, tenant_id: TenantId) -> AppResult<()> {
        let categories = self.categories.list_unchecked(tenant_id).await?;
        let expected = CategoryHierarchy::new(&categories).expected_levels();

        for category in categories {
            let Some(level) = expected.get(&category.id).copied() else {
                continue;
            };
            if level == category.level {
                continue;
            }

            tracing::debug!(id = %category.id, from = category.level, to = level, "relevelling category");
            self.categories
                .update_unchecked(
                    tenant_id,
                    category.id,
                    ProductCategoryPatch {
                        level: Some(level),
                        ..ProductCategoryPatch::default()
                    },
                )
                .await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
