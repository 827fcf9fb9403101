use std::sync::Arc;

use brokerdesk_core::{AppResult, RecordId, TenantId, UserIdentity};
use brokerdesk_domain::{
    Company, CompanySpecification, Delegation, News, NewsPatch, Notification, Product,
    ProductPatch, SpecificationCategory,
};
use chrono::Utc;

use crate::{CategoryService, DataSource, ResourceService, UserDirectory, UserService};

/// Deletes records other records point at, then clears or removes the
/// dependents.
///
/// The rules mirror the foreign keys of the relational schema, so a data
/// source without them ends in the same state:
///
/// - a company takes its specifications and specification categories with
///   it, and products and news lose the link;
/// - a product category is unlinked from products and news;
/// - a product is unlinked from news;
/// - a delegation is unlinked from users;
/// - a user takes their notifications with them.
///
/// Dependents are cleaned only after the record itself is gone, so a
/// rejected delete leaves everything untouched.
#[derive(Clone)]
pub struct CascadeService {
    companies: ResourceService<Company>,
    delegations: ResourceService<Delegation>,
    products: ResourceService<Product>,
    categories: CategoryService,
    specifications: ResourceService<CompanySpecification>,
    specification_categories: ResourceService<SpecificationCategory>,
    news: ResourceService<News>,
    users: UserService,
    notifications: Arc<dyn DataSource<Notification>>,
    directory: Arc<dyn UserDirectory>,
}

/// Services whose records take part in cascading deletes.
pub struct CascadeParts {
    /// Companies.
    pub companies: ResourceService<Company>,
    /// Delegations.
    pub delegations: ResourceService<Delegation>,
    /// Products.
    pub products: ResourceService<Product>,
    /// Product category tree.
    pub categories: CategoryService,
    /// Company specifications.
    pub specifications: ResourceService<CompanySpecification>,
    /// Specification categories.
    pub specification_categories: ResourceService<SpecificationCategory>,
    /// News articles.
    pub news: ResourceService<News>,
    /// User management.
    pub users: UserService,
    /// Notification storage.
    pub notifications: Arc<dyn DataSource<Notification>>,
    /// User directory.
    pub directory: Arc<dyn UserDirectory>,
}

impl CascadeService {
    /// Creates the service.
    #[must_use]
    pub fn new(parts: CascadeParts) -> Self {
        Self {
            companies: parts.companies,
            delegations: parts.delegations,
            products: parts.products,
            categories: parts.categories,
            specifications: parts.specifications,
            specification_categories: parts.specification_categories,
            news: parts.news,
            users: parts.users,
            notifications: parts.notifications,
            directory: parts.directory,
        }
    }

    /// Deletes a company with its specifications and specification categories.
    pub async fn delete_company(&self, actor: &UserIdentity, id: RecordId) -> AppResult<()> {
        self.companies.delete(actor, id).await?;
        let tenant_id = actor.tenant_id();

        let specifications: Vec<RecordId> = self
            .specifications
            .list_unchecked(tenant_id)
            .await?
            .into_iter()
            .filter(|specification| specification.company_id == id)
            .map(|specification| specification.id)
            .collect();
        for specification_id in specifications {
            self.specifications
                .delete_unchecked(tenant_id, specification_id)
                .await?;
        }

        let categories: Vec<RecordId> = self
            .specification_categories
            .list_unchecked(tenant_id)
            .await?
            .into_iter()
            .filter(|category| category.company_id == id)
            .map(|category| category.id)
            .collect();
        for category_id in categories {
            self.specification_categories
                .delete_unchecked(tenant_id, category_id)
                .await?;
        }

        self.unlink_products(tenant_id, |product| {
            (product.company_id == Some(id)).then(|| ProductPatch {
                company_id: Some(None),
                ..ProductPatch::default()
            })
        })
        .await?;
        self.unlink_news(tenant_id, |news| {
            strip(&news.company_ids, id).map(|company_ids| NewsPatch {
                company_ids: Some(company_ids),
                ..NewsPatch::default()
            })
        })
        .await
    }

    /// Deletes a product category and unlinks it from products and news.
    pub async fn delete_product_category(
        &self,
        actor: &UserIdentity,
        id: RecordId,
    ) -> AppResult<()> {
        self.categories.delete(actor, id).await?;
        let tenant_id = actor.tenant_id();

        self.unlink_products(tenant_id, |product| {
            (product.category_id == Some(id)).then(|| ProductPatch {
                category_id: Some(None),
                ..ProductPatch::default()
            })
        })
        .await?;
        self.unlink_news(tenant_id, |news| {
            strip(&news.category_ids, id).map(|category_ids| NewsPatch {
                category_ids: Some(category_ids),
                ..NewsPatch::default()
            })
        })
        .await
    }

    /// Deletes a product and unlinks it from news.
    pub async fn delete_product(&self, actor: &UserIdentity, id: RecordId) -> AppResult<()> {
        self.products.delete(actor, id).await?;
        self.unlink_news(actor.tenant_id(), |news| {
            strip(&news.product_ids, id).map(|product_ids| NewsPatch {
                product_ids: Some(product_ids),
                ..NewsPatch::default()
            })
        })
        .await
    }

    /// Deletes a delegation and clears it from its users.
    pub async fn delete_delegation(&self, actor: &UserIdentity, id: RecordId) -> AppResult<()> {
        self.delegations.delete(actor, id).await?;
        let tenant_id = actor.tenant_id();

        for mut profile in self.directory.list_profiles(tenant_id).await? {
            if profile.delegation_id != Some(id) {
                continue;
            }
            profile.delegation_id = None;
            profile.updated_at = Utc::now();
            tracing::debug!(user_id = %profile.id, delegation_id = %id, "clearing user delegation");
            self.directory.save_profile(tenant_id, &profile).await?;
        }
        Ok(())
    }

    /// Deletes a user together with their notifications.
    pub async fn delete_user(&self, actor: &UserIdentity, id: RecordId) -> AppResult<()> {
        self.users.delete(actor, id).await?;
        let tenant_id = actor.tenant_id();

        let notifications: Vec<RecordId> = self
            .notifications
            .list(tenant_id)
            .await?
            .into_iter()
            .filter(|notification| notification.user_id == id)
            .map(|notification| notification.id)
            .collect();
        for notification_id in notifications {
            self.notifications.delete(tenant_id, notification_id).await?;
        }
        Ok(())
    }

    async fn unlink_products(
        &self,
        tenant_id: TenantId,
        patch_for: impl Fn(&Product) -> Option<ProductPatch>,
    ) -> AppResult<()> {
        for product in self.products.list_unchecked(tenant_id).await? {
            if let Some(patch) = patch_for(&product) {
                self.products
                    .update_unchecked(tenant_id, product.id, patch)
                    .await?;
            }
        }
        Ok(())
    }

    async fn unlink_news(
        &self,
        tenant_id: TenantId,
        patch_for: impl Fn(&News) -> Option<NewsPatch>,
    ) -> AppResult<()> {
        for news in self.news.list_unchecked(tenant_id).await? {
            if let Some(patch) = patch_for(&news) {
                self.news.update_unchecked(tenant_id, news.id, patch).await?;
            }
        }
        Ok(())
    }
}

/// Returns `ids` without `removed`, or `None` when it was not linked.
fn strip(ids: &[RecordId], removed: RecordId) -> Option<Vec<RecordId>> {
    ids.contains(&removed).then(|| {
        ids.iter()
            .copied()
            .filter(|id| *id != removed)
            .collect()
    })
}

#[cfg(test)]
mod tests;
