use brokerdesk_core::{AppResult, RecordId, UserIdentity};
use brokerdesk_domain::{
    Capability, CompanySpecification, CompanySpecificationDraft, CompanySpecificationPatch,
    SpecificationCategory, SpecificationCategoryDraft, SpecificationCategoryPatch,
};

use crate::ResourceService;

/// Specifications of one company and their categories.
#[derive(Clone)]
pub struct SpecificationService {
    specifications: ResourceService<CompanySpecification>,
    categories: ResourceService<SpecificationCategory>,
}

impl SpecificationService {
    /// Creates the service.
    #[must_use]
    pub fn new(
        specifications: ResourceService<CompanySpecification>,
        categories: ResourceService<SpecificationCategory>,
    ) -> Self {
        Self {
            specifications,
            categories,
        }
    }

    /// Lists the specifications of a company, ordered.
    pub async fn list_specifications(
        &self,
        actor: &UserIdentity,
        company_id: RecordId,
    ) -> AppResult<Vec<CompanySpecification>> {
        Ok(self
            .specifications
            .list(actor)
            .await?
            .into_iter()
            .filter(|specification| specification.company_id == company_id)
            .collect())
    }

    /// Lists the specification categories of a company, ordered.
    pub async fn list_categories(
        &self,
        actor: &UserIdentity,
        company_id: RecordId,
    ) -> AppResult<Vec<SpecificationCategory>> {
        Ok(self
            .categories
            .list(actor)
            .await?
            .into_iter()
            .filter(|category| category.company_id == company_id)
            .collect())
    }

    /// Creates a specification for the company.
    pub async fn create_specification(
        &self,
        actor: &UserIdentity,
        company_id: RecordId,
        mut draft: CompanySpecificationDraft,
    ) -> AppResult<CompanySpecification> {
        draft.company_id = company_id;
        if let Some(category_id) = draft.category_id {
            self.category_of(actor, company_id, category_id).await?;
        }
        self.specifications.create(actor, draft).await
    }

    /// Updates a specification of the company.
    pub async fn update_specification(
        &self,
        actor: &UserIdentity,
        company_id: RecordId,
        id: RecordId,
        patch: CompanySpecificationPatch,
    ) -> AppResult<CompanySpecification> {
        self.specification_of(actor, company_id, id).await?;
        if let Some(Some(category_id)) = patch.category_id {
            self.category_of(actor, company_id, category_id).await?;
        }
        self.specifications.update(actor, id, patch).await
    }

    /// Deletes a specification of the company.
    pub async fn delete_specification(
        &self,
        actor: &UserIdentity,
        company_id: RecordId,
        id: RecordId,
    ) -> AppResult<()> {
        self.specification_of(actor, company_id, id).await?;
        self.specifications.delete(actor, id).await
    }

    /// Creates a specification category for the company.
    pub async fn create_category(
        &self,
        actor: &UserIdentity,
        company_id: RecordId,
        mut draft: SpecificationCategoryDraft,
    ) -> AppResult<SpecificationCategory> {
        draft.company_id = company_id;
        self.categories.create(actor, draft).await
    }

    /// Updates a specification category of the company.
    pub async fn update_category(
        &self,
        actor: &UserIdentity,
        company_id: RecordId,
        id: RecordId,
        patch: SpecificationCategoryPatch,
    ) -> AppResult<SpecificationCategory> {
        self.category_of(actor, company_id, id).await?;
        self.categories.update(actor, id, patch).await
    }

    /// Deletes a category; its specifications become uncategorized.
    pub async fn delete_category(
        &self,
        actor: &UserIdentity,
        company_id: RecordId,
        id: RecordId,
    ) -> AppResult<()> {
        self.categories.require(actor, Capability::Delete).await?;
        self.category_of(actor, company_id, id).await?;

        let tenant_id = actor.tenant_id();
        let orphans: Vec<RecordId> = self
            .specifications
            .list_unchecked(tenant_id)
            .await?
            .into_iter()
            .filter(|specification| specification.category_id == Some(id))
            .map(|specification| specification.id)
            .collect();
        for specification_id in orphans {
            self.specifications
                .update_unchecked(
                    tenant_id,
                    specification_id,
                    CompanySpecificationPatch::uncategorize(),
                )
                .await?;
        }

        self.categories.delete(actor, id).await
    }

    async fn specification_of(
        &self,
        actor: &UserIdentity,
        company_id: RecordId,
        id: RecordId,
    ) -> AppResult<CompanySpecification> {
        let specification = self
            .specifications
            .find_unchecked(actor.tenant_id(), id)
            .await?;
        if specification.company_id != company_id {
            return Err(brokerdesk_core::AppError::NotFound(format!(
                "specification '{id}' does not belong to company '{company_id}'"
            )));
        }
        Ok(specification)
    }

    async fn category_of(
        &self,
        actor: &UserIdentity,
        company_id: RecordId,
        id: RecordId,
    ) -> AppResult<SpecificationCategory> {
        let category = self.categories.find_unchecked(actor.tenant_id(), id).await?;
        if category.company_id != company_id {
            return Err(brokerdesk_core::AppError::Validation(format!(
                "specification category '{id}' does not belong to company '{company_id}'"
            )));
        }
        Ok(category)
    }
}

#[cfg(test)]
mod tests;
