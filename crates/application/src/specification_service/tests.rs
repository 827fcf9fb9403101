use std::sync::Arc;

use brokerdesk_core::{AppError, RecordId};
use brokerdesk_domain::{
    CompanySpecification, CompanySpecificationDraft, CompanySpecificationPatch, Role,
    SpecificationCategory, SpecificationCategoryDraft,
};

use crate::test_support::{InMemorySource, StubDirectory};
use crate::{DiscardChanges, PermissionService, ResourceService, SpecificationService};

fn service(
    directory: &StubDirectory,
) -> (Arc<InMemorySource<CompanySpecification>>, SpecificationService) {
    let permissions = PermissionService::new(Arc::new(directory.clone()));
    let specifications = Arc::new(InMemorySource::default());
    let categories: Arc<InMemorySource<SpecificationCategory>> = Arc::new(InMemorySource::default());
    let service = SpecificationService::new(
        ResourceService::new(
            specifications.clone(),
            permissions.clone(),
            Arc::new(DiscardChanges),
        ),
        ResourceService::new(categories, permissions, Arc::new(DiscardChanges)),
    );
    (specifications, service)
}

fn specification(category_id: Option<RecordId>, title: &str, order: i32) -> CompanySpecificationDraft {
    CompanySpecificationDraft {
        company_id: RecordId::new(),
        category_id,
        title: title.to_owned(),
        content: "<p>Detalle</p>".to_owned(),
        order,
    }
}

#[tokio::test]
async fn deleting_a_category_uncategorizes_its_specifications() {
    let directory = StubDirectory::with_role(Role::Admin);
    let (specifications, service) = service(&directory);
    let actor = directory.identity();
    let company_id = RecordId::new();

    let category = service
        .create_category(
            &actor,
            company_id,
            SpecificationCategoryDraft {
                company_id,
                name: "Coberturas".to_owned(),
                order: 1,
            },
        )
        .await;
    assert!(category.is_ok());
    let category = category.unwrap_or_else(|_| unreachable!());

    for (title, order) in [("Incendio", 2), ("Robo", 1)] {
        let created = service
            .create_specification(&actor, company_id, specification(Some(category.id), title, order))
            .await;
        assert!(created.is_ok());
    }

    assert!(service
        .delete_category(&actor, company_id, category.id)
        .await
        .is_ok());

    let stored = specifications.snapshot().await;
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|specification| specification.category_id.is_none()));

    let listed = service.list_specifications(&actor, company_id).await;
    let titles: Vec<String> = listed
        .unwrap_or_default()
        .into_iter()
        .map(|specification| specification.title)
        .collect();
    assert_eq!(titles, vec!["Robo".to_owned(), "Incendio".to_owned()]);
}

#[tokio::test]
async fn specifications_are_scoped_to_their_company() {
    let directory = StubDirectory::with_role(Role::Admin);
    let (_, service) = service(&directory);
    let actor = directory.identity();
    let company_id = RecordId::new();

    let created = service
        .create_specification(&actor, company_id, specification(None, "Vida", 1))
        .await;
    let created = created.unwrap_or_else(|_| unreachable!());
    assert_eq!(created.company_id, company_id);

    let other_company = RecordId::new();
    let result = service
        .update_specification(
            &actor,
            other_company,
            created.id,
            CompanySpecificationPatch::default(),
        )
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let foreign_category = service
        .create_specification(
            &actor,
            company_id,
            specification(Some(RecordId::new()), "Decesos", 2),
        )
        .await;
    assert!(matches!(foreign_category, Err(AppError::NotFound(_))));
}
