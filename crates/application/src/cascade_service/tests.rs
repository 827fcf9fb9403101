use std::sync::Arc;

use brokerdesk_core::{AppError, RecordId, TenantId, UserIdentity};
use brokerdesk_domain::{
    Company, CompanyDraft, CompanySpecification, CompanySpecificationDraft, Delegation,
    DelegationDraft, News, NewsDraft, Notification, NotificationDraft, Product, ProductCategory,
    ProductCategoryDraft, ProductDraft, Resource, Role, SpecificationCategory,
    SpecificationCategoryDraft,
};

use crate::test_support::{InMemorySource, PlainHasher, StubDirectory};
use crate::{
    CascadeParts, CascadeService, CategoryService, DataSource, DiscardChanges, PermissionService,
    ResourceService, UserDirectory, UserService,
};

struct Fixture {
    service: CascadeService,
    directory: StubDirectory,
    actor: UserIdentity,
    companies: Arc<InMemorySource<Company>>,
    delegations: Arc<InMemorySource<Delegation>>,
    products: Arc<InMemorySource<Product>>,
    categories: Arc<InMemorySource<ProductCategory>>,
    specifications: Arc<InMemorySource<CompanySpecification>>,
    specification_categories: Arc<InMemorySource<SpecificationCategory>>,
    news: Arc<InMemorySource<News>>,
    notifications: Arc<InMemorySource<Notification>>,
}

fn fixture(role: Role) -> Fixture {
    let directory = StubDirectory::with_role(role);
    let permissions = PermissionService::new(Arc::new(directory.clone()));

    let companies: Arc<InMemorySource<Company>> = Arc::new(InMemorySource::default());
    let delegations: Arc<InMemorySource<Delegation>> = Arc::new(InMemorySource::default());
    let products: Arc<InMemorySource<Product>> = Arc::new(InMemorySource::default());
    let categories: Arc<InMemorySource<ProductCategory>> = Arc::new(InMemorySource::default());
    let specifications: Arc<InMemorySource<CompanySpecification>> = Arc::new(InMemorySource::default());
    let specification_categories: Arc<InMemorySource<SpecificationCategory>> = Arc::new(InMemorySource::default());
    let news: Arc<InMemorySource<News>> = Arc::new(InMemorySource::default());
    let notifications: Arc<InMemorySource<Notification>> = Arc::new(InMemorySource::default());

    let service = CascadeService::new(CascadeParts {
        companies: ResourceService::new(
            companies.clone(),
            permissions.clone(),
            Arc::new(DiscardChanges),
        ),
        delegations: ResourceService::new(
            delegations.clone(),
            permissions.clone(),
            Arc::new(DiscardChanges),
        ),
        products: ResourceService::new(
            products.clone(),
            permissions.clone(),
            Arc::new(DiscardChanges),
        ),
        categories: CategoryService::new(ResourceService::new(
            categories.clone(),
            permissions.clone(),
            Arc::new(DiscardChanges),
        )),
        specifications: ResourceService::new(
            specifications.clone(),
            permissions.clone(),
            Arc::new(DiscardChanges),
        ),
        specification_categories: ResourceService::new(
            specification_categories.clone(),
            permissions.clone(),
            Arc::new(DiscardChanges),
        ),
        news: ResourceService::new(news.clone(), permissions.clone(), Arc::new(DiscardChanges)),
        users: UserService::new(
            Arc::new(directory.clone()),
            Arc::new(PlainHasher),
            permissions.clone(),
            Arc::new(DiscardChanges),
        ),
        notifications: notifications.clone(),
        directory: Arc::new(directory.clone()),
    });

    Fixture {
        service,
        actor: directory.identity(),
        directory,
        companies,
        delegations,
        products,
        categories,
        specifications,
        specification_categories,
        news,
        notifications,
    }
}

async fn create<T: Resource>(source: &InMemorySource<T>, draft: T::Draft) -> T {
    source
        .create(TenantId::new(), draft)
        .await
        .unwrap_or_else(|_| unreachable!())
}

fn linked_news(
    company_ids: Vec<RecordId>,
    category_ids: Vec<RecordId>,
    product_ids: Vec<RecordId>,
) -> NewsDraft {
    NewsDraft {
        title: "Nueva tarifa".to_owned(),
        company_ids,
        category_ids,
        product_ids,
        ..NewsDraft::default()
    }
}

#[tokio::test]
async fn deleting_a_company_removes_its_specifications_and_unlinks_products() {
    let fixture = fixture(Role::Admin);
    let company = create(
        &fixture.companies,
        CompanyDraft {
            name: "Mapfre".to_owned(),
            ..CompanyDraft::default()
        },
    )
    .await;
    let other = RecordId::new();

    let category = create(
        &fixture.specification_categories,
        SpecificationCategoryDraft {
            company_id: company.id,
            name: "Hogar".to_owned(),
            order: 0,
        },
    )
    .await;
    create(
        &fixture.specifications,
        CompanySpecificationDraft {
            company_id: company.id,
            category_id: Some(category.id),
            title: "Coberturas".to_owned(),
            content: String::new(),
            order: 0,
        },
    )
    .await;
    let kept = create(
        &fixture.specifications,
        CompanySpecificationDraft {
            company_id: other,
            category_id: None,
            title: "Otra ficha".to_owned(),
            content: String::new(),
            order: 0,
        },
    )
    .await;
    let product = create(
        &fixture.products,
        ProductDraft {
            title: "Hogar Esencial".to_owned(),
            company_id: Some(company.id),
            ..ProductDraft::default()
        },
    )
    .await;
    create(&fixture.news, linked_news(vec![company.id, other], Vec::new(), Vec::new())).await;

    let deleted = fixture.service.delete_company(&fixture.actor, company.id).await;
    assert!(deleted.is_ok());

    assert!(fixture.companies.snapshot().await.is_empty());
    assert!(fixture.specification_categories.snapshot().await.is_empty());
    let specifications = fixture.specifications.snapshot().await;
    assert_eq!(specifications.len(), 1);
    assert_eq!(specifications[0].id, kept.id);

    let products = fixture.products.snapshot().await;
    assert_eq!(products[0].id, product.id);
    assert_eq!(products[0].company_id, None);
    assert_eq!(fixture.news.snapshot().await[0].company_ids, vec![other]);
}

#[tokio::test]
async fn rejected_company_delete_leaves_dependents_untouched() {
    let fixture = fixture(Role::User);
    let company = create(
        &fixture.companies,
        CompanyDraft {
            name: "Allianz".to_owned(),
            ..CompanyDraft::default()
        },
    )
    .await;
    create(
        &fixture.products,
        ProductDraft {
            title: "Vida Riesgo".to_owned(),
            company_id: Some(company.id),
            ..ProductDraft::default()
        },
    )
    .await;

    let deleted = fixture.service.delete_company(&fixture.actor, company.id).await;
    assert!(matches!(deleted, Err(AppError::Forbidden(_))));
    assert_eq!(fixture.companies.snapshot().await.len(), 1);
    assert_eq!(
        fixture.products.snapshot().await[0].company_id,
        Some(company.id)
    );
}

#[tokio::test]
async fn deleting_a_product_category_unlinks_products_and_news() {
    let fixture = fixture(Role::Admin);
    let category = create(
        &fixture.categories,
        ProductCategoryDraft {
            name: "Particulares".to_owned(),
            description: None,
            parent_id: None,
            level: 0,
        },
    )
    .await;
    create(
        &fixture.products,
        ProductDraft {
            title: "Decesos".to_owned(),
            category_id: Some(category.id),
            ..ProductDraft::default()
        },
    )
    .await;
    create(&fixture.news, linked_news(Vec::new(), vec![category.id], Vec::new())).await;

    let deleted = fixture
        .service
        .delete_product_category(&fixture.actor, category.id)
        .await;
    assert!(deleted.is_ok());

    assert!(fixture.categories.snapshot().await.is_empty());
    assert_eq!(fixture.products.snapshot().await[0].category_id, None);
    assert!(fixture.news.snapshot().await[0].category_ids.is_empty());
}

#[tokio::test]
async fn deleting_a_product_unlinks_it_from_news() {
    let fixture = fixture(Role::Admin);
    let product = create(
        &fixture.products,
        ProductDraft {
            title: "RC Pyme".to_owned(),
            ..ProductDraft::default()
        },
    )
    .await;
    create(&fixture.news, linked_news(Vec::new(), Vec::new(), vec![product.id])).await;

    assert!(fixture.service.delete_product(&fixture.actor, product.id).await.is_ok());
    assert!(fixture.news.snapshot().await[0].product_ids.is_empty());
}

#[tokio::test]
async fn deleting_a_delegation_clears_it_from_users() {
    let fixture = fixture(Role::Admin);
    let delegation = create(
        &fixture.delegations,
        DelegationDraft {
            name: "Delegación Sur".to_owned(),
            ..DelegationDraft::default()
        },
    )
    .await;
    let mut member = fixture
        .directory
        .add_user("Luis", "luis@correduria.es", Role::User)
        .await;
    member.delegation_id = Some(delegation.id);
    let saved = fixture
        .directory
        .save_profile(fixture.actor.tenant_id(), &member)
        .await;
    assert!(saved.is_ok());

    let deleted = fixture
        .service
        .delete_delegation(&fixture.actor, delegation.id)
        .await;
    assert!(deleted.is_ok());

    let profiles = fixture.directory.profiles().await;
    assert!(profiles.iter().all(|profile| profile.delegation_id.is_none()));
}

#[tokio::test]
async fn deleting_a_user_removes_their_notifications() {
    let fixture = fixture(Role::Admin);
    let member = fixture
        .directory
        .add_user("Ana", "ana@correduria.es", Role::User)
        .await;
    let own = create(
        &fixture.notifications,
        NotificationDraft {
            user_id: member.id,
            title: "Nueva noticia".to_owned(),
            description: String::new(),
            url: None,
        },
    )
    .await;
    let actor_id = fixture.actor.record_id().unwrap_or_else(|_| unreachable!());
    create(
        &fixture.notifications,
        NotificationDraft {
            user_id: actor_id,
            title: "Nueva noticia".to_owned(),
            description: String::new(),
            url: None,
        },
    )
    .await;

    assert!(fixture.service.delete_user(&fixture.actor, member.id).await.is_ok());

    let remaining = fixture.notifications.snapshot().await;
    assert_eq!(remaining.len(), 1);
    assert_ne!(remaining[0].id, own.id);
    assert_eq!(remaining[0].user_id, actor_id);
}
