use std::sync::Arc;

use brokerdesk_application::{
    BrokerageConfigRepository, BrokerageConfigService, CascadeParts, CascadeService,
    CategoryService, ChangePublisher, DataSource, DepartmentService, NewsService,
    NotificationService, ObjectStorage, PasswordHasher, PermissionService, ResourceService,
    SpecificationService, UploadService, UserDirectory, UserService,
};
use brokerdesk_domain::{
    Company, CompanySpecification, Delegation, Department, DepartmentContent, News,
    Notification, Product, ProductCategory, Resource, SpecificationCategory, SystemAlert,
};
use brokerdesk_infrastructure::{
    BroadcastChangeFeed, LocalBrokerageConfigRepository, LocalDataSource, LocalStorage,
    LocalUserDirectory, PostgresBrokerageConfigRepository, PostgresDataSource,
    PostgresNewsDataSource, PostgresUserDirectory,
};
use sqlx::PgPool;

use crate::state::{DemoWorkspace, Workspace, WorkspaceMode};

/// Storage adapters of one workspace, one per record kind.
pub struct WorkspaceSources {
    pub delegations: Arc<dyn DataSource<Delegation>>,
    pub companies: Arc<dyn DataSource<Company>>,
    pub specification_categories: Arc<dyn DataSource<SpecificationCategory>>,
    pub specifications: Arc<dyn DataSource<CompanySpecification>>,
    pub product_categories: Arc<dyn DataSource<ProductCategory>>,
    pub products: Arc<dyn DataSource<Product>>,
    pub departments: Arc<dyn DataSource<Department>>,
    pub department_contents: Arc<dyn DataSource<DepartmentContent>>,
    pub news: Arc<dyn DataSource<News>>,
    pub notifications: Arc<dyn DataSource<Notification>>,
    pub system_alerts: Arc<dyn DataSource<SystemAlert>>,
    pub directory: Arc<dyn UserDirectory>,
    pub config: Arc<dyn BrokerageConfigRepository>,
}

impl WorkspaceSources {
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            delegations: Arc::new(PostgresDataSource::new(pool.clone())),
            companies: Arc::new(PostgresDataSource::new(pool.clone())),
            specification_categories: Arc::new(PostgresDataSource::new(pool.clone())),
            specifications: Arc::new(PostgresDataSource::new(pool.clone())),
            product_categories: Arc::new(PostgresDataSource::new(pool.clone())),
            products: Arc::new(PostgresDataSource::new(pool.clone())),
            departments: Arc::new(PostgresDataSource::new(pool.clone())),
            department_contents: Arc::new(PostgresDataSource::new(pool.clone())),
            news: Arc::new(PostgresNewsDataSource::new(pool.clone())),
            notifications: Arc::new(PostgresDataSource::new(pool.clone())),
            system_alerts: Arc::new(PostgresDataSource::new(pool.clone())),
            directory: Arc::new(PostgresUserDirectory::new(pool.clone())),
            config: Arc::new(PostgresBrokerageConfigRepository::new(pool.clone())),
        }
    }

    pub fn local(storage: &Arc<LocalStorage>) -> Self {
        Self {
            delegations: Arc::new(LocalDataSource::new(Arc::clone(storage))),
            companies: Arc::new(LocalDataSource::new(Arc::clone(storage))),
            specification_categories: Arc::new(LocalDataSource::new(Arc::clone(storage))),
            specifications: Arc::new(LocalDataSource::new(Arc::clone(storage))),
            product_categories: Arc::new(LocalDataSource::new(Arc::clone(storage))),
            products: Arc::new(LocalDataSource::new(Arc::clone(storage))),
            departments: Arc::new(LocalDataSource::new(Arc::clone(storage))),
            department_contents: Arc::new(LocalDataSource::new(Arc::clone(storage))),
            news: Arc::new(LocalDataSource::new(Arc::clone(storage))),
            notifications: Arc::new(LocalDataSource::new(Arc::clone(storage))),
            system_alerts: Arc::new(LocalDataSource::new(Arc::clone(storage))),
            directory: Arc::new(LocalUserDirectory::new(Arc::clone(storage))),
            config: Arc::new(LocalBrokerageConfigRepository::new(Arc::clone(storage))),
        }
    }
}

/// Wires the application services of one route tree.
pub fn build_workspace(
    mode: WorkspaceMode,
    sources: WorkspaceSources,
    object_storage: Arc<dyn ObjectStorage>,
    password_hasher: Arc<dyn PasswordHasher>,
    demo: Option<DemoWorkspace>,
) -> Workspace {
    let changes = BroadcastChangeFeed::default();
    let publisher: Arc<dyn ChangePublisher> = Arc::new(changes.clone());
    let permissions = PermissionService::new(Arc::clone(&sources.directory));
    let resources = Resources {
        permissions: &permissions,
        publisher: &publisher,
    };

    let users = UserService::new(
        Arc::clone(&sources.directory),
        password_hasher,
        permissions.clone(),
        Arc::clone(&publisher),
    );
    let delegations = resources.over(sources.delegations);
    let companies = resources.over(sources.companies);
    let specifications = resources.over(sources.specifications);
    let specification_categories = resources.over(sources.specification_categories);
    let categories = CategoryService::new(resources.over(sources.product_categories));
    let products = resources.over(sources.products);
    let news_resources = resources.over(sources.news);
    let notifications = NotificationService::new(
        Arc::clone(&sources.notifications),
        Arc::clone(&publisher),
    );

    let cascade = CascadeService::new(CascadeParts {
        companies: companies.clone(),
        delegations: delegations.clone(),
        products: products.clone(),
        categories: categories.clone(),
        specifications: specifications.clone(),
        specification_categories: specification_categories.clone(),
        news: news_resources.clone(),
        users: users.clone(),
        notifications: sources.notifications,
        directory: Arc::clone(&sources.directory),
    });

    Workspace {
        mode,
        delegations,
        companies,
        specifications: SpecificationService::new(specifications, specification_categories),
        categories,
        departments: DepartmentService::new(
            resources.over(sources.departments),
            resources.over(sources.department_contents),
        ),
        news: NewsService::new(
            news_resources.clone(),
            notifications.clone(),
            Arc::clone(&sources.directory),
        ),
        system_alerts: resources.over(sources.system_alerts),
        settings: BrokerageConfigService::new(sources.config, permissions.clone()),
        uploads: UploadService::new(object_storage, users.clone(), news_resources, products.clone()),
        cascade,
        products,
        notifications,
        users,
        permissions,
        changes,
        demo,
    }
}

/// Shared arguments of every CRUD service in a workspace.
struct Resources<'a> {
    permissions: &'a PermissionService,
    publisher: &'a Arc<dyn ChangePublisher>,
}

impl Resources<'_> {
    fn over<T: Resource>(&self, source: Arc<dyn DataSource<T>>) -> ResourceService<T> {
        ResourceService::new(source, self.permissions.clone(), Arc::clone(self.publisher))
    }
}
