use std::sync::Arc;

use brokerdesk_application::{
    BrokerageConfigService, CascadeService, CategoryService, ContactService, DepartmentService,
    NewsService, NotificationService, PermissionService, ResourceService, SpecificationService,
    UploadService, UserService,
};
use brokerdesk_core::UserIdentity;
use brokerdesk_domain::{Company, Delegation, Product, SystemAlert};
use brokerdesk_infrastructure::{BroadcastChangeFeed, LocalStorage};
use sqlx::PgPool;

/// Which data the workspace serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceMode {
    /// PostgreSQL-backed tenant data.
    Live,
    /// Seeded local blob, never synchronised with live data.
    Demo,
}

impl WorkspaceMode {
    /// Session key holding the identity of this tree, so a demo session
    /// never authenticates live routes.
    pub fn session_key(self) -> &'static str {
        match self {
            Self::Live => "user_identity",
            Self::Demo => "demo_identity",
        }
    }
}

/// Services of one route tree.
#[derive(Clone)]
pub struct Workspace {
    pub mode: WorkspaceMode,
    pub permissions: PermissionService,
    pub users: UserService,
    pub delegations: ResourceService<Delegation>,
    pub companies: ResourceService<Company>,
    pub specifications: SpecificationService,
    pub categories: CategoryService,
    pub products: ResourceService<Product>,
    pub departments: DepartmentService,
    pub news: NewsService,
    pub notifications: NotificationService,
    pub system_alerts: ResourceService<SystemAlert>,
    pub settings: BrokerageConfigService,
    pub uploads: UploadService,
    /// Deletes that clear or remove dependent records.
    pub cascade: CascadeService,
    pub changes: BroadcastChangeFeed,
    /// Demo blob and the identity a demo session signs in as.
    pub demo: Option<DemoWorkspace>,
}

/// Demo-only parts of a workspace.
#[derive(Clone)]
pub struct DemoWorkspace {
    pub storage: Arc<LocalStorage>,
    pub identity: UserIdentity,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub live: Workspace,
    pub demo: Workspace,
    pub contact: ContactService,
    pub postgres_pool: Option<PgPool>,
    pub frontend_url: String,
}
