//! Generic CRUD handlers shared by every flat collection route.

use async_trait::async_trait;
use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use brokerdesk_application::ResourceService;
use brokerdesk_core::{AppResult, RecordId, UserIdentity};
use brokerdesk_domain::{Company, Delegation, Department, Product, Resource, SystemAlert};

use crate::error::ApiResult;
use crate::state::Workspace;

/// Service calls behind the collection routes of one kind.
///
/// Kinds whose writes carry extra rules override the defaults.
#[async_trait]
pub trait ResourceEndpoint<T: Resource>: Send + Sync {
    fn resources(&self) -> &ResourceService<T>;

    async fn list(&self, actor: &UserIdentity) -> AppResult<Vec<T>> {
        self.resources().list(actor).await
    }

    async fn create(&self, actor: &UserIdentity, draft: T::Draft) -> AppResult<T> {
        self.resources().create(actor, draft).await
    }

    async fn update(&self, actor: &UserIdentity, id: RecordId, patch: T::Patch) -> AppResult<T> {
        self.resources().update(actor, id, patch).await
    }

    async fn delete(&self, actor: &UserIdentity, id: RecordId) -> AppResult<()> {
        self.resources().delete(actor, id).await
    }
}

#[async_trait]
impl ResourceEndpoint<Delegation> for Workspace {
    fn resources(&self) -> &ResourceService<Delegation> {
        &self.delegations
    }

    async fn delete(&self, actor: &UserIdentity, id: RecordId) -> AppResult<()> {
        self.cascade.delete_delegation(actor, id).await
    }
}

#[async_trait]
impl ResourceEndpoint<Company> for Workspace {
    fn resources(&self) -> &ResourceService<Company> {
        &self.companies
    }

    async fn delete(&self, actor: &UserIdentity, id: RecordId) -> AppResult<()> {
        self.cascade.delete_company(actor, id).await
    }
}

#[async_trait]
impl ResourceEndpoint<Product> for Workspace {
    fn resources(&self) -> &ResourceService<Product> {
        &self.products
    }

    async fn delete(&self, actor: &UserIdentity, id: RecordId) -> AppResult<()> {
        self.cascade.delete_product(actor, id).await
    }
}

impl ResourceEndpoint<SystemAlert> for Workspace {
    fn resources(&self) -> &ResourceService<SystemAlert> {
        &self.system_alerts
    }
}

#[async_trait]
impl ResourceEndpoint<Department> for Workspace {
    fn resources(&self) -> &ResourceService<Department> {
        self.departments.departments()
    }

    async fn delete(&self, actor: &UserIdentity, id: RecordId) -> AppResult<()> {
        self.departments.delete_department(actor, id).await
    }
}

pub async fn list_handler<T: Resource>(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<T>>>
where
    Workspace: ResourceEndpoint<T>,
{
    Ok(Json(ResourceEndpoint::<T>::list(&workspace, &user).await?))
}

pub async fn get_handler<T: Resource>(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<RecordId>,
) -> ApiResult<Json<T>>
where
    Workspace: ResourceEndpoint<T>,
{
    Ok(Json(
        ResourceEndpoint::<T>::resources(&workspace)
            .find(&user, id)
            .await?,
    ))
}

pub async fn create_handler<T: Resource>(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Json(draft): Json<T::Draft>,
) -> ApiResult<(StatusCode, Json<T>)>
where
    Workspace: ResourceEndpoint<T>,
{
    let record = ResourceEndpoint::<T>::create(&workspace, &user, draft).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update_handler<T: Resource>(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<RecordId>,
    Json(patch): Json<T::Patch>,
) -> ApiResult<Json<T>>
where
    Workspace: ResourceEndpoint<T>,
{
    Ok(Json(
        ResourceEndpoint::<T>::update(&workspace, &user, id, patch).await?,
    ))
}

pub async fn delete_handler<T: Resource>(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<RecordId>,
) -> ApiResult<StatusCode>
where
    Workspace: ResourceEndpoint<T>,
{
    ResourceEndpoint::<T>::delete(&workspace, &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
