//! CSV import: preview validates every row, submit creates the valid ones.

use std::str::FromStr;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Extension, Path, State};
use axum::response::{IntoResponse, Response};
use brokerdesk_application::csv_import::{self, CsvImportable};
use brokerdesk_core::{AppError, UserIdentity};
use brokerdesk_domain::{Capability, Company, Delegation, Department, Product, ResourceKind};

use crate::error::ApiResult;
use crate::state::Workspace;

use super::resources::ResourceEndpoint;

pub async fn preview_import_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path(kind): Path<String>,
    body: Bytes,
) -> ApiResult<Response> {
    match ResourceKind::from_str(&kind)? {
        ResourceKind::Product => preview::<Product>(&workspace, &user, &body).await,
        ResourceKind::Company => preview::<Company>(&workspace, &user, &body).await,
        ResourceKind::Delegation => preview::<Delegation>(&workspace, &user, &body).await,
        ResourceKind::Department => preview::<Department>(&workspace, &user, &body).await,
        other => Err(not_importable(other).into()),
    }
}

pub async fn submit_import_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Path(kind): Path<String>,
    body: Bytes,
) -> ApiResult<Response> {
    match ResourceKind::from_str(&kind)? {
        ResourceKind::Product => submit::<Product>(&workspace, &user, &body).await,
        ResourceKind::Company => submit::<Company>(&workspace, &user, &body).await,
        ResourceKind::Delegation => submit::<Delegation>(&workspace, &user, &body).await,
        ResourceKind::Department => submit::<Department>(&workspace, &user, &body).await,
        other => Err(not_importable(other).into()),
    }
}

fn not_importable(kind: ResourceKind) -> AppError {
    AppError::Validation(format!(
        "{} cannot be imported from CSV",
        kind.default_plural()
    ))
}

async fn preview<T: CsvImportable>(
    workspace: &Workspace,
    user: &UserIdentity,
    body: &[u8],
) -> ApiResult<Response>
where
    Workspace: ResourceEndpoint<T>,
{
    ResourceEndpoint::<T>::resources(workspace)
        .require(user, Capability::Create)
        .await?;
    let preview = csv_import::preview::<T>(body)?;
    Ok(Json(preview).into_response())
}

async fn submit<T: CsvImportable>(
    workspace: &Workspace,
    user: &UserIdentity,
    body: &[u8],
) -> ApiResult<Response>
where
    Workspace: ResourceEndpoint<T>,
{
    let preview = csv_import::preview::<T>(body)?;
    let service = ResourceEndpoint::<T>::resources(workspace);
    let outcome = csv_import::submit(service, user, &preview).await?;
    Ok(Json(outcome).into_response())
}

#[cfg(test)]
mod tests {
    use brokerdesk_core::AppError;
    use brokerdesk_domain::ResourceKind;

    use super::not_importable;

    #[test]
    fn rejected_kinds_name_their_collection() {
        let error = not_importable(ResourceKind::News);
        assert!(matches!(error, AppError::Validation(message) if message.contains("cannot be imported")));
    }
}
