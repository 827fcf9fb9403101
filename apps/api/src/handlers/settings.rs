use axum::Json;
use axum::extract::{Extension, State};
use brokerdesk_core::UserIdentity;
use brokerdesk_domain::{BrokerageConfig, BrokerageConfigInput};

use crate::error::ApiResult;
use crate::state::Workspace;

pub async fn get_settings_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<BrokerageConfig>> {
    Ok(Json(workspace.settings.get(user.tenant_id()).await?))
}

pub async fn save_settings_handler(
    State(workspace): State<Workspace>,
    Extension(user): Extension<UserIdentity>,
    Json(input): Json<BrokerageConfigInput>,
) -> ApiResult<Json<BrokerageConfig>> {
    Ok(Json(workspace.settings.save(&user, input).await?))
}
