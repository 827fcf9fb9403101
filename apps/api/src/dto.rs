use brokerdesk_core::{RecordId, UserIdentity};
use brokerdesk_domain::{PermissionSummary, Role, SectionPermission};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ready: bool,
    pub postgres: HealthDependencyStatus,
}

/// One runtime dependency health status.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-dependency-status.ts"
)]
pub struct HealthDependencyStatus {
    pub status: &'static str,
    pub detail: Option<String>,
}

/// Email and password login.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/login-request.ts"
)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The signed-in user and what they may do.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/session-response.ts"
)]
pub struct SessionResponse {
    pub subject: String,
    pub display_name: String,
    pub email: Option<String>,
    pub tenant_id: String,
    /// `true` on the demo tree.
    pub demo: bool,
    #[ts(type = "{ role: \"admin\" | \"user\", sections: Record<string, { canView: boolean, canCreate: boolean, canEdit: boolean, canDelete: boolean }> }")]
    pub permissions: PermissionSummary,
}

impl SessionResponse {
    pub fn new(identity: &UserIdentity, demo: bool, permissions: PermissionSummary) -> Self {
        Self {
            subject: identity.subject().to_owned(),
            display_name: identity.display_name().to_owned(),
            email: identity.email().map(ToOwned::to_owned),
            tenant_id: identity.tenant_id().to_string(),
            demo,
            permissions,
        }
    }
}

/// Replacement role and section rows of a user.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-permissions-request.ts"
)]
pub struct UpdatePermissionsRequest {
    #[ts(type = "\"admin\" | \"user\"")]
    pub role: Role,
    #[serde(default)]
    #[ts(type = "Array<{ section: string, capabilities: { canView: boolean, canCreate: boolean, canEdit: boolean, canDelete: boolean } }>")]
    pub permissions: Vec<SectionPermission>,
}

/// File metadata sent alongside a raw upload body.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/upload-query.ts"
)]
pub struct UploadQuery {
    pub file_name: String,
}

/// Identifies the document to detach from a product.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/document-query.ts"
)]
pub struct DocumentQuery {
    pub url: String,
}

/// Filters of the news listing.
#[derive(Debug, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/news-query.ts"
)]
pub struct NewsQuery {
    /// Only published articles.
    #[serde(default)]
    pub published: bool,
    #[ts(type = "string | null")]
    pub company_id: Option<RecordId>,
    #[ts(type = "string | null")]
    pub category_id: Option<RecordId>,
    #[ts(type = "string | null")]
    pub product_id: Option<RecordId>,
}

/// Number of records a bulk action touched.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/count-response.ts"
)]
pub struct CountResponse {
    pub count: usize,
}

/// Generic message response.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/generic-message-response.ts"
)]
pub struct GenericMessageResponse {
    pub message: String,
}
