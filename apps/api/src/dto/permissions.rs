use rolegate_application::{Page, PermissionSummary};
use rolegate_domain::Permission;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::common::ServiceSummaryResponse;

/// Incoming payload for permission creation.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-permission-request.ts"
)]
pub struct CreatePermissionRequest {
    pub action: String,
    pub description: Option<String>,
    pub service_id: String,
}

#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-permission-request.ts"
)]
pub struct UpdatePermissionRequest {
    pub action: Option<String>,
    pub description: Option<String>,
}

/// API representation of a permission.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-response.ts"
)]
pub struct PermissionResponse {
    pub id: String,
    pub action: String,
    pub description: Option<String>,
    pub service_id: String,
}

impl From<Permission> for PermissionResponse {
    fn from(permission: Permission) -> Self {
        Self {
            id: permission.id().to_string(),
            action: permission.action().as_str().to_owned(),
            description: permission.description().map(ToOwned::to_owned),
            service_id: permission.service_id().to_string(),
        }
    }
}

#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-summary-response.ts"
)]
pub struct PermissionSummaryResponse {
    pub permission: PermissionResponse,
    #[ts(type = "number")]
    pub role_count: u64,
    pub service: ServiceSummaryResponse,
}

impl From<PermissionSummary> for PermissionSummaryResponse {
    fn from(summary: PermissionSummary) -> Self {
        Self {
            permission: PermissionResponse::from(summary.permission),
            role_count: summary.role_count,
            service: ServiceSummaryResponse::from(summary.service),
        }
    }
}

#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-page-response.ts"
)]
pub struct PermissionPageResponse {
    pub items: Vec<PermissionSummaryResponse>,
    #[ts(type = "number")]
    pub total: u64,
    pub limit: usize,
    pub offset: usize,
}

impl From<Page<PermissionSummary>> for PermissionPageResponse {
    fn from(page: Page<PermissionSummary>) -> Self {
        Self {
            total: page.total,
            limit: page.limit,
            offset: page.offset,
            items: page
                .items
                .into_iter()
                .map(PermissionSummaryResponse::from)
                .collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionSearchQuery {
    pub service_id: Option<String>,
    pub action: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Exact action lookup, optionally inside one service.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionByActionQuery {
    pub action: String,
    pub service_id: Option<String>,
}
