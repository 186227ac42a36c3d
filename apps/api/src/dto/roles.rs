use rolegate_application::{Page, RoleMember, RoleSummary};
use rolegate_domain::Role;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::common::ServiceSummaryResponse;

/// Incoming payload for role creation.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-role-request.ts"
)]
pub struct CreateRoleRequest {
    pub name: String,
    pub description: Option<String>,
    pub priority: Option<u8>,
    pub service_id: String,
}

/// Partial role update. Absent fields are left unchanged.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-role-request.ts"
)]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub priority: Option<u8>,
}

/// API representation of a role.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub priority: u8,
    pub service_id: String,
}

impl From<Role> for RoleResponse {
    fn from(role: Role) -> Self {
        Self {
            id: role.id().to_string(),
            name: role.name().as_str().to_owned(),
            description: role.description().map(ToOwned::to_owned),
            priority: role.priority().value(),
            service_id: role.service_id().to_string(),
        }
    }
}

/// Role with relation counts and its owning service.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-summary-response.ts"
)]
pub struct RoleSummaryResponse {
    pub role: RoleResponse,
    #[ts(type = "number")]
    pub permission_count: u64,
    #[ts(type = "number")]
    pub user_count: u64,
    pub service: ServiceSummaryResponse,
}

impl From<RoleSummary> for RoleSummaryResponse {
    fn from(summary: RoleSummary) -> Self {
        Self {
            role: RoleResponse::from(summary.role),
            permission_count: summary.permission_count,
            user_count: summary.user_count,
            service: ServiceSummaryResponse::from(summary.service),
        }
    }
}

#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-page-response.ts"
)]
pub struct RolePageResponse {
    pub items: Vec<RoleSummaryResponse>,
    #[ts(type = "number")]
    pub total: u64,
    pub limit: usize,
    pub offset: usize,
}

impl From<Page<RoleSummary>> for RolePageResponse {
    fn from(page: Page<RoleSummary>) -> Self {
        Self {
            total: page.total,
            limit: page.limit,
            offset: page.offset,
            items: page
                .items
                .into_iter()
                .map(RoleSummaryResponse::from)
                .collect(),
        }
    }
}

/// Role search query string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSearchQuery {
    pub service_id: Option<String>,
    pub name: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// User holding a role. Directory fields are absent when the lookup failed.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-member-response.ts"
)]
pub struct RoleMemberResponse {
    pub user_id: String,
    pub username: Option<String>,
    pub email: Option<String>,
}

impl From<RoleMember> for RoleMemberResponse {
    fn from(member: RoleMember) -> Self {
        let (username, email) = match member.user {
            Some(user) => (Some(user.username), user.email),
            None => (None, None),
        };

        Self {
            user_id: member.user_id.to_string(),
            username,
            email,
        }
    }
}
