use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for a permission check.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/check-permission-request.ts"
)]
pub struct CheckPermissionRequest {
    pub user_id: String,
    pub action: String,
    pub service_id: Option<String>,
}

#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/check-permission-response.ts"
)]
pub struct CheckPermissionResponse {
    pub has_permission: bool,
}

/// Incoming payload for a role check. Role names match case-insensitively.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/check-role-request.ts"
)]
pub struct CheckRoleRequest {
    pub user_id: String,
    pub role_name: String,
    pub service_id: Option<String>,
}

#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/check-role-response.ts"
)]
pub struct CheckRoleResponse {
    pub has_role: bool,
}

/// Optional service scope for per-user listings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserScopeQuery {
    pub service_id: Option<String>,
}

/// RPC parameters for per-user listings.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-scope-request.ts"
)]
pub struct UserScopeRequest {
    pub user_id: String,
    pub service_id: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-request.ts"
)]
pub struct UserRequest {
    pub user_id: String,
}

/// RPC envelope: a method name and its JSON parameters.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/rpc-request.ts"
)]
pub struct RpcRequest {
    pub method: String,
    #[serde(default)]
    #[ts(type = "unknown")]
    pub params: serde_json::Value,
}
