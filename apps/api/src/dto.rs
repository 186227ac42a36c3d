mod authorization;
mod common;
mod permissions;
mod relations;
mod roles;

pub use authorization::{
    CheckPermissionRequest, CheckPermissionResponse, CheckRoleRequest, CheckRoleResponse,
    RpcRequest, UserRequest, UserScopeQuery, UserScopeRequest,
};
pub use common::{HealthDependencyStatus, HealthResponse, ServiceResponse, ServiceSummaryResponse};
pub use permissions::{
    CreatePermissionRequest, PermissionByActionQuery, PermissionPageResponse, PermissionResponse,
    PermissionSearchQuery, PermissionSummaryResponse, UpdatePermissionRequest,
};
pub use relations::{
    BatchAssignResponse, BatchRevokeResponse, RelationTargetsRequest, RelationTargetsResponse,
};
pub use roles::{
    CreateRoleRequest, RoleMemberResponse, RolePageResponse, RoleResponse, RoleSearchQuery,
    RoleSummaryResponse, UpdateRoleRequest,
};
