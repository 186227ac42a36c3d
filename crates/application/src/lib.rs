//! Application services and ports.

#![forbid(unsafe_code)]

mod authorization_service;
mod directory_ports;
mod enrichment;
mod entity_ports;
mod permission_service;
mod relation_ports;
mod relation_service;
mod role_service;

#[cfg(test)]
mod test_support;

pub use authorization_service::{AuthorizationRepository, AuthorizationService};
pub use directory_ports::{ServiceDirectory, UserDirectory};
pub use entity_ports::{
    CreatePermissionInput, CreateRoleInput, Page, PageRequest, PermissionRepository,
    PermissionSearchFilter, RoleRepository, RoleSearchFilter, UpdatePermissionInput,
    UpdateRoleInput,
};
pub use permission_service::{PermissionService, PermissionSummary};
pub use relation_ports::{
    BatchAssignResult, RelationKind, RelationRepository, RolePermissionRepository,
    ServiceRoleRepository, UserRoleRepository,
};
pub use relation_service::{
    AccessRelations, RelationService, RolePermissionService, ServiceRoleService,
    UserRoleService,
};
pub use role_service::{RoleMember, RoleService, RoleSummary};
