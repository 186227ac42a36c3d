//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod directory;
mod ids;
mod permission;
mod role;

pub use directory::{DirectoryService, DirectoryUser, ServiceSummary};
pub use ids::{EntityId, PermissionId, RoleId, ServiceId, UserId};
pub use permission::Permission;
pub use role::{Role, RolePriority};
