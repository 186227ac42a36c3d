use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use rolegate_application::{
    AccessRelations, AuthorizationRepository, Page, PageRequest, PermissionRepository,
    PermissionSearchFilter, RelationRepository, RoleRepository, RoleSearchFilter,
    ServiceDirectory, UserDirectory,
};
use rolegate_core::{AppError, AppResult};
use rolegate_domain::{
    DirectoryService, DirectoryUser, EntityId, Permission, PermissionId, Role, RoleId, ServiceId,
    UserId,
};
use tokio::sync::{RwLock, RwLockReadGuard};

mod directories;
mod entities;
mod relations;

#[cfg(test)]
mod tests;

pub use directories::{InMemoryServiceDirectory, InMemoryUserDirectory};
pub use entities::{InMemoryPermissionRepository, InMemoryRoleRepository};
pub use relations::InMemoryRelationRepository;

use entities::Stored;

/// Every access-control port backed by process memory.
///
/// Used to run the engine without PostgreSQL and as the reference
/// implementation in tests.
#[derive(Clone)]
pub struct InMemoryAccessStore {
    /// Users holding roles.
    pub user_roles: Arc<InMemoryRelationRepository<UserId, RoleId>>,
    /// Roles granting permissions.
    pub role_permissions: Arc<InMemoryRelationRepository<RoleId, PermissionId>>,
    /// Roles visible per service.
    pub service_roles: Arc<InMemoryRelationRepository<ServiceId, RoleId>>,
    /// Role records.
    pub roles: Arc<InMemoryRoleRepository>,
    /// Permission records.
    pub permissions: Arc<InMemoryPermissionRepository>,
    /// Service directory records.
    pub services: Arc<InMemoryServiceDirectory>,
    /// User directory records.
    pub users: Arc<InMemoryUserDirectory>,
}

impl Default for InMemoryAccessStore {
    fn default() -> Self {
        let roles = Arc::new(InMemoryRoleRepository::default());
        let permissions = Arc::new(InMemoryPermissionRepository::default());

        Self {
            user_roles: Arc::new(
                InMemoryRelationRepository::<UserId, RoleId>::default().with_targets(roles.clone()),
            ),
            role_permissions: Arc::new(
                InMemoryRelationRepository::<RoleId, PermissionId>::default()
                    .with_sources(roles.clone())
                    .with_targets(permissions.clone()),
            ),
            service_roles: Arc::new(
                InMemoryRelationRepository::<ServiceId, RoleId>::default()
                    .with_targets(roles.clone()),
            ),
            roles,
            permissions,
            services: Arc::default(),
            users: Arc::default(),
        }
    }
}

impl InMemoryAccessStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns relation services over the in-memory relation stores.
    #[must_use]
    pub fn access_relations(&self) -> AccessRelations {
        AccessRelations::new(
            self.user_roles.clone(),
            self.role_permissions.clone(),
            self.service_roles.clone(),
        )
    }

    /// Returns the single-pass permission lookup over this store.
    #[must_use]
    pub fn authorization_repository(&self) -> InMemoryAuthorizationRepository {
        InMemoryAuthorizationRepository {
            store: self.clone(),
        }
    }
}

/// Single-pass permission lookup over an [`InMemoryAccessStore`].
#[derive(Clone)]
pub struct InMemoryAuthorizationRepository {
    store: InMemoryAccessStore,
}

#[async_trait]
impl AuthorizationRepository for InMemoryAuthorizationRepository {
    async fn user_has_action(
        &self,
        user_id: UserId,
        action: &str,
        service_id: Option<ServiceId>,
    ) -> AppResult<bool> {
        // Every guard is held until the answer is computed so one decision sees one state.
        let user_roles = self.store.user_roles.read_rows().await;
        let role_permissions = self.store.role_permissions.read_rows().await;
        let service_roles = self.store.service_roles.read_rows().await;
        let roles = self.store.roles.read_records().await;
        let permissions = self.store.permissions.read_records().await;

        Ok(user_roles
            .iter()
            .filter(|(holder, _)| *holder == user_id)
            .map(|(_, role_id)| *role_id)
            .filter(|role_id| roles.get(role_id).and_then(Stored::live).is_some())
            .filter(|role_id| {
                service_id.is_none_or(|service_id| service_roles.contains(&(service_id, *role_id)))
            })
            .flat_map(|role_id| {
                role_permissions
                    .iter()
                    .filter(move |(granting_role, _)| *granting_role == role_id)
                    .map(|(_, permission_id)| *permission_id)
            })
            .filter_map(|permission_id| permissions.get(&permission_id).and_then(Stored::live))
            .any(|permission| {
                permission.action().as_str() == action
                    && service_id.is_none_or(|service_id| permission.service_id() == service_id)
            }))
    }
}
