use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use rolegate_core::AppResult;
use rolegate_domain::{DirectoryService, PermissionId, Role, RoleId, ServiceId, UserId};
use tracing::warn;

use crate::{AccessRelations, PermissionService, RoleService, ServiceDirectory};

mod permissions;
mod roles;
mod scope;
mod services;


/// Single-query permission lookup joining every relation at once.
///
/// Optional fast path for [`AuthorizationService::check_permission`]. It must
/// agree with the relation traversal for every input.
#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    /// Returns whether the user holds `action` through any effective role.
    async fn user_has_action(
        &self,
        user_id: UserId,
        action: &str,
        service_id: Option<ServiceId>,
    ) -> AppResult<bool>;
}

/// Read-only authorization decisions over the relation stores.
///
/// Every decision fails closed: store or directory errors are logged and
/// answered with a denial or an empty list.
#[derive(Clone)]
pub struct AuthorizationService {
    relations: AccessRelations,
    role_service: RoleService,
    permission_service: PermissionService,
    service_directory: Arc<dyn ServiceDirectory>,
    combined_query: Option<Arc<dyn AuthorizationRepository>>,
}

impl AuthorizationService {
    /// Creates an engine that answers every check by relation traversal.
    #[must_use]
    pub fn new(
        relations: AccessRelations,
        role_service: RoleService,
        permission_service: PermissionService,
        service_directory: Arc<dyn ServiceDirectory>,
    ) -> Self {
        Self {
            relations,
            role_service,
            permission_service,
            service_directory,
            combined_query: None,
        }
    }

    /// Enables the single-query permission check, keeping traversal as fallback.
    #[must_use]
    pub fn with_combined_query(mut self, repository: Arc<dyn AuthorizationRepository>) -> Self {
        self.combined_query = Some(repository);
        self
    }
}
