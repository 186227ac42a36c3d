use std::sync::Arc;

use rolegate_core::{AppError, AppResult, StoreOperation};
use rolegate_domain::{Permission, PermissionId, ServiceId, ServiceSummary};
use tracing::{info, warn};

use crate::enrichment::{ServiceSummaries, count_links, resolve_service_summary};
use crate::{
    AccessRelations, CreatePermissionInput, Page, PageRequest, PermissionRepository,
    PermissionSearchFilter, ServiceDirectory, UpdatePermissionInput,
};

/// Permission enriched with the number of granting roles and owning-service details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionSummary {
    /// Permission record.
    pub permission: Permission,
    /// Roles granting the permission.
    pub role_count: u64,
    /// Owning service, or the placeholder when the directory is unavailable.
    pub service: ServiceSummary,
}

/// Application service for permission management.
#[derive(Clone)]
pub struct PermissionService {
    repository: Arc<dyn PermissionRepository>,
    relations: AccessRelations,
    service_directory: Arc<dyn ServiceDirectory>,
}

impl PermissionService {
    /// Creates a permission service from its ports.
    #[must_use]
    pub fn new(
        repository: Arc<dyn PermissionRepository>,
        relations: AccessRelations,
        service_directory: Arc<dyn ServiceDirectory>,
    ) -> Self {
        Self {
            repository,
            relations,
            service_directory,
        }
    }

    /// Finds one permission.
    pub async fn find_by_id(&self, permission_id: PermissionId) -> AppResult<Option<Permission>> {
        self.repository
            .find_by_id(permission_id)
            .await
            .map_err(|error| error.into_store_failure(StoreOperation::Fetch))
    }

    /// Finds one permission or fails with not-found.
    pub async fn find_by_id_or_fail(&self, permission_id: PermissionId) -> AppResult<Permission> {
        self.find_by_id(permission_id).await?.ok_or_else(|| {
            AppError::NotFound(format!("permission {permission_id} was not found"))
        })
    }

    /// Finds many permissions in one lookup.
    pub async fn find_by_ids(&self, permission_ids: &[PermissionId]) -> AppResult<Vec<Permission>> {
        if permission_ids.is_empty() {
            return Ok(Vec::new());
        }

        self.repository
            .find_by_ids(permission_ids)
            .await
            .map_err(|error| error.into_store_failure(StoreOperation::Fetch))
    }

    /// Finds permissions whose action matches exactly, optionally inside one service.
    pub async fn find_by_action(
        &self,
        action: &str,
        service_id: Option<ServiceId>,
    ) -> AppResult<Vec<Permission>> {
        self.repository
            .find_by_action(action, service_id)
            .await
            .map_err(|error| error.into_store_failure(StoreOperation::Fetch))
    }

    /// Returns one permission with its role count and owning-service details.
    pub async fn find_summary(&self, permission_id: PermissionId) -> AppResult<PermissionSummary> {
        let permission = self.find_by_id_or_fail(permission_id).await?;
        let targets = [permission_id];
        let (grants, service) = tokio::join!(
            self.relations
                .role_permissions
                .list_sources_for_targets(&targets),
            resolve_service_summary(self.service_directory.as_ref(), permission.service_id()),
        );
        let grants = grants.unwrap_or_else(|error| {
            warn!(permission_id = %permission_id, error = %error, "permission role count unavailable");
            Default::default()
        });

        Ok(PermissionSummary {
            role_count: count_links(&grants, &permission_id),
            service,
            permission,
        })
    }

    /// Searches permissions and enriches the page.
    pub async fn search(
        &self,
        filter: &PermissionSearchFilter,
        page: PageRequest,
    ) -> AppResult<Page<PermissionSummary>> {
        let permissions = self
            .repository
            .search(filter, page)
            .await
            .map_err(|error| error.into_store_failure(StoreOperation::Fetch))?;

        let permission_ids: Vec<PermissionId> =
            permissions.items.iter().map(Permission::id).collect();
        let (services, grants) = tokio::join!(
            ServiceSummaries::resolve(
                self.service_directory.as_ref(),
                permissions.items.iter().map(Permission::service_id),
            ),
            self.relations
                .role_permissions
                .list_sources_for_targets(&permission_ids),
        );
        let grants = grants.unwrap_or_else(|error| {
            warn!(error = %error, "permission role counts unavailable");
            Default::default()
        });

        Ok(permissions.map(|permission| PermissionSummary {
            role_count: count_links(&grants, &permission.id()),
            service: services.get(permission.service_id()),
            permission,
        }))
    }

    /// Creates a permission, rejecting duplicate actions inside the service.
    pub async fn create(&self, input: CreatePermissionInput) -> AppResult<Permission> {
        let permission = Permission::new(
            PermissionId::new(),
            input.action,
            input.description,
            input.service_id,
        )?;

        self.ensure_action_available(&permission, StoreOperation::Create)
            .await?;
        self.repository
            .insert(&permission)
            .await
            .map_err(|error| error.into_store_failure(StoreOperation::Create))?;

        info!(
            permission_id = %permission.id(),
            service_id = %permission.service_id(),
            action = permission.action().as_str(),
            "permission created"
        );
        Ok(permission)
    }

    /// Updates a permission. A changed action is checked against the rest of the service.
    pub async fn update(
        &self,
        permission_id: PermissionId,
        input: UpdatePermissionInput,
    ) -> AppResult<Permission> {
        let current = self.find_by_id_or_fail(permission_id).await?;
        let updated = Permission::new(
            current.id(),
            input
                .action
                .unwrap_or_else(|| current.action().as_str().to_owned()),
            input
                .description
                .or_else(|| current.description().map(ToOwned::to_owned)),
            current.service_id(),
        )?;

        self.ensure_action_available(&updated, StoreOperation::Update)
            .await?;
        self.repository
            .update(&updated)
            .await
            .map_err(|error| error.into_store_failure(StoreOperation::Update))?;

        info!(permission_id = %permission_id, "permission updated");
        Ok(updated)
    }

    /// Soft-deletes a permission that no role grants anymore.
    pub async fn delete(&self, permission_id: PermissionId) -> AppResult<()> {
        self.find_by_id_or_fail(permission_id).await?;

        if self
            .relations
            .role_permissions
            .has_any_for_target(permission_id)
            .await?
        {
            return Err(AppError::DeleteBlocked(format!(
                "permission {permission_id} is still granted by roles"
            )));
        }

        self.repository
            .soft_delete(permission_id)
            .await
            .map_err(|error| error.into_store_failure(StoreOperation::Delete))?;

        info!(permission_id = %permission_id, "permission deleted");
        Ok(())
    }

    async fn ensure_action_available(
        &self,
        permission: &Permission,
        operation: StoreOperation,
    ) -> AppResult<()> {
        let clash = self
            .repository
            .find_by_action(permission.action().as_str(), Some(permission.service_id()))
            .await
            .map_err(|error| error.into_store_failure(operation))?
            .into_iter()
            .any(|existing| existing.id() != permission.id());

        if clash {
            return Err(AppError::Conflict(format!(
                "permission '{}' in service {}",
                permission.action(),
                permission.service_id()
            )));
        }

        Ok(())
    }
}
