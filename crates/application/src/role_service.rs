use std::collections::HashMap;
use std::sync::Arc;

use rolegate_core::{AppError, AppResult, StoreOperation};
use rolegate_domain::{
    DirectoryUser, PermissionId, Role, RoleId, RolePriority, ServiceSummary, UserId,
};
use tracing::{info, warn};

use crate::enrichment::{ServiceSummaries, count_links, resolve_service_summary};
use crate::{
    AccessRelations, CreateRoleInput, Page, PageRequest, RoleRepository, RoleSearchFilter,
    ServiceDirectory, UpdateRoleInput, UserDirectory,
};

/// Role enriched with relation counts and owning-service details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSummary {
    /// Role record.
    pub role: Role,
    /// Permissions granted by the role.
    pub permission_count: u64,
    /// Users holding the role.
    pub user_count: u64,
    /// Owning service, or the placeholder when the directory is unavailable.
    pub service: ServiceSummary,
}

/// User holding a role, with directory details when they could be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleMember {
    /// User identifier.
    pub user_id: UserId,
    /// Directory record, absent when unknown or unavailable.
    pub user: Option<DirectoryUser>,
}

/// Application service for role management.
#[derive(Clone)]
pub struct RoleService {
    repository: Arc<dyn RoleRepository>,
    relations: AccessRelations,
    service_directory: Arc<dyn ServiceDirectory>,
    user_directory: Arc<dyn UserDirectory>,
}

impl RoleService {
    /// Creates a role service from its ports.
    #[must_use]
    pub fn new(
        repository: Arc<dyn RoleRepository>,
        relations: AccessRelations,
        service_directory: Arc<dyn ServiceDirectory>,
        user_directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            repository,
            relations,
            service_directory,
            user_directory,
        }
    }

    /// Finds one role.
    pub async fn find_by_id(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        self.repository
            .find_by_id(role_id)
            .await
            .map_err(|error| error.into_store_failure(StoreOperation::Fetch))
    }

    /// Finds one role or fails with not-found.
    pub async fn find_by_id_or_fail(&self, role_id: RoleId) -> AppResult<Role> {
        self.find_by_id(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role {role_id} was not found")))
    }

    /// Finds many roles in one lookup.
    pub async fn find_by_ids(&self, role_ids: &[RoleId]) -> AppResult<Vec<Role>> {
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }

        self.repository
            .find_by_ids(role_ids)
            .await
            .map_err(|error| error.into_store_failure(StoreOperation::Fetch))
    }

    /// Returns one role with counts and owning-service details.
    pub async fn find_summary(&self, role_id: RoleId) -> AppResult<RoleSummary> {
        let role = self.find_by_id_or_fail(role_id).await?;
        let (permission_counts, user_counts) = self.relation_counts(&[role_id]).await;
        let service =
            resolve_service_summary(self.service_directory.as_ref(), role.service_id()).await;

        Ok(RoleSummary {
            permission_count: count_links(&permission_counts, &role_id),
            user_count: count_links(&user_counts, &role_id),
            service,
            role,
        })
    }

    /// Searches roles and enriches the page.
    pub async fn search(
        &self,
        filter: &RoleSearchFilter,
        page: PageRequest,
    ) -> AppResult<Page<RoleSummary>> {
        let roles = self
            .repository
            .search(filter, page)
            .await
            .map_err(|error| error.into_store_failure(StoreOperation::Fetch))?;

        let role_ids: Vec<RoleId> = roles.items.iter().map(Role::id).collect();
        let (services, (permission_counts, user_counts)) = tokio::join!(
            ServiceSummaries::resolve(
                self.service_directory.as_ref(),
                roles.items.iter().map(Role::service_id),
            ),
            self.relation_counts(&role_ids),
        );

        Ok(roles.map(|role| RoleSummary {
            permission_count: count_links(&permission_counts, &role.id()),
            user_count: count_links(&user_counts, &role.id()),
            service: services.get(role.service_id()),
            role,
        }))
    }

    /// Creates a role, rejecting duplicate names inside the service.
    pub async fn create(&self, input: CreateRoleInput) -> AppResult<Role> {
        let priority = input
            .priority
            .map_or_else(|| Ok(RolePriority::default()), RolePriority::new)?;
        let role = Role::new(
            RoleId::new(),
            input.name,
            input.description,
            priority,
            input.service_id,
        )?;

        self.ensure_name_available(&role, StoreOperation::Create)
            .await?;
        self.repository
            .insert(&role)
            .await
            .map_err(|error| error.into_store_failure(StoreOperation::Create))?;

        info!(
            role_id = %role.id(),
            service_id = %role.service_id(),
            name = role.name().as_str(),
            "role created"
        );
        Ok(role)
    }

    /// Updates a role. A rename is checked against other roles of the same service.
    pub async fn update(&self, role_id: RoleId, input: UpdateRoleInput) -> AppResult<Role> {
        let current = self.find_by_id_or_fail(role_id).await?;
        let priority = match input.priority {
            Some(value) => RolePriority::new(value)?,
            None => current.priority(),
        };
        let description = match input.description {
            Some(description) => Some(description),
            None => current.description().map(ToOwned::to_owned),
        };
        let updated = Role::new(
            current.id(),
            input
                .name
                .unwrap_or_else(|| current.name().as_str().to_owned()),
            description,
            priority,
            current.service_id(),
        )?;

        self.ensure_name_available(&updated, StoreOperation::Update)
            .await?;
        self.repository
            .update(&updated)
            .await
            .map_err(|error| error.into_store_failure(StoreOperation::Update))?;

        info!(role_id = %role_id, "role updated");
        Ok(updated)
    }

    /// Soft-deletes a role that no user holds anymore.
    pub async fn delete(&self, role_id: RoleId) -> AppResult<()> {
        self.find_by_id_or_fail(role_id).await?;

        let has_members = self
            .relations
            .user_roles
            .has_any_for_target(role_id)
            .await?;
        if has_members {
            return Err(AppError::DeleteBlocked(format!(
                "role {role_id} is still assigned to users"
            )));
        }

        self.repository
            .soft_delete(role_id)
            .await
            .map_err(|error| error.into_store_failure(StoreOperation::Delete))?;

        info!(role_id = %role_id, "role deleted");
        Ok(())
    }

    /// Lists users holding a role, enriched from the user directory in one call.
    pub async fn list_members(&self, role_id: RoleId) -> AppResult<Vec<RoleMember>> {
        self.find_by_id_or_fail(role_id).await?;
        let user_ids = self.relations.user_roles.list_sources(role_id).await?;
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut users: HashMap<UserId, DirectoryUser> =
            match self.user_directory.find_by_ids(&user_ids).await {
                Ok(users) => users.into_iter().map(|user| (user.id, user)).collect(),
                Err(error) => {
                    warn!(
                        operation = "user_directory.find_by_ids",
                        role_id = %role_id,
                        user_count = user_ids.len(),
                        error = %error,
                        "member enrichment unavailable"
                    );
                    HashMap::new()
                }
            };

        Ok(user_ids
            .into_iter()
            .map(|user_id| RoleMember {
                user: users.remove(&user_id),
                user_id,
            })
            .collect())
    }

    async fn ensure_name_available(&self, role: &Role, operation: StoreOperation) -> AppResult<()> {
        let existing = self
            .repository
            .find_by_name(role.service_id(), role.name().as_str())
            .await
            .map_err(|error| error.into_store_failure(operation))?;

        match existing {
            Some(existing) if existing.id() != role.id() => Err(AppError::Conflict(format!(
                "role '{}' in service {}",
                role.name(),
                role.service_id()
            ))),
            _ => Ok(()),
        }
    }

    async fn relation_counts(
        &self,
        role_ids: &[RoleId],
    ) -> (HashMap<RoleId, Vec<PermissionId>>, HashMap<RoleId, Vec<UserId>>) {
        let (permissions, users) = tokio::join!(
            self.relations.role_permissions.list_targets_for_sources(role_ids),
            self.relations.user_roles.list_sources_for_targets(role_ids),
        );

        let permissions = permissions.unwrap_or_else(|error| {
            warn!(error = %error, "role permission counts unavailable");
            HashMap::new()
        });
        let users = users.unwrap_or_else(|error| {
            warn!(error = %error, "role member counts unavailable");
            HashMap::new()
        });
        (permissions, users)
    }
}
