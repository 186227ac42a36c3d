use super::relations::ReferencedRows;
use super::*;

#[derive(Debug, Clone)]
pub(super) struct Stored<T> {
    record: T,
    deleted: bool,
}

impl<T> Stored<T> {
    pub(super) fn live(&self) -> Option<&T> {
        (!self.deleted).then_some(&self.record)
    }
}

fn paginate<T>(items: Vec<T>, page: PageRequest) -> Page<T> {
    let total = items.len() as u64;
    Page {
        items: items
            .into_iter()
            .skip(page.offset())
            .take(page.limit())
            .collect(),
        total,
        limit: page.limit(),
        offset: page.offset(),
    }
}

/// In-memory role repository with soft deletes.
#[derive(Debug, Default)]
pub struct InMemoryRoleRepository {
    roles: RwLock<HashMap<RoleId, Stored<Role>>>,
}

impl InMemoryRoleRepository {
    pub(super) async fn read_records(&self) -> RwLockReadGuard<'_, HashMap<RoleId, Stored<Role>>> {
        self.roles.read().await
    }

    async fn active(&self) -> Vec<Role> {
        self.roles
            .read()
            .await
            .values()
            .filter(|stored| !stored.deleted)
            .map(|stored| stored.record.clone())
            .collect()
    }

    fn clashes(existing: &Role, candidate: &Role) -> bool {
        existing.id() != candidate.id()
            && existing.service_id() == candidate.service_id()
            && existing.name_matches(candidate.name().as_str())
    }
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn find_by_id(&self, id: RoleId) -> AppResult<Option<Role>> {
        Ok(self
            .roles
            .read()
            .await
            .get(&id)
            .filter(|stored| !stored.deleted)
            .map(|stored| stored.record.clone()))
    }

    async fn find_by_ids(&self, ids: &[RoleId]) -> AppResult<Vec<Role>> {
        let roles = self.roles.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| roles.get(id))
            .filter(|stored| !stored.deleted)
            .map(|stored| stored.record.clone())
            .collect())
    }

    async fn find_by_name(&self, service_id: ServiceId, name: &str) -> AppResult<Option<Role>> {
        Ok(self
            .active()
            .await
            .into_iter()
            .find(|role| role.service_id() == service_id && role.name_matches(name)))
    }

    async fn search(&self, filter: &RoleSearchFilter, page: PageRequest) -> AppResult<Page<Role>> {
        let needle = filter
            .name_contains
            .as_deref()
            .map(|value| value.trim().to_lowercase());
        let mut roles: Vec<Role> = self
            .active()
            .await
            .into_iter()
            .filter(|role| filter.service_id.is_none_or(|id| role.service_id() == id))
            .filter(|role| {
                needle.as_deref().is_none_or(|needle| {
                    role.name().as_str().to_lowercase().contains(needle)
                })
            })
            .collect();
        roles.sort_by(|left, right| {
            left.priority()
                .cmp(&right.priority())
                .then_with(|| left.name().as_str().cmp(right.name().as_str()))
                .then_with(|| left.id().cmp(&right.id()))
        });

        Ok(paginate(roles, page))
    }

    async fn insert(&self, role: &Role) -> AppResult<()> {
        let mut roles = self.roles.write().await;
        if roles
            .values()
            .any(|stored| !stored.deleted && Self::clashes(&stored.record, role))
        {
            return Err(AppError::Conflict(format!(
                "role '{}' in service {}",
                role.name(),
                role.service_id()
            )));
        }

        roles.insert(
            role.id(),
            Stored {
                record: role.clone(),
                deleted: false,
            },
        );
        Ok(())
    }

    async fn update(&self, role: &Role) -> AppResult<()> {
        let mut roles = self.roles.write().await;
        if roles
            .values()
            .any(|stored| !stored.deleted && Self::clashes(&stored.record, role))
        {
            return Err(AppError::Conflict(format!(
                "role '{}' in service {}",
                role.name(),
                role.service_id()
            )));
        }

        match roles.get_mut(&role.id()) {
            Some(stored) if !stored.deleted => {
                stored.record = role.clone();
                Ok(())
            }
            _ => Err(AppError::NotFound(format!("role {} was not found", role.id()))),
        }
    }

    async fn soft_delete(&self, id: RoleId) -> AppResult<()> {
        match self.roles.write().await.get_mut(&id) {
            Some(stored) if !stored.deleted => {
                stored.deleted = true;
                Ok(())
            }
            _ => Err(AppError::NotFound(format!("role {id} was not found"))),
        }
    }
}

#[async_trait]
impl ReferencedRows<RoleId> for InMemoryRoleRepository {
    async fn is_stored(&self, id: RoleId) -> bool {
        self.roles.read().await.contains_key(&id)
    }
}

/// In-memory permission repository with soft deletes.
#[derive(Debug, Default)]
pub struct InMemoryPermissionRepository {
    permissions: RwLock<HashMap<PermissionId, Stored<Permission>>>,
}

impl InMemoryPermissionRepository {
    pub(super) async fn read_records(
        &self,
    ) -> RwLockReadGuard<'_, HashMap<PermissionId, Stored<Permission>>> {
        self.permissions.read().await
    }

    async fn active(&self) -> HashMap<PermissionId, Permission> {
        self.permissions
            .read()
            .await
            .iter()
            .filter(|(_, stored)| !stored.deleted)
            .map(|(id, stored)| (*id, stored.record.clone()))
            .collect()
    }

    fn clashes(existing: &Permission, candidate: &Permission) -> bool {
        existing.id() != candidate.id()
            && existing.service_id() == candidate.service_id()
            && existing.action() == candidate.action()
    }
}

#[async_trait]
impl PermissionRepository for InMemoryPermissionRepository {
    async fn find_by_id(&self, id: PermissionId) -> AppResult<Option<Permission>> {
        Ok(self.active().await.remove(&id))
    }

    async fn find_by_ids(&self, ids: &[PermissionId]) -> AppResult<Vec<Permission>> {
        let mut active = self.active().await;
        Ok(ids.iter().filter_map(|id| active.remove(id)).collect())
    }

    async fn find_by_action(
        &self,
        action: &str,
        service_id: Option<ServiceId>,
    ) -> AppResult<Vec<Permission>> {
        Ok(self
            .active()
            .await
            .into_values()
            .filter(|permission| permission.action().as_str() == action)
            .filter(|permission| service_id.is_none_or(|id| permission.service_id() == id))
            .collect())
    }

    async fn search(
        &self,
        filter: &PermissionSearchFilter,
        page: PageRequest,
    ) -> AppResult<Page<Permission>> {
        let needle = filter.action_contains.as_deref().map(str::trim);
        let mut permissions: Vec<Permission> = self
            .active()
            .await
            .into_values()
            .filter(|permission| {
                filter
                    .service_id
                    .is_none_or(|id| permission.service_id() == id)
            })
            .filter(|permission| {
                needle.is_none_or(|needle| permission.action().as_str().contains(needle))
            })
            .collect();
        permissions.sort_by(|left, right| {
            left.action()
                .as_str()
                .cmp(right.action().as_str())
                .then_with(|| left.id().cmp(&right.id()))
        });

        Ok(paginate(permissions, page))
    }

    async fn insert(&self, permission: &Permission) -> AppResult<()> {
        let mut permissions = self.permissions.write().await;
        if permissions
            .values()
            .any(|stored| !stored.deleted && Self::clashes(&stored.record, permission))
        {
            return Err(AppError::Conflict(format!(
                "permission '{}' in service {}",
                permission.action(),
                permission.service_id()
            )));
        }

        permissions.insert(
            permission.id(),
            Stored {
                record: permission.clone(),
                deleted: false,
            },
        );
        Ok(())
    }

    async fn update(&self, permission: &Permission) -> AppResult<()> {
        let mut permissions = self.permissions.write().await;
        if permissions
            .values()
            .any(|stored| !stored.deleted && Self::clashes(&stored.record, permission))
        {
            return Err(AppError::Conflict(format!(
                "permission '{}' in service {}",
                permission.action(),
                permission.service_id()
            )));
        }

        match permissions.get_mut(&permission.id()) {
            Some(stored) if !stored.deleted => {
                stored.record = permission.clone();
                Ok(())
            }
            _ => Err(AppError::NotFound(format!(
                "permission {} was not found",
                permission.id()
            ))),
        }
    }

    async fn soft_delete(&self, id: PermissionId) -> AppResult<()> {
        match self.permissions.write().await.get_mut(&id) {
            Some(stored) if !stored.deleted => {
                stored.deleted = true;
                Ok(())
            }
            _ => Err(AppError::NotFound(format!("permission {id} was not found"))),
        }
    }
}

#[async_trait]
impl ReferencedRows<PermissionId> for InMemoryPermissionRepository {
    async fn is_stored(&self, id: PermissionId) -> bool {
        self.permissions.read().await.contains_key(&id)
    }
}
