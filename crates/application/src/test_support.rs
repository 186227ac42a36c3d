//! Hand-written fakes for application port traits.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use rolegate_core::{AppError, AppResult};
use rolegate_domain::{
    DirectoryService, DirectoryUser, EntityId, Permission, PermissionId, Role, RoleId, ServiceId,
    UserId,
};
use tokio::sync::Mutex;

use crate::{
    AccessRelations, AuthorizationRepository, Page, PageRequest, PermissionRepository,
    PermissionSearchFilter, RelationRepository, RoleRepository, RoleSearchFilter,
    ServiceDirectory, UserDirectory,
};

fn unavailable() -> AppError {
    AppError::Internal("store unavailable".to_owned())
}

pub(crate) struct FakeRelationRepository<A, B> {
    rows: Mutex<BTreeSet<(A, B)>>,
    failing: AtomicBool,
    batch_calls: AtomicUsize,
}

impl<A, B> Default for FakeRelationRepository<A, B> {
    fn default() -> Self {
        Self {
            rows: Mutex::new(BTreeSet::new()),
            failing: AtomicBool::new(false),
            batch_calls: AtomicUsize::new(0),
        }
    }
}

impl<A: EntityId, B: EntityId> FakeRelationRepository<A, B> {
    pub(crate) async fn seed(&self, source: A, target: B) {
        self.rows.lock().await.insert((source, target));
    }

    pub(crate) async fn rows(&self) -> Vec<(A, B)> {
        self.rows.lock().await.iter().copied().collect()
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }
}

#[async_trait]
impl<A: EntityId, B: EntityId> RelationRepository<A, B> for FakeRelationRepository<A, B> {
    async fn list_targets(&self, source: A) -> AppResult<Vec<B>> {
        self.check()?;
        Ok(self
            .rows
            .lock()
            .await
            .iter()
            .filter(|(stored_source, _)| *stored_source == source)
            .map(|(_, target)| *target)
            .collect())
    }

    async fn list_sources(&self, target: B) -> AppResult<Vec<A>> {
        self.check()?;
        Ok(self
            .rows
            .lock()
            .await
            .iter()
            .filter(|(_, stored_target)| *stored_target == target)
            .map(|(source, _)| *source)
            .collect())
    }

    async fn list_targets_for_sources(&self, sources: &[A]) -> AppResult<HashMap<A, Vec<B>>> {
        self.check()?;
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        let mut grouped: HashMap<A, Vec<B>> = HashMap::new();
        for (source, target) in self.rows.lock().await.iter() {
            if sources.contains(source) {
                grouped.entry(*source).or_default().push(*target);
            }
        }
        Ok(grouped)
    }

    async fn list_sources_for_targets(&self, targets: &[B]) -> AppResult<HashMap<B, Vec<A>>> {
        self.check()?;
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        let mut grouped: HashMap<B, Vec<A>> = HashMap::new();
        for (source, target) in self.rows.lock().await.iter() {
            if targets.contains(target) {
                grouped.entry(*target).or_default().push(*source);
            }
        }
        Ok(grouped)
    }

    async fn list_existing_targets(&self, source: A, candidates: &[B]) -> AppResult<Vec<B>> {
        self.check()?;
        let rows = self.rows.lock().await;
        Ok(candidates
            .iter()
            .copied()
            .filter(|target| rows.contains(&(source, *target)))
            .collect())
    }

    async fn exists(&self, source: A, target: B) -> AppResult<bool> {
        self.check()?;
        Ok(self.rows.lock().await.contains(&(source, target)))
    }

    async fn has_any_for_target(&self, target: B) -> AppResult<bool> {
        self.check()?;
        Ok(self
            .rows
            .lock()
            .await
            .iter()
            .any(|(_, stored_target)| *stored_target == target))
    }

    async fn insert(&self, source: A, target: B) -> AppResult<bool> {
        self.check()?;
        Ok(self.rows.lock().await.insert((source, target)))
    }

    async fn insert_many(&self, source: A, targets: &[B]) -> AppResult<u64> {
        self.check()?;
        let mut rows = self.rows.lock().await;
        let inserted = targets
            .iter()
            .filter(|target| rows.insert((source, **target)))
            .count();
        Ok(inserted as u64)
    }

    async fn delete(&self, source: A, target: B) -> AppResult<u64> {
        self.check()?;
        Ok(u64::from(self.rows.lock().await.remove(&(source, target))))
    }

    async fn delete_many(&self, source: A, targets: &[B]) -> AppResult<u64> {
        self.check()?;
        let mut rows = self.rows.lock().await;
        let removed = targets
            .iter()
            .filter(|target| rows.remove(&(source, **target)))
            .count();
        Ok(removed as u64)
    }

    async fn replace_all(&self, source: A, targets: &[B]) -> AppResult<()> {
        self.check()?;
        let mut rows = self.rows.lock().await;
        rows.retain(|(stored_source, _)| *stored_source != source);
        rows.extend(targets.iter().map(|target| (source, *target)));
        Ok(())
    }
}

pub(crate) struct FakeRelations {
    pub(crate) user_roles: Arc<FakeRelationRepository<UserId, RoleId>>,
    pub(crate) role_permissions: Arc<FakeRelationRepository<RoleId, PermissionId>>,
    pub(crate) service_roles: Arc<FakeRelationRepository<ServiceId, RoleId>>,
}

impl FakeRelations {
    pub(crate) fn new() -> Self {
        Self {
            user_roles: Arc::new(FakeRelationRepository::default()),
            role_permissions: Arc::new(FakeRelationRepository::default()),
            service_roles: Arc::new(FakeRelationRepository::default()),
        }
    }

    pub(crate) fn access_relations(&self) -> AccessRelations {
        AccessRelations::new(
            self.user_roles.clone(),
            self.role_permissions.clone(),
            self.service_roles.clone(),
        )
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.user_roles.set_failing(failing);
        self.role_permissions.set_failing(failing);
        self.service_roles.set_failing(failing);
    }
}

fn paginate<T: Clone>(items: Vec<T>, page: PageRequest) -> Page<T> {
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

#[derive(Default)]
pub(crate) struct FakeRoleRepository {
    roles: Mutex<Vec<Role>>,
    failing: AtomicBool,
}

impl FakeRoleRepository {
    pub(crate) async fn seed(&self, role: Role) {
        self.roles.lock().await.push(role);
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }
}

#[async_trait]
impl RoleRepository for FakeRoleRepository {
    async fn find_by_id(&self, id: RoleId) -> AppResult<Option<Role>> {
        self.check()?;
        Ok(self
            .roles
            .lock()
            .await
            .iter()
            .find(|role| role.id() == id)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[RoleId]) -> AppResult<Vec<Role>> {
        self.check()?;
        Ok(self
            .roles
            .lock()
            .await
            .iter()
            .filter(|role| ids.contains(&role.id()))
            .cloned()
            .collect())
    }

    async fn find_by_name(&self, service_id: ServiceId, name: &str) -> AppResult<Option<Role>> {
        self.check()?;
        Ok(self
            .roles
            .lock()
            .await
            .iter()
            .find(|role| role.service_id() == service_id && role.name_matches(name))
            .cloned())
    }

    async fn search(&self, filter: &RoleSearchFilter, page: PageRequest) -> AppResult<Page<Role>> {
        self.check()?;
        let mut matching: Vec<Role> = self
            .roles
            .lock()
            .await
            .iter()
            .filter(|role| filter.service_id.is_none_or(|id| role.service_id() == id))
            .filter(|role| {
                filter.name_contains.as_deref().is_none_or(|needle| {
                    role.name()
                        .as_str()
                        .to_lowercase()
                        .contains(needle.to_lowercase().as_str())
                })
            })
            .cloned()
            .collect();
        matching.sort_by(|left, right| {
            left.priority()
                .cmp(&right.priority())
                .then_with(|| left.name().as_str().cmp(right.name().as_str()))
        });
        Ok(paginate(matching, page))
    }

    async fn insert(&self, role: &Role) -> AppResult<()> {
        self.check()?;
        self.roles.lock().await.push(role.clone());
        Ok(())
    }

    async fn update(&self, role: &Role) -> AppResult<()> {
        self.check()?;
        let mut roles = self.roles.lock().await;
        let Some(stored) = roles.iter_mut().find(|stored| stored.id() == role.id()) else {
            return Err(AppError::NotFound(format!("role {} was not found", role.id())));
        };
        *stored = role.clone();
        Ok(())
    }

    async fn soft_delete(&self, id: RoleId) -> AppResult<()> {
        self.check()?;
        let mut roles = self.roles.lock().await;
        let before = roles.len();
        roles.retain(|role| role.id() != id);
        if roles.len() == before {
            return Err(AppError::NotFound(format!("role {id} was not found")));
        }
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakePermissionRepository {
    permissions: Mutex<Vec<Permission>>,
    failing: AtomicBool,
}

impl FakePermissionRepository {
    pub(crate) async fn seed(&self, permission: Permission) {
        self.permissions.lock().await.push(permission);
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }
}

#[async_trait]
impl PermissionRepository for FakePermissionRepository {
    async fn find_by_id(&self, id: PermissionId) -> AppResult<Option<Permission>> {
        self.check()?;
        Ok(self
            .permissions
            .lock()
            .await
            .iter()
            .find(|permission| permission.id() == id)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[PermissionId]) -> AppResult<Vec<Permission>> {
        self.check()?;
        Ok(self
            .permissions
            .lock()
            .await
            .iter()
            .filter(|permission| ids.contains(&permission.id()))
            .cloned()
            .collect())
    }

    async fn find_by_action(
        &self,
        action: &str,
        service_id: Option<ServiceId>,
    ) -> AppResult<Vec<Permission>> {
        self.check()?;
        Ok(self
            .permissions
            .lock()
            .await
            .iter()
            .filter(|permission| permission.action().as_str() == action)
            .filter(|permission| service_id.is_none_or(|id| permission.service_id() == id))
            .cloned()
            .collect())
    }

    async fn search(
        &self,
        filter: &PermissionSearchFilter,
        page: PageRequest,
    ) -> AppResult<Page<Permission>> {
        self.check()?;
        let mut matching: Vec<Permission> = self
            .permissions
            .lock()
            .await
            .iter()
            .filter(|permission| {
                filter
                    .service_id
                    .is_none_or(|id| permission.service_id() == id)
            })
            .filter(|permission| {
                filter
                    .action_contains
                    .as_deref()
                    .is_none_or(|needle| permission.action().as_str().contains(needle))
            })
            .cloned()
            .collect();
        matching.sort_by(|left, right| left.action().as_str().cmp(right.action().as_str()));
        Ok(paginate(matching, page))
    }

    async fn insert(&self, permission: &Permission) -> AppResult<()> {
        self.check()?;
        self.permissions.lock().await.push(permission.clone());
        Ok(())
    }

    async fn update(&self, permission: &Permission) -> AppResult<()> {
        self.check()?;
        let mut permissions = self.permissions.lock().await;
        let Some(stored) = permissions
            .iter_mut()
            .find(|stored| stored.id() == permission.id())
        else {
            return Err(AppError::NotFound(format!(
                "permission {} was not found",
                permission.id()
            )));
        };
        *stored = permission.clone();
        Ok(())
    }

    async fn soft_delete(&self, id: PermissionId) -> AppResult<()> {
        self.check()?;
        let mut permissions = self.permissions.lock().await;
        let before = permissions.len();
        permissions.retain(|permission| permission.id() != id);
        if permissions.len() == before {
            return Err(AppError::NotFound(format!("permission {id} was not found")));
        }
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeServiceDirectory {
    services: Mutex<Vec<DirectoryService>>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl FakeServiceDirectory {
    pub(crate) async fn seed(&self, service: DirectoryService) {
        self.services.lock().await.push(service);
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> AppResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Upstream("service directory timed out".to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl ServiceDirectory for FakeServiceDirectory {
    async fn find_by_id(&self, id: ServiceId) -> AppResult<Option<DirectoryService>> {
        self.check()?;
        Ok(self
            .services
            .lock()
            .await
            .iter()
            .find(|service| service.id == id)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[ServiceId]) -> AppResult<Vec<DirectoryService>> {
        self.check()?;
        Ok(self
            .services
            .lock()
            .await
            .iter()
            .filter(|service| ids.contains(&service.id))
            .cloned()
            .collect())
    }

    async fn list_services(&self) -> AppResult<Vec<DirectoryService>> {
        self.check()?;
        Ok(self.services.lock().await.clone())
    }
}

#[derive(Default)]
pub(crate) struct FakeUserDirectory {
    users: Mutex<Vec<DirectoryUser>>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl FakeUserDirectory {
    pub(crate) async fn seed(&self, user: DirectoryUser) {
        self.users.lock().await.push(user);
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserDirectory for FakeUserDirectory {
    async fn find_by_ids(&self, ids: &[UserId]) -> AppResult<Vec<DirectoryUser>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Upstream("user directory timed out".to_owned()));
        }
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .filter(|user| ids.contains(&user.id))
            .cloned()
            .collect())
    }
}

/// Combined-query fake returning a fixed answer or failing.
pub(crate) struct FakeAuthorizationRepository {
    pub(crate) answer: Option<bool>,
}

#[async_trait]
impl AuthorizationRepository for FakeAuthorizationRepository {
    async fn user_has_action(
        &self,
        _user_id: UserId,
        _action: &str,
        _service_id: Option<ServiceId>,
    ) -> AppResult<bool> {
        self.answer.ok_or_else(unavailable)
    }
}
