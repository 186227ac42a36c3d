use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;

use rolegate_core::{AppError, AppResult, StoreOperation};
use rolegate_domain::{EntityId, PermissionId, RoleId, ServiceId, UserId};
use tracing::{debug, info};

use crate::relation_ports::{
    BatchAssignResult, RelationKind, RelationRepository, RolePermissionRepository,
    ServiceRoleRepository, UserRoleRepository,
};

/// Application service for one join relation.
///
/// Wraps a [`RelationRepository`] with duplicate and absence checks and maps
/// adapter failures onto the relation error taxonomy.
pub struct RelationService<A, B>
where
    A: EntityId,
    B: EntityId,
{
    kind: RelationKind,
    repository: Arc<dyn RelationRepository<A, B>>,
}

impl<A, B> Clone for RelationService<A, B>
where
    A: EntityId,
    B: EntityId,
{
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            repository: self.repository.clone(),
        }
    }
}

/// Relation service for user role assignments.
pub type UserRoleService = RelationService<UserId, RoleId>;

/// Relation service for role permission grants.
pub type RolePermissionService = RelationService<RoleId, PermissionId>;

/// Relation service for service role visibility.
pub type ServiceRoleService = RelationService<ServiceId, RoleId>;

impl<A, B> RelationService<A, B>
where
    A: EntityId,
    B: EntityId,
{
    /// Creates a relation service over a repository implementation.
    #[must_use]
    pub fn new(kind: RelationKind, repository: Arc<dyn RelationRepository<A, B>>) -> Self {
        Self { kind, repository }
    }

    /// Returns the relation this service manages.
    #[must_use]
    pub fn kind(&self) -> RelationKind {
        self.kind
    }

    /// Lists targets linked to a source.
    pub async fn list_targets(&self, source: A) -> AppResult<Vec<B>> {
        self.repository
            .list_targets(source)
            .await
            .map_err(|error| error.into_store_failure(StoreOperation::Fetch))
    }

    /// Lists sources linked to a target.
    pub async fn list_sources(&self, target: B) -> AppResult<Vec<A>> {
        self.repository
            .list_sources(target)
            .await
            .map_err(|error| error.into_store_failure(StoreOperation::Fetch))
    }

    /// Lists targets for many sources with one repository call.
    pub async fn list_targets_for_sources(&self, sources: &[A]) -> AppResult<HashMap<A, Vec<B>>> {
        let sources = dedupe(sources.iter().copied());
        if sources.is_empty() {
            return Ok(HashMap::new());
        }

        self.repository
            .list_targets_for_sources(&sources)
            .await
            .map_err(|error| error.into_store_failure(StoreOperation::Fetch))
    }

    /// Lists sources for many targets with one repository call.
    pub async fn list_sources_for_targets(&self, targets: &[B]) -> AppResult<HashMap<B, Vec<A>>> {
        let targets = dedupe(targets.iter().copied());
        if targets.is_empty() {
            return Ok(HashMap::new());
        }

        self.repository
            .list_sources_for_targets(&targets)
            .await
            .map_err(|error| error.into_store_failure(StoreOperation::Fetch))
    }

    /// Returns whether the pair exists.
    pub async fn exists(&self, source: A, target: B) -> AppResult<bool> {
        self.repository
            .exists(source, target)
            .await
            .map_err(|error| error.into_store_failure(StoreOperation::Fetch))
    }

    /// Returns whether any source still references the target.
    pub async fn has_any_for_target(&self, target: B) -> AppResult<bool> {
        self.repository
            .has_any_for_target(target)
            .await
            .map_err(|error| error.into_store_failure(StoreOperation::Fetch))
    }

    /// Links one pair, failing with a conflict when it already exists.
    pub async fn assign(&self, source: A, target: B) -> AppResult<()> {
        let exists = self
            .repository
            .exists(source, target)
            .await
            .map_err(|error| error.into_store_failure(StoreOperation::Assign))?;
        if exists {
            return Err(self.already_exists(source, target));
        }

        // A concurrent writer can still win between the check and the insert;
        // the conditional insert reports that as "not inserted".
        let inserted = self
            .repository
            .insert(source, target)
            .await
            .map_err(|error| error.into_store_failure(StoreOperation::Assign))?;
        if !inserted {
            return Err(self.already_exists(source, target));
        }

        info!(
            relation = self.kind.as_str(),
            source = %source,
            target = %target,
            "relation assigned"
        );
        Ok(())
    }

    /// Removes one pair, failing with not-found when nothing was deleted.
    pub async fn revoke(&self, source: A, target: B) -> AppResult<()> {
        let rows_affected = self
            .repository
            .delete(source, target)
            .await
            .map_err(|error| error.into_store_failure(StoreOperation::Revoke))?;

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "{} {source} is not linked to {} {target}",
                A::LABEL,
                B::LABEL
            )));
        }

        info!(
            relation = self.kind.as_str(),
            source = %source,
            target = %target,
            "relation revoked"
        );
        Ok(())
    }

    /// Links many targets, skipping pairs that already exist.
    pub async fn assign_multiple(&self, source: A, targets: &[B]) -> AppResult<BatchAssignResult<B>> {
        let requested = dedupe(targets.iter().copied());
        if requested.is_empty() {
            return Ok(BatchAssignResult {
                assigned: 0,
                skipped: 0,
                duplicates: Vec::new(),
                new_assignments: Vec::new(),
            });
        }

        let existing: HashSet<B> = self
            .repository
            .list_existing_targets(source, &requested)
            .await
            .map_err(|error| error.into_store_failure(StoreOperation::AssignMultiple))?
            .into_iter()
            .collect();

        let (duplicates, new_assignments): (Vec<B>, Vec<B>) = requested
            .into_iter()
            .partition(|target| existing.contains(target));

        if !new_assignments.is_empty() {
            self.repository
                .insert_many(source, &new_assignments)
                .await
                .map_err(|error| error.into_store_failure(StoreOperation::AssignMultiple))?;
        }

        info!(
            relation = self.kind.as_str(),
            source = %source,
            assigned = new_assignments.len(),
            skipped = duplicates.len(),
            "relations assigned in batch"
        );

        Ok(BatchAssignResult {
            assigned: new_assignments.len(),
            skipped: duplicates.len(),
            duplicates,
            new_assignments,
        })
    }

    /// Removes the given targets from a source. Missing pairs are ignored.
    pub async fn revoke_multiple(&self, source: A, targets: &[B]) -> AppResult<u64> {
        let targets = dedupe(targets.iter().copied());
        if targets.is_empty() {
            return Ok(0);
        }

        let removed = self
            .repository
            .delete_many(source, &targets)
            .await
            .map_err(|error| error.into_store_failure(StoreOperation::RevokeMultiple))?;

        info!(
            relation = self.kind.as_str(),
            source = %source,
            requested = targets.len(),
            removed,
            "relations revoked in batch"
        );
        Ok(removed)
    }

    /// Replaces every target of a source in one transaction and returns the new set.
    pub async fn replace_all(&self, source: A, targets: &[B]) -> AppResult<Vec<B>> {
        let targets = dedupe(targets.iter().copied());

        self.repository
            .replace_all(source, &targets)
            .await
            .map_err(|error| error.into_store_failure(StoreOperation::Replace))?;

        info!(
            relation = self.kind.as_str(),
            source = %source,
            count = targets.len(),
            "relations replaced"
        );
        debug!(relation = self.kind.as_str(), source = %source, ?targets, "replacement set");
        Ok(targets)
    }

    fn already_exists(&self, source: A, target: B) -> AppError {
        AppError::Conflict(format!(
            "{} {source} is already linked to {} {target}",
            A::LABEL,
            B::LABEL
        ))
    }
}

/// The three relation services shared by entity services and the engine.
#[derive(Clone)]
pub struct AccessRelations {
    /// Users holding roles.
    pub user_roles: UserRoleService,
    /// Roles granting permissions.
    pub role_permissions: RolePermissionService,
    /// Roles visible per service.
    pub service_roles: ServiceRoleService,
}

impl AccessRelations {
    /// Builds relation services from repository implementations.
    #[must_use]
    pub fn new(
        user_roles: Arc<UserRoleRepository>,
        role_permissions: Arc<RolePermissionRepository>,
        service_roles: Arc<ServiceRoleRepository>,
    ) -> Self {
        Self {
            user_roles: RelationService::new(RelationKind::UserRole, user_roles),
            role_permissions: RelationService::new(RelationKind::RolePermission, role_permissions),
            service_roles: RelationService::new(RelationKind::ServiceVisibleRole, service_roles),
        }
    }
}

/// Removes repeated values while keeping first-seen order.
pub(crate) fn dedupe<T>(values: impl IntoIterator<Item = T>) -> Vec<T>
where
    T: Copy + Eq + Hash,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(*value))
        .collect()
}
