use std::collections::HashMap;

use async_trait::async_trait;
use rolegate_core::AppResult;
use rolegate_domain::{EntityId, PermissionId, RoleId, ServiceId, UserId};

/// Many-to-many relations managed by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// Users holding roles.
    UserRole,
    /// Roles granting permissions.
    RolePermission,
    /// Roles visible inside a service scope.
    ServiceVisibleRole,
}

impl RelationKind {
    /// Returns a stable identifier used in logs and messages.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserRole => "user_role",
            Self::RolePermission => "role_permission",
            Self::ServiceVisibleRole => "service_visible_role",
        }
    }
}

/// Repository port for one join relation between `A` (source) and `B` (target).
///
/// Adapters report raw failures as `AppError::Internal`; the relation service
/// tags them with the failing operation.
#[async_trait]
pub trait RelationRepository<A, B>: Send + Sync
where
    A: EntityId,
    B: EntityId,
{
    /// Lists targets linked to one source.
    async fn list_targets(&self, source: A) -> AppResult<Vec<B>>;

    /// Lists sources linked to one target.
    async fn list_sources(&self, target: B) -> AppResult<Vec<A>>;

    /// Lists targets for many sources in a single lookup.
    ///
    /// Sources without rows are absent from the map.
    async fn list_targets_for_sources(&self, sources: &[A]) -> AppResult<HashMap<A, Vec<B>>>;

    /// Lists sources for many targets in a single lookup.
    async fn list_sources_for_targets(&self, targets: &[B]) -> AppResult<HashMap<B, Vec<A>>>;

    /// Returns which of `candidates` are already linked to `source`.
    async fn list_existing_targets(&self, source: A, candidates: &[B]) -> AppResult<Vec<B>>;

    /// Returns whether the pair exists.
    async fn exists(&self, source: A, target: B) -> AppResult<bool>;

    /// Returns whether any source is linked to `target`.
    async fn has_any_for_target(&self, target: B) -> AppResult<bool>;

    /// Inserts one pair, returning `false` when it was already present.
    async fn insert(&self, source: A, target: B) -> AppResult<bool>;

    /// Inserts many pairs for one source, skipping present pairs. Returns inserted rows.
    async fn insert_many(&self, source: A, targets: &[B]) -> AppResult<u64>;

    /// Deletes one pair. Returns affected rows.
    async fn delete(&self, source: A, target: B) -> AppResult<u64>;

    /// Deletes many pairs for one source. Returns affected rows.
    async fn delete_many(&self, source: A, targets: &[B]) -> AppResult<u64>;

    /// Atomically replaces every target of `source` with `targets`.
    async fn replace_all(&self, source: A, targets: &[B]) -> AppResult<()>;
}

/// User to role relation port.
pub type UserRoleRepository = dyn RelationRepository<UserId, RoleId>;

/// Role to permission relation port.
pub type RolePermissionRepository = dyn RelationRepository<RoleId, PermissionId>;

/// Service to visible role relation port.
pub type ServiceRoleRepository = dyn RelationRepository<ServiceId, RoleId>;

/// Outcome of a batch assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchAssignResult<B> {
    /// Number of newly inserted pairs.
    pub assigned: usize,
    /// Number of requested targets that were already linked.
    pub skipped: usize,
    /// Targets that were already linked.
    pub duplicates: Vec<B>,
    /// Targets linked by this call.
    pub new_assignments: Vec<B>,
}
