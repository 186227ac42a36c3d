use async_trait::async_trait;
use rolegate_core::AppResult;
use rolegate_domain::{Permission, PermissionId, Role, RoleId, ServiceId};

/// Offset pagination with a clamped page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    limit: usize,
    offset: usize,
}

impl PageRequest {
    /// Default page size.
    pub const DEFAULT_LIMIT: usize = 20;
    /// Largest accepted page size.
    pub const MAX_LIMIT: usize = 100;

    /// Builds a page request, clamping the limit to `1..=MAX_LIMIT`.
    #[must_use]
    pub fn new(limit: Option<usize>, offset: Option<usize>) -> Self {
        Self {
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
            offset: offset.unwrap_or(0),
        }
    }

    /// Returns the page size.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the number of skipped rows.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results with the unpaginated total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Total matching items.
    pub total: u64,
    /// Applied page size.
    pub limit: usize,
    /// Applied offset.
    pub offset: usize,
}

impl<T> Page<T> {
    /// Maps page items while keeping pagination metadata.
    pub fn map<U>(self, transform: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(transform).collect(),
            total: self.total,
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// Role search criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSearchFilter {
    /// Restrict to roles owned by one service.
    pub service_id: Option<ServiceId>,
    /// Case-insensitive name fragment.
    pub name_contains: Option<String>,
}

/// Permission search criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSearchFilter {
    /// Restrict to permissions owned by one service.
    pub service_id: Option<ServiceId>,
    /// Action fragment.
    pub action_contains: Option<String>,
}

/// Input payload for role creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Role name, unique within the service.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional priority, defaults to the middle of the range.
    pub priority: Option<u8>,
    /// Owning service.
    pub service_id: ServiceId,
}

/// Partial role update. Absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateRoleInput {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New priority.
    pub priority: Option<u8>,
}

/// Input payload for permission creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePermissionInput {
    /// Action string, unique within the service.
    pub action: String,
    /// Optional description.
    pub description: Option<String>,
    /// Owning service.
    pub service_id: ServiceId,
}

/// Partial permission update. Absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdatePermissionInput {
    /// New action string.
    pub action: Option<String>,
    /// New description.
    pub description: Option<String>,
}

/// Repository port for roles. Soft-deleted rows are invisible to every read.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Finds one role.
    async fn find_by_id(&self, id: RoleId) -> AppResult<Option<Role>>;

    /// Finds many roles. Unknown ids are omitted.
    async fn find_by_ids(&self, ids: &[RoleId]) -> AppResult<Vec<Role>>;

    /// Finds a role by name inside a service, ignoring case.
    async fn find_by_name(&self, service_id: ServiceId, name: &str) -> AppResult<Option<Role>>;

    /// Searches roles ordered by priority then name.
    async fn search(&self, filter: &RoleSearchFilter, page: PageRequest) -> AppResult<Page<Role>>;

    /// Inserts a new role.
    async fn insert(&self, role: &Role) -> AppResult<()>;

    /// Persists changes to an existing role.
    async fn update(&self, role: &Role) -> AppResult<()>;

    /// Marks a role deleted.
    async fn soft_delete(&self, id: RoleId) -> AppResult<()>;
}

/// Repository port for permissions. Soft-deleted rows are invisible to every read.
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Finds one permission.
    async fn find_by_id(&self, id: PermissionId) -> AppResult<Option<Permission>>;

    /// Finds many permissions. Unknown ids are omitted.
    async fn find_by_ids(&self, ids: &[PermissionId]) -> AppResult<Vec<Permission>>;

    /// Finds permissions with the exact action, optionally inside one service.
    async fn find_by_action(
        &self,
        action: &str,
        service_id: Option<ServiceId>,
    ) -> AppResult<Vec<Permission>>;

    /// Searches permissions ordered by action.
    async fn search(
        &self,
        filter: &PermissionSearchFilter,
        page: PageRequest,
    ) -> AppResult<Page<Permission>>;

    /// Inserts a new permission.
    async fn insert(&self, permission: &Permission) -> AppResult<()>;

    /// Persists changes to an existing permission.
    async fn update(&self, permission: &Permission) -> AppResult<()>;

    /// Marks a permission deleted.
    async fn soft_delete(&self, id: PermissionId) -> AppResult<()>;
}
