use async_trait::async_trait;
use rolegate_core::AppResult;
use rolegate_domain::{DirectoryService, DirectoryUser, ServiceId, UserId};

/// Read-only port to the service directory owned by the portal.
#[async_trait]
pub trait ServiceDirectory: Send + Sync {
    /// Finds one service by id.
    async fn find_by_id(&self, id: ServiceId) -> AppResult<Option<DirectoryService>>;

    /// Finds many services in a single request. Unknown ids are omitted.
    async fn find_by_ids(&self, ids: &[ServiceId]) -> AppResult<Vec<DirectoryService>>;

    /// Lists every registered service.
    async fn list_services(&self) -> AppResult<Vec<DirectoryService>>;
}

/// Read-only port to the user directory owned by the identity service.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Finds many users in a single request. Unknown ids are omitted.
    async fn find_by_ids(&self, ids: &[UserId]) -> AppResult<Vec<DirectoryUser>>;
}
