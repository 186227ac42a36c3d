//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_directory_client;
mod in_memory_access_store;
mod postgres_authorization_repository;
mod postgres_permission_repository;
mod postgres_relation_repository;
mod postgres_role_repository;

use rolegate_application::PageRequest;
use rolegate_core::{AppError, AppResult};

pub use http_directory_client::{HttpDirectoryClient, HttpServiceDirectory, HttpUserDirectory};
pub use in_memory_access_store::{
    InMemoryAccessStore, InMemoryAuthorizationRepository, InMemoryPermissionRepository,
    InMemoryRelationRepository, InMemoryRoleRepository, InMemoryServiceDirectory,
    InMemoryUserDirectory,
};
pub use postgres_authorization_repository::PostgresAuthorizationRepository;
pub use postgres_permission_repository::PostgresPermissionRepository;
pub use postgres_relation_repository::PostgresRelationRepository;
pub use postgres_role_repository::PostgresRoleRepository;

/// Converts a clamped page request into SQL `LIMIT`/`OFFSET` values.
pub(crate) fn page_bounds(page: PageRequest) -> AppResult<(i64, i64)> {
    let limit = i64::try_from(page.limit())
        .map_err(|_| AppError::Validation(format!("page limit {} is too large", page.limit())))?;
    let offset = i64::try_from(page.offset()).map_err(|_| {
        AppError::Validation(format!("page offset {} is too large", page.offset()))
    })?;

    Ok((limit, offset))
}

#[cfg(test)]
mod tests {
    use rolegate_application::PageRequest;

    use super::page_bounds;

    #[test]
    fn page_bounds_follow_clamped_request() {
        assert_eq!(
            page_bounds(PageRequest::new(Some(500), Some(40))).ok(),
            Some((100, 40))
        );
        assert_eq!(page_bounds(PageRequest::default()).ok(), Some((20, 0)));
    }
}
