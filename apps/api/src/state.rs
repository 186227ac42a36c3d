use std::sync::Arc;

use rolegate_application::{AccessRelations, AuthorizationService, PermissionService, RoleService};
use sqlx::PgPool;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub role_service: RoleService,
    pub permission_service: PermissionService,
    pub authorization_service: AuthorizationService,
    pub relations: AccessRelations,
    pub postgres_pool: PgPool,
    pub internal_api_token: Arc<str>,
}
