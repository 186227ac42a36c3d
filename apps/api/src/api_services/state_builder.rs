use std::sync::Arc;

use rolegate_application::{
    AccessRelations, AuthorizationService, PermissionService, RoleService, ServiceDirectory,
    UserDirectory,
};
use rolegate_core::AppError;
use rolegate_infrastructure::{
    HttpDirectoryClient, HttpServiceDirectory, HttpUserDirectory, PostgresAuthorizationRepository,
    PostgresPermissionRepository, PostgresRelationRepository, PostgresRoleRepository,
};
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::state::AppState;

pub fn build_app_state(config: &ApiConfig, pool: PgPool) -> Result<AppState, AppError> {
    let directories = &config.directories;
    let service_directory: Arc<dyn ServiceDirectory> =
        Arc::new(HttpServiceDirectory::new(HttpDirectoryClient::new(
            directories.service_directory_url.clone(),
            directories.api_token.clone(),
            directories.timeout,
        )?));
    let user_directory: Arc<dyn UserDirectory> =
        Arc::new(HttpUserDirectory::new(HttpDirectoryClient::new(
            directories.user_directory_url.clone(),
            directories.api_token.clone(),
            directories.timeout,
        )?));

    let relations = AccessRelations::new(
        Arc::new(PostgresRelationRepository::user_roles(pool.clone())),
        Arc::new(PostgresRelationRepository::role_permissions(pool.clone())),
        Arc::new(PostgresRelationRepository::service_visible_roles(
            pool.clone(),
        )),
    );
    let role_service = RoleService::new(
        Arc::new(PostgresRoleRepository::new(pool.clone())),
        relations.clone(),
        service_directory.clone(),
        user_directory,
    );
    let permission_service = PermissionService::new(
        Arc::new(PostgresPermissionRepository::new(pool.clone())),
        relations.clone(),
        service_directory.clone(),
    );
    let authorization_service = AuthorizationService::new(
        relations.clone(),
        role_service.clone(),
        permission_service.clone(),
        service_directory,
    )
    .with_combined_query(Arc::new(PostgresAuthorizationRepository::new(pool.clone())));

    Ok(AppState {
        role_service,
        permission_service,
        authorization_service,
        relations,
        postgres_pool: pool,
        internal_api_token: Arc::from(config.internal_api_token.as_str()),
    })
}
