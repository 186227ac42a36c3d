use async_trait::async_trait;
use sqlx::PgPool;

use rolegate_application::AuthorizationRepository;
use rolegate_core::{AppError, AppResult};
use rolegate_domain::{EntityId, ServiceId, UserId};

/// PostgreSQL single-query permission lookup.
#[derive(Clone)]
pub struct PostgresAuthorizationRepository {
    pool: PgPool,
}

impl PostgresAuthorizationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthorizationRepository for PostgresAuthorizationRepository {
    async fn user_has_action(
        &self,
        user_id: UserId,
        action: &str,
        service_id: Option<ServiceId>,
    ) -> AppResult<bool> {
        // Join rows outlive soft-deleted roles, so role liveness is checked here.
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM user_roles
                INNER JOIN roles
                    ON roles.id = user_roles.role_id
                    AND roles.deleted_at IS NULL
                INNER JOIN role_permissions
                    ON role_permissions.role_id = user_roles.role_id
                INNER JOIN permissions
                    ON permissions.id = role_permissions.permission_id
                    AND permissions.deleted_at IS NULL
                WHERE user_roles.user_id = $1
                    AND permissions.action = $2
                    AND (
                        $3::uuid IS NULL
                        OR (
                            permissions.service_id = $3
                            AND EXISTS (
                                SELECT 1
                                FROM service_visible_roles
                                WHERE service_visible_roles.service_id = $3
                                    AND service_visible_roles.role_id = user_roles.role_id
                            )
                        )
                    )
            )
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(action)
        .bind(service_id.map(|id| id.as_uuid()))
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to evaluate permission: {error}")))
    }
}
