use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use rolegate_application::{Page, PageRequest, PermissionRepository, PermissionSearchFilter};
use rolegate_core::{AppError, AppResult};
use rolegate_domain::{EntityId, Permission, PermissionId, ServiceId};

use crate::page_bounds;

/// PostgreSQL-backed repository for permissions.
#[derive(Clone)]
pub struct PostgresPermissionRepository {
    pool: PgPool,
}

impl PostgresPermissionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    id: Uuid,
    action: String,
    description: Option<String>,
    service_id: Uuid,
}

impl TryFrom<PermissionRow> for Permission {
    type Error = AppError;

    fn try_from(row: PermissionRow) -> Result<Self, Self::Error> {
        Permission::new(
            PermissionId::from_uuid(row.id),
            row.action,
            row.description,
            ServiceId::from_uuid(row.service_id),
        )
    }
}

fn map_permission_write_error(error: sqlx::Error, permission: &Permission) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(format!(
            "permission '{}' in service {}",
            permission.action(),
            permission.service_id()
        ));
    }

    AppError::Internal(format!("failed to persist permission: {error}"))
}

#[async_trait]
impl PermissionRepository for PostgresPermissionRepository {
    async fn find_by_id(&self, id: PermissionId) -> AppResult<Option<Permission>> {
        let row = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, action, description, service_id
            FROM permissions
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load permission: {error}")))?;

        row.map(Permission::try_from).transpose()
    }

    async fn find_by_ids(&self, ids: &[PermissionId]) -> AppResult<Vec<Permission>> {
        let ids: Vec<Uuid> = ids.iter().map(EntityId::as_uuid).collect();
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, action, description, service_id
            FROM permissions
            WHERE id = ANY($1) AND deleted_at IS NULL
            ORDER BY action
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load permissions: {error}")))?;

        rows.into_iter().map(Permission::try_from).collect()
    }

    async fn find_by_action(
        &self,
        action: &str,
        service_id: Option<ServiceId>,
    ) -> AppResult<Vec<Permission>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, action, description, service_id
            FROM permissions
            WHERE action = $1
                AND ($2::uuid IS NULL OR service_id = $2)
                AND deleted_at IS NULL
            "#,
        )
        .bind(action)
        .bind(service_id.map(|id| id.as_uuid()))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to resolve permission action: {error}"))
        })?;

        rows.into_iter().map(Permission::try_from).collect()
    }

    async fn search(
        &self,
        filter: &PermissionSearchFilter,
        page: PageRequest,
    ) -> AppResult<Page<Permission>> {
        let service_id = filter.service_id.map(|id| id.as_uuid());
        let action_contains = filter.action_contains.as_deref().map(str::trim);
        let (limit, offset) = page_bounds(page)?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM permissions
            WHERE deleted_at IS NULL
                AND ($1::uuid IS NULL OR service_id = $1)
                AND ($2::text IS NULL OR strpos(action, $2) > 0)
            "#,
        )
        .bind(service_id)
        .bind(action_contains)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to count permissions: {error}")))?;

        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, action, description, service_id
            FROM permissions
            WHERE deleted_at IS NULL
                AND ($1::uuid IS NULL OR service_id = $1)
                AND ($2::text IS NULL OR strpos(action, $2) > 0)
            ORDER BY action, id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(service_id)
        .bind(action_contains)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to search permissions: {error}")))?;

        Ok(Page {
            items: rows
                .into_iter()
                .map(Permission::try_from)
                .collect::<AppResult<Vec<_>>>()?,
            total: u64::try_from(total).unwrap_or_default(),
            limit: page.limit(),
            offset: page.offset(),
        })
    }

    async fn insert(&self, permission: &Permission) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO permissions (id, action, description, service_id)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(permission.id().as_uuid())
        .bind(permission.action().as_str())
        .bind(permission.description())
        .bind(permission.service_id().as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| map_permission_write_error(error, permission))?;

        Ok(())
    }

    async fn update(&self, permission: &Permission) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE permissions
            SET action = $2, description = $3, updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(permission.id().as_uuid())
        .bind(permission.action().as_str())
        .bind(permission.description())
        .execute(&self.pool)
        .await
        .map_err(|error| map_permission_write_error(error, permission))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "permission {} was not found",
                permission.id()
            )));
        }

        Ok(())
    }

    async fn soft_delete(&self, id: PermissionId) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE permissions
            SET deleted_at = now(), updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete permission: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("permission {id} was not found")));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
