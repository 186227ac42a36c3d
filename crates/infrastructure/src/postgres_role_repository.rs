use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use rolegate_application::{Page, PageRequest, RoleRepository, RoleSearchFilter};
use rolegate_core::{AppError, AppResult};
use rolegate_domain::{EntityId, Role, RoleId, RolePriority, ServiceId};

use crate::page_bounds;

/// PostgreSQL-backed repository for roles.
#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    priority: i16,
    service_id: Uuid,
}

impl TryFrom<RoleRow> for Role {
    type Error = AppError;

    fn try_from(row: RoleRow) -> Result<Self, Self::Error> {
        let priority = u8::try_from(row.priority)
            .map_err(|_| {
                AppError::Internal(format!(
                    "role '{}' has invalid priority {}",
                    row.id, row.priority
                ))
            })
            .and_then(RolePriority::new)?;

        Role::new(
            RoleId::from_uuid(row.id),
            row.name,
            row.description,
            priority,
            ServiceId::from_uuid(row.service_id),
        )
    }
}

fn map_role_write_error(error: sqlx::Error, role: &Role) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(format!(
            "role '{}' in service {}",
            role.name(),
            role.service_id()
        ));
    }

    AppError::Internal(format!("failed to persist role: {error}"))
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn find_by_id(&self, id: RoleId) -> AppResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, priority, service_id
            FROM roles
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load role: {error}")))?;

        row.map(Role::try_from).transpose()
    }

    async fn find_by_ids(&self, ids: &[RoleId]) -> AppResult<Vec<Role>> {
        let ids: Vec<Uuid> = ids.iter().map(EntityId::as_uuid).collect();
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, priority, service_id
            FROM roles
            WHERE id = ANY($1) AND deleted_at IS NULL
            ORDER BY priority, name
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load roles: {error}")))?;

        rows.into_iter().map(Role::try_from).collect()
    }

    async fn find_by_name(&self, service_id: ServiceId, name: &str) -> AppResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, priority, service_id
            FROM roles
            WHERE service_id = $1
                AND lower(name) = lower($2)
                AND deleted_at IS NULL
            "#,
        )
        .bind(service_id.as_uuid())
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve role name: {error}")))?;

        row.map(Role::try_from).transpose()
    }

    async fn search(&self, filter: &RoleSearchFilter, page: PageRequest) -> AppResult<Page<Role>> {
        let service_id = filter.service_id.map(|id| id.as_uuid());
        let name_contains = filter.name_contains.as_deref().map(str::trim);
        let (limit, offset) = page_bounds(page)?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM roles
            WHERE deleted_at IS NULL
                AND ($1::uuid IS NULL OR service_id = $1)
                AND ($2::text IS NULL OR strpos(lower(name), lower($2)) > 0)
            "#,
        )
        .bind(service_id)
        .bind(name_contains)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to count roles: {error}")))?;

        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, priority, service_id
            FROM roles
            WHERE deleted_at IS NULL
                AND ($1::uuid IS NULL OR service_id = $1)
                AND ($2::text IS NULL OR strpos(lower(name), lower($2)) > 0)
            ORDER BY priority, name, id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(service_id)
        .bind(name_contains)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to search roles: {error}")))?;

        Ok(Page {
            items: rows
                .into_iter()
                .map(Role::try_from)
                .collect::<AppResult<Vec<_>>>()?,
            total: u64::try_from(total).unwrap_or_default(),
            limit: page.limit(),
            offset: page.offset(),
        })
    }

    async fn insert(&self, role: &Role) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO roles (id, name, description, priority, service_id)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(role.id().as_uuid())
        .bind(role.name().as_str())
        .bind(role.description())
        .bind(i16::from(role.priority().value()))
        .bind(role.service_id().as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| map_role_write_error(error, role))?;

        Ok(())
    }

    async fn update(&self, role: &Role) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE roles
            SET name = $2, description = $3, priority = $4, updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(role.id().as_uuid())
        .bind(role.name().as_str())
        .bind(role.description())
        .bind(i16::from(role.priority().value()))
        .execute(&self.pool)
        .await
        .map_err(|error| map_role_write_error(error, role))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("role {} was not found", role.id())));
        }

        Ok(())
    }

    async fn soft_delete(&self, id: RoleId) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE roles
            SET deleted_at = now(), updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete role: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("role {id} was not found")));
        }

        Ok(())
    }
}
