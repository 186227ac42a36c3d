use std::collections::HashMap;
use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use rolegate_application::RelationRepository;
use rolegate_core::{AppError, AppResult};
use rolegate_domain::{EntityId, PermissionId, RoleId, ServiceId, UserId};

/// SQL statements for one join table, rendered once at construction.
#[derive(Debug)]
struct RelationStatements {
    list_targets: String,
    list_sources: String,
    list_targets_for_sources: String,
    list_sources_for_targets: String,
    list_existing_targets: String,
    exists: String,
    has_any_for_target: String,
    insert: String,
    insert_many: String,
    delete: String,
    delete_many: String,
    delete_all_for_source: String,
}

impl RelationStatements {
    fn new(table: &str, source: &str, target: &str) -> Self {
        Self {
            list_targets: format!(
                "SELECT {target} FROM {table} WHERE {source} = $1 ORDER BY created_at, {target}"
            ),
            list_sources: format!(
                "SELECT {source} FROM {table} WHERE {target} = $1 ORDER BY created_at, {source}"
            ),
            list_targets_for_sources: format!(
                "SELECT {source}, {target} FROM {table} WHERE {source} = ANY($1) \
                 ORDER BY created_at, {target}"
            ),
            list_sources_for_targets: format!(
                "SELECT {target}, {source} FROM {table} WHERE {target} = ANY($1) \
                 ORDER BY created_at, {source}"
            ),
            list_existing_targets: format!(
                "SELECT {target} FROM {table} WHERE {source} = $1 AND {target} = ANY($2)"
            ),
            exists: format!(
                "SELECT EXISTS (SELECT 1 FROM {table} WHERE {source} = $1 AND {target} = $2)"
            ),
            has_any_for_target: format!(
                "SELECT EXISTS (SELECT 1 FROM {table} WHERE {target} = $1)"
            ),
            insert: format!(
                "INSERT INTO {table} ({source}, {target}) VALUES ($1, $2) ON CONFLICT DO NOTHING"
            ),
            insert_many: format!(
                "INSERT INTO {table} ({source}, {target}) \
                 SELECT $1, targets.id FROM UNNEST($2::uuid[]) AS targets(id) \
                 ON CONFLICT DO NOTHING"
            ),
            delete: format!("DELETE FROM {table} WHERE {source} = $1 AND {target} = $2"),
            delete_many: format!(
                "DELETE FROM {table} WHERE {source} = $1 AND {target} = ANY($2)"
            ),
            delete_all_for_source: format!("DELETE FROM {table} WHERE {source} = $1"),
        }
    }
}

/// PostgreSQL-backed repository for one join table.
pub struct PostgresRelationRepository<A, B> {
    pool: PgPool,
    table: &'static str,
    statements: RelationStatements,
    marker: PhantomData<fn() -> (A, B)>,
}

impl<A, B> PostgresRelationRepository<A, B> {
    fn with_table(pool: PgPool, table: &'static str, source: &str, target: &str) -> Self {
        Self {
            pool,
            table,
            statements: RelationStatements::new(table, source, target),
            marker: PhantomData,
        }
    }
}

impl PostgresRelationRepository<UserId, RoleId> {
    /// Repository over `user_roles`.
    #[must_use]
    pub fn user_roles(pool: PgPool) -> Self {
        Self::with_table(pool, "user_roles", "user_id", "role_id")
    }
}

impl PostgresRelationRepository<RoleId, PermissionId> {
    /// Repository over `role_permissions`.
    #[must_use]
    pub fn role_permissions(pool: PgPool) -> Self {
        Self::with_table(pool, "role_permissions", "role_id", "permission_id")
    }
}

impl PostgresRelationRepository<ServiceId, RoleId> {
    /// Repository over `service_visible_roles`.
    #[must_use]
    pub fn service_visible_roles(pool: PgPool) -> Self {
        Self::with_table(pool, "service_visible_roles", "service_id", "role_id")
    }
}

impl<A, B> PostgresRelationRepository<A, B>
where
    A: EntityId,
    B: EntityId,
{
    fn failure(&self, action: &str, error: sqlx::Error) -> AppError {
        // 23503: a referenced role or permission row does not exist.
        if let sqlx::Error::Database(database_error) = &error
            && database_error.code().as_deref() == Some("23503")
        {
            return AppError::NotFound(format!(
                "cannot link {} to a missing {} in {}",
                A::LABEL,
                B::LABEL,
                self.table
            ));
        }

        AppError::Internal(format!("failed to {action} in {}: {error}", self.table))
    }
}

fn uuids<T: EntityId>(ids: &[T]) -> Vec<Uuid> {
    ids.iter().map(EntityId::as_uuid).collect()
}

#[async_trait]
impl<A, B> RelationRepository<A, B> for PostgresRelationRepository<A, B>
where
    A: EntityId,
    B: EntityId,
{
    async fn list_targets(&self, source: A) -> AppResult<Vec<B>> {
        let rows = sqlx::query_scalar::<_, Uuid>(self.statements.list_targets.as_str())
            .bind(source.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|error| self.failure("list targets", error))?;

        Ok(rows.into_iter().map(B::from_uuid).collect())
    }

    async fn list_sources(&self, target: B) -> AppResult<Vec<A>> {
        let rows = sqlx::query_scalar::<_, Uuid>(self.statements.list_sources.as_str())
            .bind(target.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|error| self.failure("list sources", error))?;

        Ok(rows.into_iter().map(A::from_uuid).collect())
    }

    async fn list_targets_for_sources(&self, sources: &[A]) -> AppResult<HashMap<A, Vec<B>>> {
        let rows =
            sqlx::query_as::<_, (Uuid, Uuid)>(self.statements.list_targets_for_sources.as_str())
                .bind(uuids(sources))
                .fetch_all(&self.pool)
                .await
                .map_err(|error| self.failure("batch list targets", error))?;

        let mut grouped: HashMap<A, Vec<B>> = HashMap::new();
        for (source, target) in rows {
            grouped
                .entry(A::from_uuid(source))
                .or_default()
                .push(B::from_uuid(target));
        }
        Ok(grouped)
    }

    async fn list_sources_for_targets(&self, targets: &[B]) -> AppResult<HashMap<B, Vec<A>>> {
        let rows =
            sqlx::query_as::<_, (Uuid, Uuid)>(self.statements.list_sources_for_targets.as_str())
                .bind(uuids(targets))
                .fetch_all(&self.pool)
                .await
                .map_err(|error| self.failure("batch list sources", error))?;

        let mut grouped: HashMap<B, Vec<A>> = HashMap::new();
        for (target, source) in rows {
            grouped
                .entry(B::from_uuid(target))
                .or_default()
                .push(A::from_uuid(source));
        }
        Ok(grouped)
    }

    async fn list_existing_targets(&self, source: A, candidates: &[B]) -> AppResult<Vec<B>> {
        let rows = sqlx::query_scalar::<_, Uuid>(self.statements.list_existing_targets.as_str())
            .bind(source.as_uuid())
            .bind(uuids(candidates))
            .fetch_all(&self.pool)
            .await
            .map_err(|error| self.failure("list existing targets", error))?;

        Ok(rows.into_iter().map(B::from_uuid).collect())
    }

    async fn exists(&self, source: A, target: B) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(self.statements.exists.as_str())
            .bind(source.as_uuid())
            .bind(target.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|error| self.failure("check relation", error))
    }

    async fn has_any_for_target(&self, target: B) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(self.statements.has_any_for_target.as_str())
            .bind(target.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|error| self.failure("check dependents", error))
    }

    async fn insert(&self, source: A, target: B) -> AppResult<bool> {
        let result = sqlx::query(self.statements.insert.as_str())
            .bind(source.as_uuid())
            .bind(target.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| self.failure("insert relation", error))?;

        Ok(result.rows_affected() == 1)
    }

    async fn insert_many(&self, source: A, targets: &[B]) -> AppResult<u64> {
        let result = sqlx::query(self.statements.insert_many.as_str())
            .bind(source.as_uuid())
            .bind(uuids(targets))
            .execute(&self.pool)
            .await
            .map_err(|error| self.failure("insert relations", error))?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, source: A, target: B) -> AppResult<u64> {
        let result = sqlx::query(self.statements.delete.as_str())
            .bind(source.as_uuid())
            .bind(target.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| self.failure("delete relation", error))?;

        Ok(result.rows_affected())
    }

    async fn delete_many(&self, source: A, targets: &[B]) -> AppResult<u64> {
        let result = sqlx::query(self.statements.delete_many.as_str())
            .bind(source.as_uuid())
            .bind(uuids(targets))
            .execute(&self.pool)
            .await
            .map_err(|error| self.failure("delete relations", error))?;

        Ok(result.rows_affected())
    }

    async fn replace_all(&self, source: A, targets: &[B]) -> AppResult<()> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        sqlx::query(self.statements.delete_all_for_source.as_str())
            .bind(source.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(|error| self.failure("clear relations", error))?;

        if !targets.is_empty() {
            sqlx::query(self.statements.insert_many.as_str())
                .bind(source.as_uuid())
                .bind(uuids(targets))
                .execute(&mut *transaction)
                .await
                .map_err(|error| self.failure("insert relations", error))?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(())
    }
}
