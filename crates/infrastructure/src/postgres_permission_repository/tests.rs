use rolegate_application::{PageRequest, PermissionRepository, PermissionSearchFilter};
use rolegate_core::AppError;
use rolegate_domain::{Permission, PermissionId, ServiceId};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use super::PostgresPermissionRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres permission tests: {error}");
    }

    Some(pool)
}

fn permission(action: &str, service_id: ServiceId) -> Permission {
    Permission::new(PermissionId::new(), action, None, service_id)
        .unwrap_or_else(|_| unreachable!())
}

#[tokio::test]
async fn duplicate_action_in_service_is_a_conflict() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresPermissionRepository::new(pool);
    let service_id = ServiceId::new();
    assert!(
        repository
            .insert(&permission("invoice:approve", service_id))
            .await
            .is_ok()
    );

    let duplicate = repository
        .insert(&permission("invoice:approve", service_id))
        .await;
    let elsewhere = repository
        .insert(&permission("invoice:approve", ServiceId::new()))
        .await;

    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
    assert!(elsewhere.is_ok());
}

#[tokio::test]
async fn soft_delete_hides_permission_and_frees_action() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresPermissionRepository::new(pool);
    let service_id = ServiceId::new();
    let archive = permission("invoice:archive", service_id);
    assert!(repository.insert(&archive).await.is_ok());

    assert!(repository.soft_delete(archive.id()).await.is_ok());

    assert_eq!(repository.find_by_id(archive.id()).await.ok(), Some(None));
    assert_eq!(
        repository
            .find_by_action("invoice:archive", Some(service_id))
            .await
            .ok(),
        Some(Vec::new())
    );
    assert!(matches!(
        repository.soft_delete(archive.id()).await,
        Err(AppError::NotFound(_))
    ));
    assert!(
        repository
            .insert(&permission("invoice:archive", service_id))
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn search_filters_by_service_and_action_fragment() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresPermissionRepository::new(pool);
    let service_id = ServiceId::new();
    for action in ["ledger:read", "ledger:write", "report:read"] {
        assert!(repository.insert(&permission(action, service_id)).await.is_ok());
    }
    assert!(
        repository
            .insert(&permission("ledger:read", ServiceId::new()))
            .await
            .is_ok()
    );

    let page = repository
        .search(
            &PermissionSearchFilter {
                service_id: Some(service_id),
                action_contains: Some("ledger".to_owned()),
            },
            PageRequest::new(Some(1), Some(1)),
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    let actions: Vec<&str> = page
        .items
        .iter()
        .map(|permission| permission.action().as_str())
        .collect();
    assert_eq!(page.total, 2);
    assert_eq!(actions, vec!["ledger:write"]);
}

#[tokio::test]
async fn update_of_missing_permission_is_not_found() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresPermissionRepository::new(pool);

    let result = repository
        .update(&permission("ghost:touch", ServiceId::new()))
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}
