use std::sync::Arc;

use proptest::prelude::*;
use rolegate_application::{
    AuthorizationRepository, AuthorizationService, PageRequest, PermissionRepository,
    PermissionService, RelationRepository, RoleRepository, RoleSearchFilter, RoleService,
    ServiceDirectory, UserDirectory,
};
use rolegate_core::AppError;
use rolegate_domain::{
    DirectoryService, DirectoryUser, Permission, PermissionId, Role, RoleId, RolePriority,
    ServiceId, UserId,
};

use super::InMemoryAccessStore;

fn role(name: &str, service_id: ServiceId) -> Role {
    Role::new(
        RoleId::new(),
        name,
        None,
        RolePriority::default(),
        service_id,
    )
    .unwrap_or_else(|_| unreachable!())
}

fn permission(action: &str, service_id: ServiceId) -> Permission {
    Permission::new(PermissionId::new(), action, None, service_id)
        .unwrap_or_else(|_| unreachable!())
}

fn traversal_engine(store: &InMemoryAccessStore) -> AuthorizationService {
    let relations = store.access_relations();
    let role_service = RoleService::new(
        store.roles.clone(),
        relations.clone(),
        store.services.clone(),
        store.users.clone(),
    );
    let permission_service =
        PermissionService::new(store.permissions.clone(), relations.clone(), store.services.clone());
    AuthorizationService::new(
        relations,
        role_service,
        permission_service,
        store.services.clone(),
    )
}

#[tokio::test]
async fn role_names_are_unique_per_service_ignoring_case() {
    let store = InMemoryAccessStore::new();
    let service_id = ServiceId::new();

    assert!(store.roles.insert(&role("admin", service_id)).await.is_ok());
    let duplicate = store.roles.insert(&role("ADMIN", service_id)).await;
    let elsewhere = store.roles.insert(&role("admin", ServiceId::new())).await;

    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
    assert!(elsewhere.is_ok());
}

#[tokio::test]
async fn soft_deleted_roles_disappear_from_reads_and_free_their_name() {
    let store = InMemoryAccessStore::new();
    let service_id = ServiceId::new();
    let admin = role("admin", service_id);
    assert!(store.roles.insert(&admin).await.is_ok());

    assert!(store.roles.soft_delete(admin.id()).await.is_ok());

    assert_eq!(store.roles.find_by_id(admin.id()).await.ok(), Some(None));
    assert_eq!(
        store.roles.find_by_ids(&[admin.id()]).await.ok(),
        Some(Vec::new())
    );
    assert!(matches!(
        store.roles.soft_delete(admin.id()).await,
        Err(AppError::NotFound(_))
    ));
    assert!(store.roles.insert(&role("admin", service_id)).await.is_ok());
}

#[tokio::test]
async fn role_search_orders_by_priority_and_paginates() {
    let store = InMemoryAccessStore::new();
    let service_id = ServiceId::new();
    for (name, priority) in [("viewer", 9), ("owner", 1), ("editor", 5)] {
        let role = Role::new(
            RoleId::new(),
            name,
            None,
            RolePriority::new(priority).unwrap_or_else(|_| unreachable!()),
            service_id,
        )
        .unwrap_or_else(|_| unreachable!());
        assert!(store.roles.insert(&role).await.is_ok());
    }

    let page = store
        .roles
        .search(
            &RoleSearchFilter {
                service_id: Some(service_id),
                name_contains: None,
            },
            PageRequest::new(Some(2), Some(0)),
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    let names: Vec<&str> = page.items.iter().map(|role| role.name().as_str()).collect();
    assert_eq!(names, vec!["owner", "editor"]);
    assert_eq!(page.total, 3);
}

#[tokio::test]
async fn relation_rows_are_scoped_by_source() {
    let store = InMemoryAccessStore::new();
    let first_user = UserId::new();
    let second_user = UserId::new();
    let viewer = role("viewer", ServiceId::new());
    let role_id = viewer.id();
    assert!(store.roles.insert(&viewer).await.is_ok());

    assert_eq!(store.user_roles.insert(first_user, role_id).await.ok(), Some(true));
    assert_eq!(store.user_roles.insert(first_user, role_id).await.ok(), Some(false));
    assert_eq!(
        store.user_roles.list_targets(second_user).await.ok(),
        Some(Vec::new())
    );
    assert_eq!(
        store.user_roles.list_sources(role_id).await.ok(),
        Some(vec![first_user])
    );
    assert_eq!(store.user_roles.delete(second_user, role_id).await.ok(), Some(0));
}

#[tokio::test]
async fn links_to_unknown_entities_are_not_found() {
    let store = InMemoryAccessStore::new();
    let service_id = ServiceId::new();
    let editor = role("editor", service_id);
    let read = permission("doc:read", service_id);
    assert!(store.roles.insert(&editor).await.is_ok());
    assert!(store.permissions.insert(&read).await.is_ok());

    let unknown_role = store.user_roles.insert(UserId::new(), RoleId::new()).await;
    let unknown_source = store
        .role_permissions
        .insert(RoleId::new(), read.id())
        .await;
    let partly_unknown = store
        .role_permissions
        .insert_many(editor.id(), &[read.id(), PermissionId::new()])
        .await;
    let replaced = store
        .service_roles
        .replace_all(service_id, &[editor.id(), RoleId::new()])
        .await;

    assert!(matches!(unknown_role, Err(AppError::NotFound(_))));
    assert!(matches!(unknown_source, Err(AppError::NotFound(_))));
    assert!(matches!(partly_unknown, Err(AppError::NotFound(_))));
    assert!(matches!(replaced, Err(AppError::NotFound(_))));
    assert_eq!(
        store.role_permissions.list_targets(editor.id()).await.ok(),
        Some(Vec::new())
    );
    assert_eq!(
        store.service_roles.list_targets(service_id).await.ok(),
        Some(Vec::new())
    );
}

#[tokio::test]
async fn soft_deleted_role_still_accepts_links_like_the_foreign_key() {
    let store = InMemoryAccessStore::new();
    let retired = role("retired", ServiceId::new());
    assert!(store.roles.insert(&retired).await.is_ok());
    assert!(store.roles.soft_delete(retired.id()).await.is_ok());

    let linked = store.user_roles.insert(UserId::new(), retired.id()).await;

    assert_eq!(linked.ok(), Some(true));
}

#[tokio::test]
async fn directories_return_only_known_records() {
    let store = InMemoryAccessStore::new();
    let service_id = ServiceId::new();
    let user_id = UserId::new();
    store
        .services
        .upsert(DirectoryService {
            id: service_id,
            name: "portal".to_owned(),
            description: None,
            is_public: true,
        })
        .await;
    store
        .users
        .upsert(DirectoryUser {
            id: user_id,
            username: "grace".to_owned(),
            email: Some("grace@example.com".to_owned()),
        })
        .await;

    let services = store
        .services
        .find_by_ids(&[service_id, ServiceId::new()])
        .await
        .unwrap_or_default();
    let users = store
        .users
        .find_by_ids(&[UserId::new(), user_id])
        .await
        .unwrap_or_default();

    assert_eq!(services.len(), 1);
    assert_eq!(users.first().map(|user| user.username.as_str()), Some("grace"));
}

#[tokio::test]
async fn combined_lookup_respects_service_scope() {
    let store = InMemoryAccessStore::new();
    let service_id = ServiceId::new();
    let other_service = ServiceId::new();
    let user_id = UserId::new();
    let editor = role("editor", service_id);
    let create = permission("user:create", service_id);
    assert!(store.roles.insert(&editor).await.is_ok());
    assert!(store.permissions.insert(&create).await.is_ok());
    assert!(store.user_roles.insert(user_id, editor.id()).await.is_ok());
    assert!(store.role_permissions.insert(editor.id(), create.id()).await.is_ok());
    assert!(store.service_roles.insert(service_id, editor.id()).await.is_ok());

    let repository = store.authorization_repository();

    assert_eq!(
        repository
            .user_has_action(user_id, "user:create", Some(service_id))
            .await
            .ok(),
        Some(true)
    );
    assert_eq!(
        repository
            .user_has_action(user_id, "user:create", Some(other_service))
            .await
            .ok(),
        Some(false)
    );
    assert_eq!(
        repository
            .user_has_action(user_id, "user:create", None)
            .await
            .ok(),
        Some(true)
    );
}

#[tokio::test]
async fn combined_lookup_ignores_soft_deleted_roles() {
    let store = InMemoryAccessStore::new();
    let service_id = ServiceId::new();
    let user_id = UserId::new();
    let editor = role("editor", service_id);
    let write = permission("doc:write", service_id);
    assert!(store.roles.insert(&editor).await.is_ok());
    assert!(store.permissions.insert(&write).await.is_ok());
    assert!(store.role_permissions.insert(editor.id(), write.id()).await.is_ok());
    assert!(store.roles.soft_delete(editor.id()).await.is_ok());
    assert!(store.user_roles.insert(user_id, editor.id()).await.is_ok());

    let combined = store
        .authorization_repository()
        .user_has_action(user_id, "doc:write", None)
        .await;
    let traversed = traversal_engine(&store)
        .check_permission(user_id, "doc:write", None)
        .await;

    assert_eq!(combined.ok(), Some(false));
    assert!(!traversed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn combined_lookup_sees_one_state_while_links_change() {
    let store = InMemoryAccessStore::new();
    let service_id = ServiceId::new();
    let user_id = UserId::new();
    let editor = role("editor", service_id);
    let write = permission("doc:write", service_id);
    assert!(store.roles.insert(&editor).await.is_ok());
    assert!(store.permissions.insert(&write).await.is_ok());
    assert!(store.user_roles.insert(user_id, editor.id()).await.is_ok());

    // The writer keeps the grant and the holder in lockstep, so the user can
    // never be granted without holding the role in any single state.
    let writer = {
        let store = store.clone();
        tokio::spawn(async move {
            for _ in 0..200 {
                let _ = store.user_roles.delete(user_id, editor.id()).await;
                let _ = store.role_permissions.insert(editor.id(), write.id()).await;
                let _ = store.role_permissions.delete(editor.id(), write.id()).await;
                let _ = store.user_roles.insert(user_id, editor.id()).await;
            }
        })
    };

    let repository = store.authorization_repository();
    for _ in 0..200 {
        let granted = repository.user_has_action(user_id, "doc:write", None).await;
        assert_eq!(granted.ok(), Some(false));
    }
    assert!(writer.await.is_ok());
}

#[derive(Debug, Clone)]
struct Universe {
    holds: Vec<(usize, usize)>,
    grants: Vec<(usize, usize)>,
    visible: Vec<(usize, usize)>,
    permission_services: Vec<usize>,
    permission_actions: Vec<usize>,
    deleted_permissions: Vec<usize>,
    deleted_roles: Vec<usize>,
}

const USERS: usize = 3;
const ROLES: usize = 4;
const PERMISSIONS: usize = 5;
const SERVICES: usize = 2;
const ACTIONS: [&str; 3] = ["doc:read", "doc:write", "doc:share"];

fn universe() -> impl Strategy<Value = Universe> {
    (
        proptest::collection::vec((0..USERS, 0..ROLES), 0..8),
        proptest::collection::vec((0..ROLES, 0..PERMISSIONS), 0..10),
        proptest::collection::vec((0..SERVICES, 0..ROLES), 0..6),
        proptest::collection::vec(0..SERVICES, PERMISSIONS),
        proptest::collection::vec(0..ACTIONS.len(), PERMISSIONS),
        proptest::collection::vec(0..PERMISSIONS, 0..2),
        proptest::collection::vec(0..ROLES, 0..2),
    )
        .prop_map(
            |(
                holds,
                grants,
                visible,
                permission_services,
                permission_actions,
                deleted_permissions,
                deleted_roles,
            )| Universe {
                holds,
                grants,
                visible,
                permission_services,
                permission_actions,
                deleted_permissions,
                deleted_roles,
            },
        )
}

async fn combined_matches_traversal(universe: Universe) -> Result<(), String> {
    let store = InMemoryAccessStore::new();
    let users: Vec<UserId> = (0..USERS).map(|_| UserId::new()).collect();
    let services: Vec<ServiceId> = (0..SERVICES).map(|_| ServiceId::new()).collect();
    let mut roles = Vec::new();
    for index in 0..ROLES {
        let role = role(&format!("role-{index}"), services[index % SERVICES]);
        roles.push(role.id());
        store.roles.insert(&role).await.map_err(|error| error.to_string())?;
    }
    let mut permissions = Vec::new();
    for index in 0..PERMISSIONS {
        let permission = Permission::new(
            PermissionId::new(),
            ACTIONS[universe.permission_actions[index]],
            None,
            services[universe.permission_services[index]],
        )
        .map_err(|error| error.to_string())?;
        permissions.push(permission.id());
        // Duplicate (action, service) pairs are rejected like the unique index would.
        let _ = store.permissions.insert(&permission).await;
    }
    for (user, role) in &universe.holds {
        store
            .user_roles
            .insert(users[*user], roles[*role])
            .await
            .map_err(|error| error.to_string())?;
    }
    for (role, permission) in &universe.grants {
        // Grants of a rejected duplicate permission point at no stored row.
        match store
            .role_permissions
            .insert(roles[*role], permissions[*permission])
            .await
        {
            Ok(_) | Err(AppError::NotFound(_)) => {}
            Err(error) => return Err(error.to_string()),
        }
    }
    for (service, role) in &universe.visible {
        store
            .service_roles
            .insert(services[*service], roles[*role])
            .await
            .map_err(|error| error.to_string())?;
    }
    for permission in &universe.deleted_permissions {
        let _ = store.permissions.soft_delete(permissions[*permission]).await;
    }
    for role in &universe.deleted_roles {
        let _ = store.roles.soft_delete(roles[*role]).await;
    }

    let engine = traversal_engine(&store);
    let combined = store.authorization_repository();
    let scopes: Vec<Option<ServiceId>> = std::iter::once(None)
        .chain(services.iter().copied().map(Some))
        .collect();

    for user_id in &users {
        for action in ACTIONS {
            for scope in &scopes {
                let traversed = engine.check_permission(*user_id, action, *scope).await;
                let joined = combined
                    .user_has_action(*user_id, action, *scope)
                    .await
                    .map_err(|error| error.to_string())?;
                if traversed != joined {
                    return Err(format!(
                        "user {user_id} action {action} scope {scope:?}: traversal {traversed}, combined {joined}"
                    ));
                }
            }
        }
    }

    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn combined_query_agrees_with_traversal(universe in universe()) {
        let Ok(runtime) = tokio::runtime::Builder::new_current_thread().enable_all().build() else {
            panic!("failed to build test runtime");
        };
        let outcome = runtime.block_on(combined_matches_traversal(universe));
        prop_assert_eq!(outcome, Ok(()));
    }
}

#[tokio::test]
async fn engine_with_combined_query_answers_like_traversal() {
    let store = InMemoryAccessStore::new();
    let service_id = ServiceId::new();
    let user_id = UserId::new();
    let editor = role("editor", service_id);
    let create = permission("user:create", service_id);
    assert!(store.roles.insert(&editor).await.is_ok());
    assert!(store.permissions.insert(&create).await.is_ok());
    assert!(store.user_roles.insert(user_id, editor.id()).await.is_ok());
    assert!(store.role_permissions.insert(editor.id(), create.id()).await.is_ok());
    assert!(store.service_roles.insert(service_id, editor.id()).await.is_ok());

    let engine = traversal_engine(&store)
        .with_combined_query(Arc::new(store.authorization_repository()));

    assert!(engine.check_permission(user_id, "user:create", Some(service_id)).await);
    assert!(!engine.check_permission(user_id, "user:delete", Some(service_id)).await);
}
