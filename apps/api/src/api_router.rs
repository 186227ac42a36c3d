use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::handlers::relations::{RolePermissions, ServiceRoles, UserRoles};
use crate::state::AppState;
use crate::{handlers, middleware};

mod relations;

use relations::relation_routes;

pub fn build_router(app_state: AppState) -> Router {
    let protected_routes = Router::new()
        .route(
            "/api/authorization/check-permission",
            post(handlers::authorization::check_permission_handler),
        )
        .route(
            "/api/authorization/check-role",
            post(handlers::authorization::check_role_handler),
        )
        .route(
            "/api/users/{user_id}/permissions",
            get(handlers::authorization::list_user_permissions_handler),
        )
        .route(
            "/api/users/{user_id}/roles",
            get(handlers::authorization::list_user_roles_handler),
        )
        .route(
            "/api/users/{user_id}/services",
            get(handlers::authorization::list_available_services_handler),
        )
        .route(
            "/api/roles",
            get(handlers::roles::search_roles_handler).post(handlers::roles::create_role_handler),
        )
        .route(
            "/api/roles/{role_id}",
            get(handlers::roles::get_role_handler)
                .patch(handlers::roles::update_role_handler)
                .delete(handlers::roles::delete_role_handler),
        )
        .route(
            "/api/roles/{role_id}/members",
            get(handlers::roles::list_role_members_handler),
        )
        .route(
            "/api/permissions",
            get(handlers::permissions::search_permissions_handler)
                .post(handlers::permissions::create_permission_handler),
        )
        .route(
            "/api/permissions/by-action",
            get(handlers::permissions::find_permissions_by_action_handler),
        )
        .route(
            "/api/permissions/{permission_id}",
            get(handlers::permissions::get_permission_handler)
                .patch(handlers::permissions::update_permission_handler)
                .delete(handlers::permissions::delete_permission_handler),
        )
        .nest("/api/relations/user-roles", relation_routes::<UserRoles>())
        .nest(
            "/api/relations/role-permissions",
            relation_routes::<RolePermissions>(),
        )
        .nest(
            "/api/relations/service-roles",
            relation_routes::<ServiceRoles>(),
        )
        .route("/rpc", post(handlers::rpc::rpc_handler))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_internal_token,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
