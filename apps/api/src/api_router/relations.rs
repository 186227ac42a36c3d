use axum::Router;
use axum::routing::{get, post};

use crate::handlers::relations::{
    RelationEndpoint, assign_relation_handler, batch_assign_relation_handler,
    batch_revoke_relation_handler, list_relation_targets_handler, replace_relation_handler,
    revoke_relation_handler,
};
use crate::state::AppState;

/// Assign, revoke, batch and replace routes for one relation.
pub(super) fn relation_routes<R: RelationEndpoint>() -> Router<AppState> {
    Router::new()
        .route(
            "/{source_id}/targets",
            get(list_relation_targets_handler::<R>).put(replace_relation_handler::<R>),
        )
        .route(
            "/{source_id}/targets/{target_id}",
            post(assign_relation_handler::<R>).delete(revoke_relation_handler::<R>),
        )
        .route(
            "/{source_id}/batch-assign",
            post(batch_assign_relation_handler::<R>),
        )
        .route(
            "/{source_id}/batch-revoke",
            post(batch_revoke_relation_handler::<R>),
        )
}
