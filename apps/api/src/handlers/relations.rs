use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use rolegate_application::RelationService;
use rolegate_core::AppError;
use rolegate_domain::{EntityId, PermissionId, RoleId, ServiceId, UserId};

use super::parse_ids;
use crate::dto::{
    BatchAssignResponse, BatchRevokeResponse, RelationTargetsRequest, RelationTargetsResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

/// Binds one relation service to a family of routes.
pub trait RelationEndpoint: Send + Sync + 'static {
    type Source: EntityId + FromStr<Err = AppError>;
    type Target: EntityId + FromStr<Err = AppError>;

    fn service(state: &AppState) -> &RelationService<Self::Source, Self::Target>;
}

/// `/api/relations/user-roles`
pub struct UserRoles;

/// `/api/relations/role-permissions`
pub struct RolePermissions;

/// `/api/relations/service-roles`
pub struct ServiceRoles;

impl RelationEndpoint for UserRoles {
    type Source = UserId;
    type Target = RoleId;

    fn service(state: &AppState) -> &RelationService<UserId, RoleId> {
        &state.relations.user_roles
    }
}

impl RelationEndpoint for RolePermissions {
    type Source = RoleId;
    type Target = PermissionId;

    fn service(state: &AppState) -> &RelationService<RoleId, PermissionId> {
        &state.relations.role_permissions
    }
}

impl RelationEndpoint for ServiceRoles {
    type Source = ServiceId;
    type Target = RoleId;

    fn service(state: &AppState) -> &RelationService<ServiceId, RoleId> {
        &state.relations.service_roles
    }
}

pub async fn list_relation_targets_handler<R: RelationEndpoint>(
    State(state): State<AppState>,
    Path(source_id): Path<String>,
) -> ApiResult<Json<RelationTargetsResponse>> {
    let source = source_id.parse::<R::Source>()?;
    let targets = R::service(&state).list_targets(source).await?;

    Ok(Json(RelationTargetsResponse::from_ids(targets)))
}

pub async fn assign_relation_handler<R: RelationEndpoint>(
    State(state): State<AppState>,
    Path((source_id, target_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let source = source_id.parse::<R::Source>()?;
    let target = target_id.parse::<R::Target>()?;
    R::service(&state).assign(source, target).await?;

    Ok(StatusCode::CREATED)
}

pub async fn revoke_relation_handler<R: RelationEndpoint>(
    State(state): State<AppState>,
    Path((source_id, target_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let source = source_id.parse::<R::Source>()?;
    let target = target_id.parse::<R::Target>()?;
    R::service(&state).revoke(source, target).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn batch_assign_relation_handler<R: RelationEndpoint>(
    State(state): State<AppState>,
    Path(source_id): Path<String>,
    Json(payload): Json<RelationTargetsRequest>,
) -> ApiResult<Json<BatchAssignResponse>> {
    let source = source_id.parse::<R::Source>()?;
    let targets = parse_ids::<R::Target>(&payload.target_ids)?;
    let result = R::service(&state).assign_multiple(source, &targets).await?;

    Ok(Json(BatchAssignResponse::from(result)))
}

pub async fn batch_revoke_relation_handler<R: RelationEndpoint>(
    State(state): State<AppState>,
    Path(source_id): Path<String>,
    Json(payload): Json<RelationTargetsRequest>,
) -> ApiResult<Json<BatchRevokeResponse>> {
    let source = source_id.parse::<R::Source>()?;
    let targets = parse_ids::<R::Target>(&payload.target_ids)?;
    let revoked = R::service(&state).revoke_multiple(source, &targets).await?;

    Ok(Json(BatchRevokeResponse { revoked }))
}

pub async fn replace_relation_handler<R: RelationEndpoint>(
    State(state): State<AppState>,
    Path(source_id): Path<String>,
    Json(payload): Json<RelationTargetsRequest>,
) -> ApiResult<Json<RelationTargetsResponse>> {
    let source = source_id.parse::<R::Source>()?;
    let targets = parse_ids::<R::Target>(&payload.target_ids)?;
    let replaced = R::service(&state).replace_all(source, &targets).await?;

    Ok(Json(RelationTargetsResponse::from_ids(replaced)))
}
