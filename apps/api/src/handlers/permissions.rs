use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use rolegate_application::{
    CreatePermissionInput, PageRequest, PermissionSearchFilter, UpdatePermissionInput,
};
use rolegate_domain::{PermissionId, ServiceId};

use super::parse_optional_id;
use crate::dto::{
    CreatePermissionRequest, PermissionByActionQuery, PermissionPageResponse, PermissionResponse,
    PermissionSearchQuery, PermissionSummaryResponse, UpdatePermissionRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn search_permissions_handler(
    State(state): State<AppState>,
    Query(query): Query<PermissionSearchQuery>,
) -> ApiResult<Json<PermissionPageResponse>> {
    let filter = PermissionSearchFilter {
        service_id: parse_optional_id::<ServiceId>(query.service_id.as_deref())?,
        action_contains: query.action.filter(|action| !action.trim().is_empty()),
    };

    let page = state
        .permission_service
        .search(&filter, PageRequest::new(query.limit, query.offset))
        .await?;

    Ok(Json(PermissionPageResponse::from(page)))
}

pub async fn find_permissions_by_action_handler(
    State(state): State<AppState>,
    Query(query): Query<PermissionByActionQuery>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let service_id = parse_optional_id::<ServiceId>(query.service_id.as_deref())?;
    let permissions = state
        .permission_service
        .find_by_action(query.action.trim(), service_id)
        .await?
        .into_iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn create_permission_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreatePermissionRequest>,
) -> ApiResult<(StatusCode, Json<PermissionResponse>)> {
    let permission = state
        .permission_service
        .create(CreatePermissionInput {
            action: payload.action,
            description: payload.description,
            service_id: ServiceId::from_transport(&payload.service_id)?,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(PermissionResponse::from(permission))))
}

pub async fn get_permission_handler(
    State(state): State<AppState>,
    Path(permission_id): Path<String>,
) -> ApiResult<Json<PermissionSummaryResponse>> {
    let summary = state
        .permission_service
        .find_summary(PermissionId::from_transport(&permission_id)?)
        .await?;

    Ok(Json(PermissionSummaryResponse::from(summary)))
}

pub async fn update_permission_handler(
    State(state): State<AppState>,
    Path(permission_id): Path<String>,
    Json(payload): Json<UpdatePermissionRequest>,
) -> ApiResult<Json<PermissionResponse>> {
    let permission = state
        .permission_service
        .update(
            PermissionId::from_transport(&permission_id)?,
            UpdatePermissionInput {
                action: payload.action,
                description: payload.description,
            },
        )
        .await?;

    Ok(Json(PermissionResponse::from(permission)))
}

pub async fn delete_permission_handler(
    State(state): State<AppState>,
    Path(permission_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .permission_service
        .delete(PermissionId::from_transport(&permission_id)?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
