use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use rolegate_application::{CreateRoleInput, PageRequest, RoleSearchFilter, UpdateRoleInput};
use rolegate_domain::{RoleId, ServiceId};

use super::parse_optional_id;
use crate::dto::{
    CreateRoleRequest, RoleMemberResponse, RolePageResponse, RoleResponse, RoleSearchQuery,
    RoleSummaryResponse, UpdateRoleRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn search_roles_handler(
    State(state): State<AppState>,
    Query(query): Query<RoleSearchQuery>,
) -> ApiResult<Json<RolePageResponse>> {
    let filter = RoleSearchFilter {
        service_id: parse_optional_id::<ServiceId>(query.service_id.as_deref())?,
        name_contains: query.name.filter(|name| !name.trim().is_empty()),
    };

    let page = state
        .role_service
        .search(&filter, PageRequest::new(query.limit, query.offset))
        .await?;

    Ok(Json(RolePageResponse::from(page)))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let role = state
        .role_service
        .create(CreateRoleInput {
            name: payload.name,
            description: payload.description,
            priority: payload.priority,
            service_id: ServiceId::from_transport(&payload.service_id)?,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

pub async fn get_role_handler(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
) -> ApiResult<Json<RoleSummaryResponse>> {
    let summary = state
        .role_service
        .find_summary(RoleId::from_transport(&role_id)?)
        .await?;

    Ok(Json(RoleSummaryResponse::from(summary)))
}

pub async fn update_role_handler(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
    Json(payload): Json<UpdateRoleRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state
        .role_service
        .update(
            RoleId::from_transport(&role_id)?,
            UpdateRoleInput {
                name: payload.name,
                description: payload.description,
                priority: payload.priority,
            },
        )
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .role_service
        .delete(RoleId::from_transport(&role_id)?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_role_members_handler(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
) -> ApiResult<Json<Vec<RoleMemberResponse>>> {
    let members = state
        .role_service
        .list_members(RoleId::from_transport(&role_id)?)
        .await?
        .into_iter()
        .map(RoleMemberResponse::from)
        .collect();

    Ok(Json(members))
}
