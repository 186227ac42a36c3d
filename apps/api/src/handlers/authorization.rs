use axum::Json;
use axum::extract::{Path, Query, State};

use rolegate_core::NonEmptyString;
use rolegate_domain::{ServiceId, UserId};

use super::parse_optional_id;
use crate::dto::{
    CheckPermissionRequest, CheckPermissionResponse, CheckRoleRequest, CheckRoleResponse,
    ServiceResponse, UserScopeQuery,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn check_permission_handler(
    State(state): State<AppState>,
    Json(payload): Json<CheckPermissionRequest>,
) -> ApiResult<Json<CheckPermissionResponse>> {
    check_permission(&state, payload).await.map(Json)
}

pub async fn check_role_handler(
    State(state): State<AppState>,
    Json(payload): Json<CheckRoleRequest>,
) -> ApiResult<Json<CheckRoleResponse>> {
    check_role(&state, payload).await.map(Json)
}

pub async fn list_user_permissions_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<UserScopeQuery>,
) -> ApiResult<Json<Vec<String>>> {
    list_permissions(&state, &user_id, query.service_id.as_deref())
        .await
        .map(Json)
}

pub async fn list_user_roles_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<UserScopeQuery>,
) -> ApiResult<Json<Vec<String>>> {
    list_roles(&state, &user_id, query.service_id.as_deref())
        .await
        .map(Json)
}

pub async fn list_available_services_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<ServiceResponse>>> {
    list_available_services(&state, &user_id).await.map(Json)
}

pub(super) async fn check_permission(
    state: &AppState,
    request: CheckPermissionRequest,
) -> ApiResult<CheckPermissionResponse> {
    let user_id = UserId::from_transport(&request.user_id)?;
    let action = NonEmptyString::new(request.action)?;
    let service_id = parse_optional_id::<ServiceId>(request.service_id.as_deref())?;

    let has_permission = state
        .authorization_service
        .check_permission(user_id, action.as_str(), service_id)
        .await;

    Ok(CheckPermissionResponse { has_permission })
}

pub(super) async fn check_role(
    state: &AppState,
    request: CheckRoleRequest,
) -> ApiResult<CheckRoleResponse> {
    let user_id = UserId::from_transport(&request.user_id)?;
    let role_name = NonEmptyString::new(request.role_name)?;
    let service_id = parse_optional_id::<ServiceId>(request.service_id.as_deref())?;

    let has_role = state
        .authorization_service
        .check_role(user_id, role_name.as_str(), service_id)
        .await;

    Ok(CheckRoleResponse { has_role })
}

pub(super) async fn list_permissions(
    state: &AppState,
    user_id: &str,
    service_id: Option<&str>,
) -> ApiResult<Vec<String>> {
    let user_id = UserId::from_transport(user_id)?;
    let service_id = parse_optional_id::<ServiceId>(service_id)?;

    Ok(state
        .authorization_service
        .list_effective_permissions(user_id, service_id)
        .await
        .iter()
        .map(ToString::to_string)
        .collect())
}

pub(super) async fn list_roles(
    state: &AppState,
    user_id: &str,
    service_id: Option<&str>,
) -> ApiResult<Vec<String>> {
    let user_id = UserId::from_transport(user_id)?;
    let service_id = parse_optional_id::<ServiceId>(service_id)?;

    Ok(state
        .authorization_service
        .list_effective_roles(user_id, service_id)
        .await
        .iter()
        .map(ToString::to_string)
        .collect())
}

pub(super) async fn list_available_services(
    state: &AppState,
    user_id: &str,
) -> ApiResult<Vec<ServiceResponse>> {
    let user_id = UserId::from_transport(user_id)?;

    Ok(state
        .authorization_service
        .list_available_services(user_id)
        .await
        .into_iter()
        .map(ServiceResponse::from)
        .collect())
}
