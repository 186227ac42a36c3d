use axum::Json;
use axum::extract::State;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use rolegate_core::{AppError, AppResult};

use super::authorization;
use crate::dto::{RpcRequest, UserRequest, UserScopeRequest};
use crate::error::ApiResult;
use crate::state::AppState;

/// Single RPC entry point for sibling services.
///
/// Methods mirror the REST authorization endpoints and share their
/// implementation, so both front-ends answer identically.
pub async fn rpc_handler(
    State(state): State<AppState>,
    Json(request): Json<RpcRequest>,
) -> ApiResult<Json<Value>> {
    debug!(method = request.method.as_str(), "rpc call");

    let result = match request.method.as_str() {
        "checkPermission" => {
            encode(authorization::check_permission(&state, decode(request.params)?).await?)
        }
        "checkRole" => encode(authorization::check_role(&state, decode(request.params)?).await?),
        "listPermissions" => {
            let params: UserScopeRequest = decode(request.params)?;
            encode(
                authorization::list_permissions(
                    &state,
                    &params.user_id,
                    params.service_id.as_deref(),
                )
                .await?,
            )
        }
        "listRoles" => {
            let params: UserScopeRequest = decode(request.params)?;
            encode(
                authorization::list_roles(&state, &params.user_id, params.service_id.as_deref())
                    .await?,
            )
        }
        "listAvailableServices" => {
            let params: UserRequest = decode(request.params)?;
            encode(authorization::list_available_services(&state, &params.user_id).await?)
        }
        other => Err(AppError::NotFound(format!("unknown rpc method '{other}'"))),
    }?;

    Ok(Json(result))
}

fn decode<T: DeserializeOwned>(params: Value) -> AppResult<T> {
    serde_json::from_value(params)
        .map_err(|error| AppError::Validation(format!("invalid rpc params: {error}")))
}

fn encode<T: Serialize>(value: T) -> AppResult<Value> {
    serde_json::to_value(value)
        .map_err(|error| AppError::Internal(format!("failed to encode rpc result: {error}")))
}
