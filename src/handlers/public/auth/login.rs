// handlers/public/auth/login.rs - POST /auth/login handler

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::app::AppState;
use crate::handlers::utils::parse_body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::user_service;

use super::TokenResponse;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /auth/login - Check credentials and issue a token
///
/// Input: `{ "username": "...", "password": "..." }`
/// Unknown usernames and wrong passwords get the same 401.
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<TokenResponse> {
    let Json(body) = payload?;
    let request: LoginRequest = parse_body(body)?;

    let user = user_service::authenticate(
        &state.pool,
        &state.passwords,
        &request.username,
        &request.password,
    )
    .await?;

    let token = state.keys.issue(&user.username)?;
    tracing::info!("User '{}' logged in", user.username);

    Ok(ApiResponse::success(TokenResponse { token }))
}
