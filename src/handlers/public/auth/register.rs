// handlers/public/auth/register.rs - POST /auth/register handler

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;
use serde_json::Value;

use crate::app::AppState;
use crate::database::models::NewUser;
use crate::handlers::utils::{parse_body, validate_new_user};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::user_service;

use super::TokenResponse;

/// POST /auth/register - Create an account and return a token for it
///
/// Input: `{ "username", "password", "firstName", "lastName", "email" }`
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<TokenResponse> {
    let Json(body) = payload?;
    let new_user: NewUser = parse_body(body)?;
    validate_new_user(&new_user)?;

    let user = user_service::register(&state.pool, &state.passwords, new_user).await?;
    let token = state.keys.issue(&user.username)?;
    tracing::info!("Registered user '{}'", user.username);

    Ok(ApiResponse::created(TokenResponse { token }))
}
