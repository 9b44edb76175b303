use axum::extract::{
    rejection::{JsonRejection, PathRejection},
    Path, State,
};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::app::AppState;
use crate::database::models::{User, UserProfile};
use crate::handlers::utils::parse_user_changes;
use crate::middleware::{ApiResponse, ApiResult, AuthState};
use crate::services::user_service;

#[derive(Debug, Serialize)]
pub struct UserBody<T> {
    pub user: T,
}

#[derive(Debug, Serialize)]
pub struct DeletedUser {
    pub deleted: String,
}

/// GET /users/:username - Profile plus saved recipe and cocktail ids
pub async fn user_get(
    State(state): State<AppState>,
    auth: AuthState,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<UserBody<UserProfile>> {
    let Path(username) = path?;
    auth.require_owner(&username)?;

    let user = user_service::get(&state.pool, &username).await?;
    Ok(ApiResponse::success(UserBody { user }))
}

/// PATCH /users/:username - Update first name, last name or email
///
/// The body must carry the current `password`, which is checked and never stored.
pub async fn user_patch(
    State(state): State<AppState>,
    auth: AuthState,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<UserBody<User>> {
    let Path(username) = path?;
    auth.require_owner(&username)?;

    let Json(body) = payload?;
    let changes = parse_user_changes(body)?;

    let user = user_service::update(&state.pool, &state.passwords, &username, changes).await?;
    tracing::info!("Updated user '{}'", username);

    Ok(ApiResponse::success(UserBody { user }))
}

/// DELETE /users/:username - Remove the account and its saved items
pub async fn user_delete(
    State(state): State<AppState>,
    auth: AuthState,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<DeletedUser> {
    let Path(username) = path?;
    auth.require_owner(&username)?;

    user_service::remove(&state.pool, &username).await?;
    tracing::info!("Deleted user '{}'", username);

    Ok(ApiResponse::success(DeletedUser { deleted: username }))
}
