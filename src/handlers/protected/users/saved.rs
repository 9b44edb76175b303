use axum::extract::{rejection::PathRejection, Path, State};
use serde::Serialize;

use crate::app::AppState;
use crate::database::models::CatalogKind;
use crate::middleware::{ApiResponse, ApiResult, AuthState};
use crate::services::user_service;

#[derive(Debug, Serialize)]
pub struct SavedItem {
    pub saved: i32,
}

async fn save(
    state: AppState,
    auth: AuthState,
    path: Result<Path<(String, i32)>, PathRejection>,
    kind: CatalogKind,
) -> ApiResult<SavedItem> {
    let Path((username, id)) = path?;
    auth.require_owner(&username)?;

    user_service::save_item(&state.pool, &username, kind, id).await?;
    Ok(ApiResponse::success(SavedItem { saved: id }))
}

/// POST /users/:username/recipes/:id
pub async fn save_recipe_post(
    State(state): State<AppState>,
    auth: AuthState,
    path: Result<Path<(String, i32)>, PathRejection>,
) -> ApiResult<SavedItem> {
    save(state, auth, path, CatalogKind::Recipe).await
}

/// POST /users/:username/cocktails/:id
pub async fn save_cocktail_post(
    State(state): State<AppState>,
    auth: AuthState,
    path: Result<Path<(String, i32)>, PathRejection>,
) -> ApiResult<SavedItem> {
    save(state, auth, path, CatalogKind::Cocktail).await
}
