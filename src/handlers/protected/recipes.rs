use axum::extract::{
    rejection::{JsonRejection, PathRejection},
    Path, State,
};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::app::AppState;
use crate::database::models::{CatalogItem, CatalogKind};
use crate::handlers::utils::{parse_body, validate_catalog_item};
use crate::middleware::{ApiResponse, ApiResult, AuthState};
use crate::services::catalog_service;

#[derive(Debug, Serialize)]
pub struct RecipeBody {
    pub recipe: CatalogItem,
}

/// POST /recipes - Add a recipe; names are unique
pub async fn recipe_post(
    State(state): State<AppState>,
    auth: AuthState,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<RecipeBody> {
    auth.require_authenticated()?;

    let Json(body) = payload?;
    let item: CatalogItem = parse_body(body)?;
    validate_catalog_item(&item)?;

    let recipe = catalog_service::create(&state.pool, CatalogKind::Recipe, item).await?;
    Ok(ApiResponse::created(RecipeBody { recipe }))
}

/// GET /recipes/:id
pub async fn recipe_get(
    State(state): State<AppState>,
    auth: AuthState,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<RecipeBody> {
    auth.require_authenticated()?;
    let Path(id) = path?;

    let recipe = catalog_service::get(&state.pool, CatalogKind::Recipe, id).await?;
    Ok(ApiResponse::success(RecipeBody { recipe }))
}
