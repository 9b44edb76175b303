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
pub struct CocktailBody {
    pub cocktail: CatalogItem,
}

#[derive(Debug, Serialize)]
pub struct DeletedCocktail {
    pub deleted: i32,
}

/// POST /cocktails - Add a cocktail
pub async fn cocktail_post(
    State(state): State<AppState>,
    auth: AuthState,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<CocktailBody> {
    auth.require_authenticated()?;

    let Json(body) = payload?;
    let item: CatalogItem = parse_body(body)?;
    validate_catalog_item(&item)?;

    let cocktail = catalog_service::create(&state.pool, CatalogKind::Cocktail, item).await?;
    Ok(ApiResponse::created(CocktailBody { cocktail }))
}

/// GET /cocktails/:id
pub async fn cocktail_get(
    State(state): State<AppState>,
    auth: AuthState,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<CocktailBody> {
    auth.require_authenticated()?;
    let Path(id) = path?;

    let cocktail = catalog_service::get(&state.pool, CatalogKind::Cocktail, id).await?;
    Ok(ApiResponse::success(CocktailBody { cocktail }))
}

/// DELETE /cocktails/:id
pub async fn cocktail_delete(
    State(state): State<AppState>,
    auth: AuthState,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<DeletedCocktail> {
    auth.require_authenticated()?;
    let Path(id) = path?;

    catalog_service::remove(&state.pool, CatalogKind::Cocktail, id).await?;
    tracing::info!("Deleted cocktail {}", id);

    Ok(ApiResponse::success(DeletedCocktail { deleted: id }))
}
