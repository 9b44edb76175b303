use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{PasswordHasher, TokenKeys};
use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::authenticate;

/// Shared handler state. Cloned per request, so everything here is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub keys: Arc<TokenKeys>,
    pub passwords: PasswordHasher,
}

impl AppState {
    pub fn from_config(pool: PgPool, config: &AppConfig) -> anyhow::Result<Self> {
        let keys = TokenKeys::new(
            &config.security.secret_key,
            config.security.jwt_expiry_hours,
        )?;
        let passwords = PasswordHasher::new(&config.passwords)?;

        Ok(Self {
            pool,
            keys: Arc::new(keys),
            passwords,
        })
    }
}

/// Build the full router. Every route sits behind the credential gate.
pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes())
        .merge(user_routes())
        .merge(catalog_routes())
        .fallback(not_found)
        .layer(from_fn_with_state(state.keys.clone(), authenticate))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/auth/login", post(auth::login_post))
        .route("/auth/register", post(auth::register_post))
}

fn user_routes() -> Router<AppState> {
    use protected::users;

    Router::new()
        .route(
            "/users/:username",
            get(users::user_get)
                .patch(users::user_patch)
                .delete(users::user_delete),
        )
        .route("/users/:username/recipes/:id", post(users::save_recipe_post))
        .route("/users/:username/cocktails/:id", post(users::save_cocktail_post))
}

fn catalog_routes() -> Router<AppState> {
    use protected::{cocktails, recipes};

    Router::new()
        .route("/recipes", post(recipes::recipe_post))
        .route("/recipes/:id", get(recipes::recipe_get))
        .route("/cocktails", post(cocktails::cocktail_post))
        .route(
            "/cocktails/:id",
            get(cocktails::cocktail_get).delete(cocktails::cocktail_delete),
        )
}

/// No configured origins means any origin is allowed
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Pantry API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Recipe and cocktail catalog with per-user saved items",
            "endpoints": {
                "auth": "/auth/register, /auth/login (public - token acquisition)",
                "users": "/users/:username[/recipes/:id|/cocktails/:id] (owner only)",
                "recipes": "/recipes[/:id] (logged in)",
                "cocktails": "/cocktails[/:id] (logged in)",
                "health": "/health (public)"
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}

async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
