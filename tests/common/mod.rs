#![allow(dead_code)]

use std::time::Duration;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use pantry_api::app::{self, AppState};
use pantry_api::auth::TokenKeys;
use pantry_api::config::{AppConfig, DatabaseConfig, PasswordConfig};
use pantry_api::database::DatabaseManager;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "pantry-test-secret";

/// Lazy pool against the test database. Requests that never reach the
/// database never open a connection, so most tests run without Postgres.
pub fn test_pool() -> Result<PgPool> {
    let url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/pantry_test".to_string());

    let config = DatabaseConfig {
        url,
        max_connections: 2,
        acquire_timeout_secs: 2,
    };
    Ok(DatabaseManager::connect_lazy(&config)?)
}

pub fn test_config() -> Result<AppConfig> {
    let mut config = AppConfig::from_lookup(|name| match name {
        "APP_ENV" => Some("test".to_string()),
        "SECRET_KEY" => Some(TEST_SECRET.to_string()),
        _ => None,
    })?;
    config.passwords = PasswordConfig::minimal();
    Ok(config)
}

pub fn test_state(pool: PgPool) -> Result<AppState> {
    AppState::from_config(pool, &test_config()?)
}

pub fn test_app() -> Result<Router> {
    let state = test_state(test_pool()?)?;
    Ok(app::router(state, &[]))
}

pub fn token_for(username: &str) -> Result<String> {
    Ok(TokenKeys::new(TEST_SECRET, None)?.issue(username)?)
}

/// Drive one request through the router and decode the JSON body
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = tokio::time::timeout(Duration::from_secs(10), app.clone().oneshot(request)).await??;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };

    Ok((status, json))
}
