//! Full flows against a live Postgres. Run with:
//! DATABASE_URL=postgres://localhost/pantry_test cargo test -- --ignored

mod common;

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use pantry_api::app;
use pantry_api::database::DatabaseManager;
use reqwest::StatusCode;
use serde_json::{json, Value};

struct LiveServer {
    base_url: String,
    client: reqwest::Client,
}

impl LiveServer {
    async fn start() -> Result<Self> {
        let pool = common::test_pool()?;
        DatabaseManager::run_migrations(&pool).await?;

        let router = app::router(common::test_state(pool)?, &[]);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let base_url = format!("http://{}", listener.local_addr()?);

        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self {
            base_url,
            client: reqwest::Client::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Username unique per run, within the 30 character limit
fn unique_username(prefix: &str) -> Result<String> {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
    Ok(format!("{}{}", prefix, nanos % 1_000_000_000_000))
}

/// Catalog ids are client supplied, so derive one per run
fn unique_id() -> Result<i32> {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH)?.subsec_nanos();
    Ok((nanos % 1_000_000_000) as i32 + 1)
}

async fn register(server: &LiveServer, username: &str) -> Result<String> {
    let res = server
        .client
        .post(server.url("/auth/register"))
        .json(&json!({
            "username": username,
            "password": "password1",
            "firstName": "Test",
            "lastName": "User",
            "email": "test@example.com"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: Value = res.json().await?;
    Ok(body["data"]["token"].as_str().unwrap_or_default().to_string())
}

#[tokio::test]
#[ignore = "requires Postgres at DATABASE_URL"]
async fn health_reports_database_ok() -> Result<()> {
    let server = LiveServer::start().await?;

    let res = server.client.get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
#[ignore = "requires Postgres at DATABASE_URL"]
async fn register_login_and_duplicate() -> Result<()> {
    let server = LiveServer::start().await?;
    let username = unique_username("reg")?;

    let token = register(&server, &username).await?;
    assert!(!token.is_empty());

    let res = server
        .client
        .post(server.url("/auth/register"))
        .json(&json!({
            "username": username,
            "password": "password1",
            "firstName": "Test",
            "lastName": "User",
            "email": "test@example.com"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(
        body["error"],
        json!(format!("{} is already taken, try a different one.", username))
    );

    let res = server
        .client
        .post(server.url("/auth/login"))
        .json(&json!({"username": username, "password": "password1"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = server
        .client
        .post(server.url("/auth/login"))
        .json(&json!({"username": username, "password": "wrong-password"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
#[ignore = "requires Postgres at DATABASE_URL"]
async fn update_checks_password_and_maps_columns() -> Result<()> {
    let server = LiveServer::start().await?;
    let username = unique_username("upd")?;
    let token = register(&server, &username).await?;
    let path = server.url(&format!("/users/{}", username));

    let res = server
        .client
        .patch(&path)
        .bearer_auth(&token)
        .json(&json!({"password": "wrong-password", "firstName": "Ann"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server
        .client
        .patch(&path)
        .bearer_auth(&token)
        .json(&json!({"password": "password1", "firstName": "Ann", "email": "ann@example.com"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["user"]["firstName"], json!("Ann"));
    assert_eq!(body["data"]["user"]["email"], json!("ann@example.com"));

    // The verification password is never written
    let res = server
        .client
        .post(server.url("/auth/login"))
        .json(&json!({"username": username, "password": "password1"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
#[ignore = "requires Postgres at DATABASE_URL"]
async fn save_catalog_items_and_delete_user() -> Result<()> {
    let server = LiveServer::start().await?;
    let username = unique_username("sav")?;
    let token = register(&server, &username).await?;
    let id = unique_id()?;

    let res = server
        .client
        .post(server.url("/cocktails"))
        .bearer_auth(&token)
        .json(&json!({"id": id, "name": "Negroni", "instructions": "Stir.", "img_url": "n.jpg"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let save = server.url(&format!("/users/{}/cocktails/{}", username, id));
    for _ in 0..2 {
        let res = server.client.post(&save).bearer_auth(&token).send().await?;
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = server
        .client
        .post(server.url(&format!("/users/{}/recipes/{}", username, id)))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let user_path = server.url(&format!("/users/{}", username));
    let res = server.client.get(&user_path).bearer_auth(&token).send().await?;
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["user"]["savedCocktails"], json!([id]));
    assert_eq!(body["data"]["user"]["savedRecipes"], json!([]));

    let res = server
        .client
        .delete(server.url(&format!("/cocktails/{}", id)))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = server.client.delete(&user_path).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["deleted"], json!(username));

    let res = server.client.get(&user_path).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
