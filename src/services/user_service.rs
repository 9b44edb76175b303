use sqlx::PgPool;

use crate::auth::PasswordHasher;
use crate::database::models::{CatalogKind, NewUser, User, UserChanges, UserProfile, USER_COLUMNS};
use crate::database::{bind_value, build_partial_update, DatabaseError};
use crate::error::ApiError;

const USER_COLUMNS_SQL: &str = "id, username, first_name, last_name, email";

#[derive(sqlx::FromRow)]
struct StoredCredentials {
    password: String,
    #[sqlx(flatten)]
    user: User,
}

/// Check a username/password pair and return the user
pub async fn authenticate(
    pool: &PgPool,
    passwords: &PasswordHasher,
    username: &str,
    password: &str,
) -> Result<User, ApiError> {
    let row = sqlx::query_as::<_, StoredCredentials>(&format!(
        "SELECT password, {} FROM users WHERE username = $1",
        USER_COLUMNS_SQL
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            if passwords
                .verify_blocking(password.to_string(), row.password)
                .await?
            {
                return Ok(row.user);
            }
        }
        None => {
            passwords.verify_missing_blocking(password.to_string()).await?;
        }
    }

    tracing::info!("Failed login for '{}'", username);
    Err(ApiError::unauthorized("Invalid username/password"))
}

/// Create a user; the username must be free
pub async fn register(
    pool: &PgPool,
    passwords: &PasswordHasher,
    new_user: NewUser,
) -> Result<User, ApiError> {
    let taken = || {
        ApiError::bad_request(format!(
            "{} is already taken, try a different one.",
            new_user.username
        ))
    };

    let duplicate: Option<i32> = sqlx::query_scalar("SELECT id FROM users WHERE username = $1")
        .bind(&new_user.username)
        .fetch_optional(pool)
        .await?;
    if duplicate.is_some() {
        return Err(taken());
    }

    let hashed = passwords.hash_blocking(new_user.password.clone()).await?;

    let result = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (username, password, first_name, last_name, email)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {}",
        USER_COLUMNS_SQL
    ))
    .bind(&new_user.username)
    .bind(&hashed)
    .bind(&new_user.first_name)
    .bind(&new_user.last_name)
    .bind(&new_user.email)
    .fetch_one(pool)
    .await
    .map_err(DatabaseError::from);

    match result {
        Ok(user) => Ok(user),
        // Lost a race with a concurrent registration
        Err(e) if e.is_unique_violation() => Err(taken()),
        Err(e) => Err(e.into()),
    }
}

/// Load a user with their saved recipe and cocktail ids
pub async fn get(pool: &PgPool, username: &str) -> Result<UserProfile, ApiError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE username = $1",
        USER_COLUMNS_SQL
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ApiError::not_found(format!("No User: {}", username)))?;

    let saved_recipes = saved_ids(pool, user.id, CatalogKind::Recipe).await?;
    let saved_cocktails = saved_ids(pool, user.id, CatalogKind::Cocktail).await?;

    Ok(UserProfile {
        user,
        saved_recipes,
        saved_cocktails,
    })
}

async fn saved_ids(pool: &PgPool, user_id: i32, kind: CatalogKind) -> Result<Vec<i32>, ApiError> {
    let sql = format!(
        "SELECT {column} FROM {table} WHERE user_id = $1 ORDER BY {column}",
        column = kind.saved_column(),
        table = kind.saved_table()
    );

    Ok(sqlx::query_scalar(&sql).bind(user_id).fetch_all(pool).await?)
}

/// Apply a partial update after re-checking the user's current password
pub async fn update(
    pool: &PgPool,
    passwords: &PasswordHasher,
    username: &str,
    changes: UserChanges,
) -> Result<User, ApiError> {
    // Reject empty updates before touching the database
    let named = changes.named();
    let update = build_partial_update(&named, &USER_COLUMNS)?;

    let stored: Option<String> = sqlx::query_scalar("SELECT password FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    let stored = stored.ok_or_else(|| ApiError::not_found(format!("No user: {}", username)))?;

    if !passwords.verify_blocking(changes.password, stored).await? {
        return Err(ApiError::unauthorized("Invalid username/password."));
    }

    let sql = format!(
        "UPDATE users SET {} WHERE username = ${} RETURNING {}",
        update.clause,
        update.next_placeholder(),
        USER_COLUMNS_SQL
    );

    tracing::debug!("Updating user '{}': {}", username, update.clause);

    let mut q = sqlx::query_as::<_, User>(&sql);
    for value in &update.values {
        q = bind_value(q, value);
    }

    q.bind(username)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No user: {}", username)))
}

pub async fn remove(pool: &PgPool, username: &str) -> Result<(), ApiError> {
    let deleted: Option<String> =
        sqlx::query_scalar("DELETE FROM users WHERE username = $1 RETURNING username")
            .bind(username)
            .fetch_optional(pool)
            .await?;

    match deleted {
        Some(_) => Ok(()),
        None => Err(ApiError::not_found(format!("No user: {}", username))),
    }
}

/// Bookmark a recipe or cocktail for a user. Saving twice is a no-op.
pub async fn save_item(
    pool: &PgPool,
    username: &str,
    kind: CatalogKind,
    item_id: i32,
) -> Result<(), ApiError> {
    let item: Option<i32> = sqlx::query_scalar(&format!("SELECT id FROM {} WHERE id = $1", kind.table()))
        .bind(item_id)
        .fetch_optional(pool)
        .await?;
    if item.is_none() {
        return Err(ApiError::not_found(format!("No {} with id: {}", kind.label(), item_id)));
    }

    let user_id: Option<i32> = sqlx::query_scalar("SELECT id FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    let user_id = user_id.ok_or_else(|| ApiError::not_found(format!("No user: {}", username)))?;

    sqlx::query(&format!(
        "INSERT INTO {} (user_id, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        kind.saved_table(),
        kind.saved_column()
    ))
    .bind(user_id)
    .bind(item_id)
    .execute(pool)
    .await?;

    tracing::debug!("User '{}' saved {} {}", username, kind.label(), item_id);
    Ok(())
}
