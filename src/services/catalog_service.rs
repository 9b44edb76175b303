use sqlx::PgPool;

use crate::database::models::{CatalogItem, CatalogKind};
use crate::database::DatabaseError;
use crate::error::ApiError;

fn duplicate(kind: CatalogKind, item: &CatalogItem) -> ApiError {
    ApiError::bad_request(format!("Duplicate {}: {}", kind.title(), item.name))
}

/// Insert a catalog item. Recipes must also have a unique name.
pub async fn create(pool: &PgPool, kind: CatalogKind, item: CatalogItem) -> Result<CatalogItem, ApiError> {
    if kind == CatalogKind::Recipe {
        let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM recipes WHERE name = $1")
            .bind(&item.name)
            .fetch_optional(pool)
            .await?;
        if existing.is_some() {
            return Err(duplicate(kind, &item));
        }
    }

    let result = sqlx::query_as::<_, CatalogItem>(&format!(
        "INSERT INTO {} (id, name, instructions, img_url)
         VALUES ($1, $2, $3, $4)
         RETURNING id, name, instructions, img_url",
        kind.table()
    ))
    .bind(item.id)
    .bind(&item.name)
    .bind(&item.instructions)
    .bind(&item.img_url)
    .fetch_one(pool)
    .await
    .map_err(DatabaseError::from);

    match result {
        Ok(created) => {
            tracing::info!("Created {} {} ({})", kind.label(), created.id, created.name);
            Ok(created)
        }
        Err(e) if e.is_unique_violation() => Err(duplicate(kind, &item)),
        Err(e) => Err(e.into()),
    }
}

pub async fn get(pool: &PgPool, kind: CatalogKind, id: i32) -> Result<CatalogItem, ApiError> {
    sqlx::query_as::<_, CatalogItem>(&format!(
        "SELECT id, name, instructions, img_url FROM {} WHERE id = $1",
        kind.table()
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ApiError::not_found(format!("No {} with id: {}", kind.label(), id)))
}

pub async fn remove(pool: &PgPool, kind: CatalogKind, id: i32) -> Result<(), ApiError> {
    let deleted: Option<i32> = sqlx::query_scalar(&format!(
        "DELETE FROM {} WHERE id = $1 RETURNING id",
        kind.table()
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match deleted {
        Some(_) => Ok(()),
        None => Err(ApiError::not_found(format!("No {} with id: {}", kind.label(), id))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_message_names_kind() {
        let item = CatalogItem {
            id: 1,
            name: "Mojito".into(),
            instructions: "Muddle.".into(),
            img_url: "m.jpg".into(),
        };
        assert_eq!(duplicate(CatalogKind::Cocktail, &item).message(), "Duplicate Cocktail: Mojito");
        assert_eq!(duplicate(CatalogKind::Recipe, &item).message(), "Duplicate Recipe: Mojito");
    }
}
