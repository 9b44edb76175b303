use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A recipe or cocktail. Ids come from the external catalog the client browses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(deny_unknown_fields)]
pub struct CatalogItem {
    pub id: i32,
    pub name: String,
    pub instructions: String,
    pub img_url: String,
}

/// Which catalog table an item lives in, and where users bookmark it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Recipe,
    Cocktail,
}

impl CatalogKind {
    pub fn label(self) -> &'static str {
        match self {
            CatalogKind::Recipe => "recipe",
            CatalogKind::Cocktail => "cocktail",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            CatalogKind::Recipe => "Recipe",
            CatalogKind::Cocktail => "Cocktail",
        }
    }

    pub fn table(self) -> &'static str {
        match self {
            CatalogKind::Recipe => "recipes",
            CatalogKind::Cocktail => "cocktails",
        }
    }

    pub fn saved_table(self) -> &'static str {
        match self {
            CatalogKind::Recipe => "saved_recipes",
            CatalogKind::Cocktail => "saved_cocktails",
        }
    }

    pub fn saved_column(self) -> &'static str {
        match self {
            CatalogKind::Recipe => "recipe_id",
            CatalogKind::Cocktail => "cocktail_id",
        }
    }
}
