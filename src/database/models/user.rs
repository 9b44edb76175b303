use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::database::query_builder::ColumnMap;

/// Public user record; the password hash never leaves the service layer
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// User plus the ids of everything they have bookmarked
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub saved_recipes: Vec<i32>,
    pub saved_cocktails: Vec<i32>,
}

/// Registration input
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Fields a user may change through a partial update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    FirstName,
    LastName,
    Email,
}

impl UserField {
    pub const ALL: [UserField; 3] = [UserField::FirstName, UserField::LastName, UserField::Email];

    /// Name as it appears in request bodies
    pub fn name(self) -> &'static str {
        match self {
            UserField::FirstName => "firstName",
            UserField::LastName => "lastName",
            UserField::Email => "email",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }
}

pub const USER_COLUMNS: ColumnMap<'static> =
    ColumnMap::new(&[("firstName", "first_name"), ("lastName", "last_name")]);

/// A validated partial update: the current password plus ordered field changes
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub password: String,
    pub changes: Vec<(UserField, Value)>,
}

impl UserChanges {
    /// Changes keyed by request field name, in request order
    pub fn named(&self) -> Vec<(&'static str, Value)> {
        self.changes
            .iter()
            .map(|(field, value)| (field.name(), value.clone()))
            .collect()
    }
}
