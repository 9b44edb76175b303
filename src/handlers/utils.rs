use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::database::models::{CatalogItem, NewUser, UserChanges, UserField};
use crate::error::ApiError;

pub const USERNAME_MIN_LENGTH: usize = 5;
pub const USERNAME_MAX_LENGTH: usize = 30;
pub const PASSWORD_MIN_LENGTH: usize = 5;
pub const NAME_MAX_LENGTH: usize = 30;

/// Deserialize a JSON body into a request type, as a 400 on failure
pub fn parse_body<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::bad_request(e.to_string()))
}

/// Collect per-field failures into a single validation error
fn collect_errors<'a>(
    checks: impl IntoIterator<Item = (&'a str, Result<(), String>)>,
) -> Result<(), ApiError> {
    let field_errors: BTreeMap<String, String> = checks
        .into_iter()
        .filter_map(|(field, result)| result.err().map(|msg| (field.to_string(), msg)))
        .collect();

    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error("Invalid input", Some(field_errors)))
    }
}

pub fn validate_username_format(username: &str) -> Result<(), String> {
    let length = username.chars().count();
    if length < USERNAME_MIN_LENGTH {
        return Err(format!("Username must be at least {} characters", USERNAME_MIN_LENGTH));
    }
    if length > USERNAME_MAX_LENGTH {
        return Err(format!("Username must be at most {} characters", USERNAME_MAX_LENGTH));
    }

    // Allow alphanumeric, underscore, hyphen
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err("Username can only contain letters, numbers, underscore, and hyphen".to_string());
    }

    if !username.starts_with(|c: char| c.is_ascii_alphanumeric()) {
        return Err("Username must start with a letter or number".to_string());
    }

    Ok(())
}

pub fn validate_password_format(password: &str) -> Result<(), String> {
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        return Err(format!("Password must be at least {} characters", PASSWORD_MIN_LENGTH));
    }
    Ok(())
}

pub fn validate_name_format(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name cannot be empty".to_string());
    }
    if name.chars().count() > NAME_MAX_LENGTH {
        return Err(format!("Name must be at most {} characters", NAME_MAX_LENGTH));
    }
    Ok(())
}

pub fn validate_email_format(email: &str) -> Result<(), String> {
    let invalid = || Err("Invalid email format".to_string());

    let Some((local, domain)) = email.split_once('@') else {
        return invalid();
    };
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return invalid();
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return invalid();
    }

    Ok(())
}

pub fn validate_new_user(user: &NewUser) -> Result<(), ApiError> {
    collect_errors([
        ("username", validate_username_format(&user.username)),
        ("password", validate_password_format(&user.password)),
        ("firstName", validate_name_format(&user.first_name)),
        ("lastName", validate_name_format(&user.last_name)),
        ("email", validate_email_format(&user.email)),
    ])
}

pub fn validate_catalog_item(item: &CatalogItem) -> Result<(), ApiError> {
    let non_empty = |value: &str| {
        if value.trim().is_empty() {
            Err("This field cannot be empty".to_string())
        } else {
            Ok(())
        }
    };

    collect_errors([
        ("id", if item.id > 0 { Ok(()) } else { Err("Id must be positive".to_string()) }),
        ("name", non_empty(&item.name)),
        ("instructions", non_empty(&item.instructions)),
    ])
}

/// Turn a PATCH body into ordered, allow-listed user changes.
///
/// `password` is the caller's current password and is never written.
/// Any other key must be an updatable [`UserField`]; unknown keys are rejected.
/// An update with no fields passes here and fails later as "No data."
pub fn parse_user_changes(body: Value) -> Result<UserChanges, ApiError> {
    let Value::Object(map) = body else {
        return Err(ApiError::bad_request("Request body must be a JSON object"));
    };

    let mut password = None;
    let mut changes = Vec::new();
    let mut field_errors = BTreeMap::new();

    for (key, value) in map {
        if key == "password" {
            match value {
                Value::String(s) => password = Some(s),
                _ => {
                    field_errors.insert(key, "Must be a string".to_string());
                }
            }
            continue;
        }

        let Some(field) = UserField::parse(&key) else {
            field_errors.insert(key, "Not an updatable field".to_string());
            continue;
        };

        let Some(text) = value.as_str() else {
            field_errors.insert(key, "Must be a string".to_string());
            continue;
        };

        let check = match field {
            UserField::FirstName | UserField::LastName => validate_name_format(text),
            UserField::Email => validate_email_format(text),
        };
        match check {
            Ok(()) => changes.push((field, value)),
            Err(msg) => {
                field_errors.insert(key, msg);
            }
        }
    }

    if password.is_none() && !field_errors.contains_key("password") {
        field_errors.insert("password".to_string(), "This field is required".to_string());
    }

    match password {
        Some(password) if field_errors.is_empty() => Ok(UserChanges { password, changes }),
        _ => Err(ApiError::validation_error("Invalid update", Some(field_errors))),
    }
}
