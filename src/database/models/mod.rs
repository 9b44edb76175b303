pub mod catalog;
pub mod user;

pub use catalog::{CatalogItem, CatalogKind};
pub use user::{NewUser, User, UserChanges, UserField, UserProfile, USER_COLUMNS};
