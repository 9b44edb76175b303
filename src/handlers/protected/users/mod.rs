// handlers/protected/users/mod.rs - Account routes, owner only

pub mod saved; // POST /users/:username/{recipes,cocktails}/:id
pub mod user;  // GET, PATCH, DELETE /users/:username

pub use saved::{save_cocktail_post, save_recipe_post};
pub use user::{user_delete, user_get, user_patch};
