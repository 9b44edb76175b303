// handlers/protected/mod.rs - Handlers behind the credential gate
//
// The gate itself never rejects. Each handler states its own requirement first:
// user routes call `require_owner`, catalog routes call `require_authenticated`.

pub mod cocktails; // /cocktails, /cocktails/:id
pub mod recipes;   // /recipes, /recipes/:id
pub mod users;     // /users/:username and saved items
