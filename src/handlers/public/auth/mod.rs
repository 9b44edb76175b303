// handlers/public/auth/mod.rs - Token acquisition endpoints
//
// Neither route needs a token. Both answer with `{ "token": ... }` on success.

pub mod login;    // POST /auth/login - exchange credentials for a token
pub mod register; // POST /auth/register - create an account and sign in

pub use login::login_post;
pub use register::register_post;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}
