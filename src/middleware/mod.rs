pub mod auth;
pub mod response;

pub use auth::{authenticate, AuthState, Identity};
pub use response::{ApiResponse, ApiResult};
