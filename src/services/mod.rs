pub mod catalog_service;
pub mod user_service;
