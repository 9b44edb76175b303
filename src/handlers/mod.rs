// handlers/mod.rs - HTTP handlers, split by whether a token is needed
//
// public:    /auth/* (no token)
// protected: /users/*, /recipes/*, /cocktails/* (token checked per handler)

pub mod protected;
pub mod public;
pub mod utils;
