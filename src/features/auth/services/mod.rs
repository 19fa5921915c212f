mod auth_service;
mod password;
mod revocation_store;
mod token_service;

pub use auth_service::AuthService;
pub use revocation_store::{PgRevokedTokenStore, RevokedTokenStore};
pub use token_service::TokenService;
