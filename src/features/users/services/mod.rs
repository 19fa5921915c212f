mod user_repository;
mod user_service;

pub use user_repository::{PgUserRepository, UserRepository, EMAIL_TAKEN_MESSAGE};
pub use user_service::UserService;
