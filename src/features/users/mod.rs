pub mod dtos;
pub mod models;
pub mod services;

pub use services::{PgUserRepository, UserRepository, UserService};
