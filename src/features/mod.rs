pub mod auth;
pub mod authorities;
pub mod dashboard;
pub mod dispatch;
pub mod reports;
pub mod users;
