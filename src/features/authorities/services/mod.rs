mod authority_repository;

pub use authority_repository::{AuthorityFilter, AuthorityRepository, PgAuthorityRepository};
