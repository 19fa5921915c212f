mod authority_dto;

pub use authority_dto::{AuthorityListQuery, AuthorityResponseDto};
