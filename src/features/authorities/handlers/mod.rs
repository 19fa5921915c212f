mod authority_handler;

pub use authority_handler::*;
