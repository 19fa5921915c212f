mod authority;

pub use authority::{Authority, Department};
