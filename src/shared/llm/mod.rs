//! Helpers for turning free-form completion text into typed values.

mod parser;
mod response;

pub use parser::{parse_llm_response, LlmParseError};
pub use response::LlmResponse;
