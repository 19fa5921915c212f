use schemars::gen::SchemaGenerator;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;

/// Structured output expected back from a completion call
pub trait LlmResponse: DeserializeOwned + JsonSchema {
    /// Semantic checks beyond what deserialization enforces
    fn check(&self) -> Result<(), String> {
        Ok(())
    }

    /// Generate JSON schema string for use in LLM prompts
    fn json_schema_string() -> String {
        let mut gen = SchemaGenerator::default();
        let schema = gen.root_schema_for::<Self>();
        serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "{}".to_string())
    }
}
