use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use super::LlmResponse;

lazy_static! {
    /// Regex for trailing commas before } or ]
    static ref TRAILING_COMMA_RE: Regex = Regex::new(r",(\s*[}\]])").unwrap();

    /// Regex for JavaScript string concatenation ("str1" + "str2")
    static ref JS_STRING_CONCAT_RE: Regex = Regex::new(r#""\s*\+\s*""#).unwrap();
}

/// Excerpt length kept in error messages
const EXCERPT_CHARS: usize = 200;

#[derive(Debug, Error, PartialEq)]
pub enum LlmParseError {
    #[error("No JSON object found in completion")]
    NoJson,

    #[error("Malformed JSON in completion: {0}")]
    Malformed(String),

    #[error("Completion rejected: {0}")]
    Rejected(String),
}

/// Extract the JSON object from completion text.
///
/// Accepts a ```json fenced block, any fenced block, bare JSON, or an object
/// embedded in surrounding prose (first `{` to last `}`).
pub fn extract_json_string(text: &str) -> Result<&str, LlmParseError> {
    if let Some(after) = text.split("```json").nth(1) {
        let body = after.split("```").next().unwrap_or(after).trim();
        return if body.is_empty() {
            Err(LlmParseError::NoJson)
        } else {
            Ok(body)
        };
    }

    if let Some(start) = text.find("```") {
        let block_start = start + 3;
        // Skip optional language identifier on the opening line
        if let Some(newline_offset) = text[block_start..].find('\n') {
            let json_start = block_start + newline_offset + 1;
            if let Some(end_offset) = text[json_start..].find("```") {
                return Ok(text[json_start..json_start + end_offset].trim());
            }
        }
    }

    let trimmed = text.trim();
    if trimmed.starts_with('{') {
        return Ok(trimmed);
    }

    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(&text[start..=end]),
        _ => Err(LlmParseError::NoJson),
    }
}

/// Fix trailing commas in JSON (common LLM mistake)
///
/// Example: `{"department": "Fire",}` -> `{"department": "Fire"}`
pub fn fix_trailing_commas(json_str: &str) -> String {
    TRAILING_COMMA_RE.replace_all(json_str, "$1").to_string()
}

/// Merge `"a" + "b"` style concatenation into a single string literal
pub fn fix_js_string_concatenation(json_str: &str) -> String {
    JS_STRING_CONCAT_RE.replace_all(json_str, "").to_string()
}

/// Repair with llm_json, guarding against panics inside the repairer
fn repair_json(json_str: &str) -> Option<String> {
    let options = llm_json::RepairOptions::default();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        llm_json::repair_json(json_str, &options)
    }));

    match result {
        Ok(Ok(repaired)) => Some(repaired),
        Ok(Err(e)) => {
            tracing::debug!("JSON repair failed: {:?}", e);
            None
        }
        Err(_) => {
            tracing::warn!("JSON repair panicked");
            None
        }
    }
}

/// Parse completion text into `T`.
///
/// Pipeline: extract the object, try a direct parse, retry after the quick
/// fixes, then after an llm_json repair. The parsed value must also pass
/// [`LlmResponse::check`]. There is no default fallback: callers decide what
/// a failed parse means.
pub fn parse_llm_response<T>(text: &str) -> Result<T, LlmParseError>
where
    T: LlmResponse,
{
    let json_str = extract_json_string(text)?;

    let parsed = serde_json::from_str::<T>(json_str)
        .or_else(|_| {
            let fixed = fix_trailing_commas(&fix_js_string_concatenation(json_str));
            serde_json::from_str::<T>(&fixed)
        })
        .or_else(|first_error| match repair_json(json_str) {
            Some(repaired) => serde_json::from_str::<T>(&repaired),
            None => Err(first_error),
        })
        .map_err(|e| {
            LlmParseError::Malformed(format!(
                "{} (excerpt: {})",
                e,
                json_str.chars().take(EXCERPT_CHARS).collect::<String>()
            ))
        })?;

    parsed.check().map_err(LlmParseError::Rejected)?;
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, JsonSchema)]
    struct Verdict {
        label: String,
        score: Option<i32>,
    }

    impl LlmResponse for Verdict {
        fn check(&self) -> Result<(), String> {
            if self.label.trim().is_empty() {
                return Err("label is empty".to_string());
            }
            Ok(())
        }
    }

    #[test]
    fn test_extract_json_from_json_fence() {
        let text = "Sure:\n\n```json\n{\"label\": \"Fire\"}\n```\nDone.";
        assert_eq!(extract_json_string(text).unwrap(), r#"{"label": "Fire"}"#);
    }

    #[test]
    fn test_extract_json_from_generic_fence() {
        let text = "```\n{\"label\": \"Waste\"}\n```";
        assert_eq!(extract_json_string(text).unwrap(), r#"{"label": "Waste"}"#);
    }

    #[test]
    fn test_extract_json_embedded_in_prose() {
        let text = "The answer is {\"label\": \"Traffic\"} as requested";
        assert_eq!(extract_json_string(text).unwrap(), r#"{"label": "Traffic"}"#);
    }

    #[test]
    fn test_extract_json_missing() {
        assert_eq!(
            extract_json_string("No JSON here at all!"),
            Err(LlmParseError::NoJson)
        );
        assert_eq!(extract_json_string("} backwards {"), Err(LlmParseError::NoJson));
    }

    #[test]
    fn test_fix_trailing_commas() {
        assert_eq!(
            fix_trailing_commas(r#"{"a": 1, "b": [1, 2,],}"#),
            r#"{"a": 1, "b": [1, 2]}"#
        );
    }

    #[test]
    fn test_fix_js_string_concatenation() {
        assert_eq!(
            fix_js_string_concatenation(r#"{"label": "Infra" +  "structure"}"#),
            r#"{"label": "Infrastructure"}"#
        );
    }

    #[test]
    fn test_parse_plain_json() {
        let verdict: Verdict = parse_llm_response(r#"{"label": "Fire", "score": 3}"#).unwrap();
        assert_eq!(verdict.label, "Fire");
        assert_eq!(verdict.score, Some(3));
    }

    #[test]
    fn test_parse_repairs_trailing_comma() {
        let verdict: Verdict = parse_llm_response(r#"{"label": "Waste",}"#).unwrap();
        assert_eq!(verdict.label, "Waste");
    }

    #[test]
    fn test_parse_rejects_non_json() {
        let result = parse_llm_response::<Verdict>("I cannot classify this.");
        assert_eq!(result.unwrap_err(), LlmParseError::NoJson);
    }

    #[test]
    fn test_parse_rejects_missing_field() {
        let result = parse_llm_response::<Verdict>(r#"{"score": 1}"#);
        assert!(matches!(result, Err(LlmParseError::Malformed(_))));
    }

    #[test]
    fn test_parse_applies_check() {
        let result = parse_llm_response::<Verdict>(r#"{"label": "  "}"#);
        assert!(matches!(result, Err(LlmParseError::Rejected(_))));
    }

    #[test]
    fn test_json_schema_string_lists_fields() {
        let schema = Verdict::json_schema_string();
        assert!(schema.contains("label"));
        assert!(schema.contains("score"));
    }
}
