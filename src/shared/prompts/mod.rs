//! Prompt templates for outbound completion calls.
//!
//! Templates use Jinja2 syntax and live in `templates/prompts/`.

pub mod engine;

pub use engine::{render_template, TemplateError};

use minijinja::Value;
use std::collections::HashMap;

/// Render the incident classification prompt.
///
/// # Arguments
/// * `description` - Free-text incident description from the reporter
/// * `departments` - Department names the model must choose from
/// * `json_schema` - Optional JSON schema for the expected answer
pub fn render_classification_prompt(
    description: &str,
    departments: &[&str],
    json_schema: Option<&str>,
) -> Result<String, TemplateError> {
    let mut ctx: HashMap<&str, Value> = HashMap::new();
    ctx.insert("description", Value::from(description));
    ctx.insert("departments", Value::from(departments.join(", ")));
    ctx.insert("json_schema", Value::from(json_schema.unwrap_or("")));

    render_template("dispatch/classify.jinja", &ctx)
}
