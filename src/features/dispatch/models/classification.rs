use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::features::authorities::models::Department;
use crate::shared::llm::LlmResponse;

/// Classifier answer for a report description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "IncidentClassification")]
pub struct Classification {
    #[schemars(description = "One of: Waste, Fire, Traffic, Environment, Infrastructure")]
    pub department: String,

    /// Stored as returned; any JSON value is accepted
    #[serde(default)]
    #[schemars(description = "Urgency of the incident: low, medium, high or critical")]
    pub urgency: serde_json::Value,
}

impl Classification {
    /// Taxonomy department, if the answer names one
    pub fn department(&self) -> Option<Department> {
        self.department.parse().ok()
    }
}

impl LlmResponse for Classification {
    fn check(&self) -> Result<(), String> {
        if self.department.trim().is_empty() {
            return Err("department is empty".to_string());
        }
        Ok(())
    }
}
