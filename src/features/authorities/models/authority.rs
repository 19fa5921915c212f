use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Department taxonomy matching the database enum
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema, JsonSchema,
)]
#[sqlx(type_name = "department")]
pub enum Department {
    Waste,
    Fire,
    Traffic,
    Environment,
    Infrastructure,
}

impl Department {
    pub const ALL: [Department; 5] = [
        Department::Waste,
        Department::Fire,
        Department::Traffic,
        Department::Environment,
        Department::Infrastructure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Waste => "Waste",
            Department::Fire => "Fire",
            Department::Traffic => "Traffic",
            Department::Environment => "Environment",
            Department::Infrastructure => "Infrastructure",
        }
    }

    /// Department names in taxonomy order
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Department::as_str).collect()
    }
}

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Department {
    type Err = String;

    /// Exact match on the taxonomy name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| format!("Unknown department: {}", s))
    }
}

/// Responder unit eligible for dispatch. Rows are maintained outside this service.
#[derive(Debug, Clone, FromRow)]
pub struct Authority {
    pub id: Uuid,
    pub name: String,
    pub department: Department,
    pub active: bool,
    pub lat: f64,
    pub lng: f64,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}
