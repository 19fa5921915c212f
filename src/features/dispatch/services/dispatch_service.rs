use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::features::authorities::models::{Authority, Department};
use crate::features::authorities::services::{AuthorityFilter, AuthorityRepository};
use crate::features::dispatch::models::Classification;
use crate::features::dispatch::services::Classifier;
use crate::features::reports::models::DispatchResult;
use crate::features::reports::services::ReportRepository;
use crate::shared::geo::distance_km;
use crate::shared::llm::{parse_llm_response, LlmParseError, LlmResponse};
use crate::shared::prompts::{render_classification_prompt, TemplateError};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Classifier call failed: {0}")]
    Classifier(AppError),

    #[error("Malformed classification: {0}")]
    MalformedClassification(#[from] LlmParseError),

    #[error("Failed to render classification prompt: {0}")]
    Prompt(#[from] TemplateError),

    #[error("Store failure: {0}")]
    Store(AppError),
}

/// What a single dispatch invocation did
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Report missing or no longer awaiting classification
    Skipped,
    /// No active authority for the classified department; report left awaiting
    NoAuthority { department: String },
    Dispatched { authority_id: Uuid, distance_km: f64 },
    /// Another invocation stored its result first
    AlreadyDispatched,
}

/// Classifies new reports and nominates the nearest eligible authority
pub struct DispatchService {
    reports: Arc<dyn ReportRepository>,
    authorities: Arc<dyn AuthorityRepository>,
    classifier: Arc<dyn Classifier>,
}

impl DispatchService {
    pub fn new(
        reports: Arc<dyn ReportRepository>,
        authorities: Arc<dyn AuthorityRepository>,
        classifier: Arc<dyn Classifier>,
    ) -> Self {
        Self {
            reports,
            authorities,
            classifier,
        }
    }

    /// Run dispatch for one report.
    ///
    /// Any error leaves the report untouched. The final write only applies
    /// while the report is still awaiting classification.
    pub async fn dispatch(&self, report_id: Uuid) -> Result<DispatchOutcome, DispatchError> {
        let report = match self
            .reports
            .find_by_id(report_id)
            .await
            .map_err(DispatchError::Store)?
        {
            Some(report) if report.ai_pending => report,
            _ => return Ok(DispatchOutcome::Skipped),
        };

        let classification = self.classify(&report.description).await?;

        let Some(department) = classification.department() else {
            return Ok(DispatchOutcome::NoAuthority {
                department: classification.department,
            });
        };

        let candidates = self
            .authorities
            .list(AuthorityFilter::eligible(department))
            .await
            .map_err(DispatchError::Store)?;

        let Some((authority, distance)) =
            nearest_authority(report.latitude, report.longitude, &candidates)
        else {
            return Ok(DispatchOutcome::NoAuthority {
                department: department.to_string(),
            });
        };
        let authority_id = authority.id;

        let classification = serde_json::to_value(&classification).map_err(|e| {
            DispatchError::Store(AppError::Internal(format!(
                "Failed to encode classification: {}",
                e
            )))
        })?;

        let applied = self
            .reports
            .apply_dispatch(
                report_id,
                &DispatchResult {
                    classification,
                    notified_authority_id: authority_id,
                },
            )
            .await
            .map_err(DispatchError::Store)?;

        if !applied {
            return Ok(DispatchOutcome::AlreadyDispatched);
        }

        Ok(DispatchOutcome::Dispatched {
            authority_id,
            distance_km: distance,
        })
    }

    /// Reports still awaiting dispatch, oldest first
    pub async fn awaiting(&self, limit: i64) -> Result<Vec<Uuid>, DispatchError> {
        self.reports
            .list_awaiting_dispatch(limit)
            .await
            .map_err(DispatchError::Store)
    }

    async fn classify(&self, description: &str) -> Result<Classification, DispatchError> {
        let schema = Classification::json_schema_string();
        let prompt =
            render_classification_prompt(description, &Department::names(), Some(&schema))?;

        let completion = self
            .classifier
            .complete(&prompt)
            .await
            .map_err(DispatchError::Classifier)?;

        Ok(parse_llm_response::<Classification>(&completion)?)
    }
}

/// Closest authority to a point; ties keep the earlier record
fn nearest_authority(
    lat: f64,
    lng: f64,
    authorities: &[Authority],
) -> Option<(&Authority, f64)> {
    let mut best: Option<(&Authority, f64)> = None;

    for authority in authorities {
        let d = distance_km(lat, lng, authority.lat, authority.lng);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((authority, d)),
        }
    }

    best
}
