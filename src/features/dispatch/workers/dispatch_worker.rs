use std::sync::Arc;

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::features::dispatch::services::{DispatchOutcome, DispatchService};

/// Reports picked up from the backlog at startup
const STARTUP_BACKLOG_LIMIT: i64 = 100;

/// Consumes report-created events and runs dispatch for each.
///
/// Every event gets its own task, so duplicate events for one report may run
/// concurrently; the conditional write in [`DispatchService::dispatch`] keeps
/// only the first result.
pub struct DispatchWorker {
    service: Arc<DispatchService>,
    receiver: mpsc::UnboundedReceiver<Uuid>,
}

impl DispatchWorker {
    pub fn new(service: Arc<DispatchService>, receiver: mpsc::UnboundedReceiver<Uuid>) -> Self {
        Self { service, receiver }
    }

    /// Run until every event sender is dropped
    pub async fn run(mut self) {
        tracing::info!("Starting dispatch worker");

        self.resume_backlog().await;

        while let Some(report_id) = self.receiver.recv().await {
            self.spawn(report_id);
        }

        tracing::info!("Dispatch worker stopped: event channel closed");
    }

    /// Reports created while no worker was running
    async fn resume_backlog(&self) {
        match self.service.awaiting(STARTUP_BACKLOG_LIMIT).await {
            Ok(ids) if ids.is_empty() => {}
            Ok(ids) => {
                tracing::info!("Resuming dispatch for {} waiting report(s)", ids.len());
                for id in ids {
                    self.spawn(id);
                }
            }
            Err(e) => tracing::error!("Failed to load dispatch backlog: {}", e),
        }
    }

    fn spawn(&self, report_id: Uuid) {
        let service = self.service.clone();
        tokio::spawn(async move {
            run_once(&service, report_id).await;
        });
    }
}

/// One dispatch invocation; failures are logged and dropped
async fn run_once(service: &DispatchService, report_id: Uuid) {
    match service.dispatch(report_id).await {
        Ok(DispatchOutcome::Dispatched {
            authority_id,
            distance_km,
        }) => tracing::info!(
            "Report {} dispatched to authority {} ({:.2} km, notification mocked)",
            report_id,
            authority_id,
            distance_km
        ),
        Ok(DispatchOutcome::NoAuthority { department }) => tracing::warn!(
            "No authority for department '{}'; report {} stays awaiting dispatch",
            department,
            report_id
        ),
        Ok(DispatchOutcome::AlreadyDispatched) => {
            tracing::info!("Report {} was dispatched by another invocation", report_id)
        }
        Ok(DispatchOutcome::Skipped) => {
            tracing::debug!("Report {} not awaiting dispatch; skipped", report_id)
        }
        Err(e) => tracing::error!("Dispatch failed for report {}: {}", report_id, e),
    }
}
