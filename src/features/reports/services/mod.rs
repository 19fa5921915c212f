mod report_events;
mod report_repository;
mod report_service;

pub use report_events::{ReportEvent, ReportEventBus};
pub use report_repository::{PgReportRepository, ReportRepository};
pub use report_service::ReportService;
