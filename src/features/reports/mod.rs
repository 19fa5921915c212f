pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{PgReportRepository, ReportEventBus, ReportRepository, ReportService};
