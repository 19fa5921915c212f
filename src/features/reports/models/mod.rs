mod report;
mod report_stats;

pub use report::{AssignReport, CreateReport, DispatchResult, Report, ReportStatus};
pub use report_stats::ReportCounts;
