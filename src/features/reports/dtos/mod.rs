mod report_dto;

pub use report_dto::{
    AssignReportDto, CreateReportDto, PhotoUpload, ReportResponseDto, ResolveReportForm,
    SubmitReportForm, UpdateReportStatusDto,
};
