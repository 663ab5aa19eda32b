//! Request payloads and report views.

mod report;
mod request;

pub use report::{Report, ReportList, ReportStatus};
pub use request::{
    BusinessScale, IncludeFinancial, ListReportsQuery, ReportStyle, ScanRequest, ScanRerunRequest,
    ScanTier, SignalContext, SignalRequest, SignalRerunRequest, SignalTier, SolutionsRequest,
};
