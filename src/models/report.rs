//! Report snapshots and listings.
//!
//! The client returns response bodies untouched as [`serde_json::Value`];
//! these types are lenient typed views for callers that want them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Server-side report lifecycle state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Queued,
    Processing,
    Completed,
    Failed,
    Cancelled,
    /// Any value this crate does not recognize
    #[serde(other)]
    Unknown,
}

impl ReportStatus {
    /// Parse a status string; unrecognized values map to `Unknown`
    pub fn parse(status: &str) -> Self {
        match status {
            "queued" => ReportStatus::Queued,
            "processing" => ReportStatus::Processing,
            "completed" => ReportStatus::Completed,
            "failed" => ReportStatus::Failed,
            "cancelled" => ReportStatus::Cancelled,
            _ => ReportStatus::Unknown,
        }
    }

    /// Read the `status` field of a report body
    pub fn of(report: &Value) -> Self {
        report
            .get("status")
            .and_then(Value::as_str)
            .map(Self::parse)
            .unwrap_or(ReportStatus::Unknown)
    }

    /// Whether polling should stop at this state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReportStatus::Completed | ReportStatus::Failed | ReportStatus::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Queued => "queued",
            ReportStatus::Processing => "processing",
            ReportStatus::Completed => "completed",
            ReportStatus::Failed => "failed",
            ReportStatus::Cancelled => "cancelled",
            ReportStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a report as returned by `GET /reports/{id}` or a creation call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub report_id: String,

    #[serde(default = "unknown_status")]
    pub status: ReportStatus,

    /// Product that produced the report (signal, scan, solutions)
    #[serde(default)]
    pub product: Option<String>,

    /// Token to chain this report's context into Solutions
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub credits_used: Option<Value>,

    /// Signed PDF URL (expires after ~15 minutes)
    #[serde(default)]
    pub download_url: Option<String>,

    /// Signed PPTX URL (Pro and Premium tiers)
    #[serde(default)]
    pub pptx_download_url: Option<String>,

    /// Signed URL for the full JSON intelligence payload
    #[serde(default)]
    pub intelligence_download_url: Option<String>,

    /// Failure reason; usually a string, sometimes a structured object
    #[serde(default)]
    pub error: Option<Value>,

    /// Everything else the server sent
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn unknown_status() -> ReportStatus {
    ReportStatus::Unknown
}

impl Report {
    /// Build a typed view from a response body
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Report::deserialize(value)
    }
}

/// Page of reports from `GET /reports`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportList {
    #[serde(default)]
    pub reports: Vec<Report>,

    #[serde(default)]
    pub page: Option<u32>,

    #[serde(default)]
    pub page_size: Option<u32>,

    #[serde(default)]
    pub total: Option<u64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ReportList {
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        ReportList::deserialize(value)
    }
}
