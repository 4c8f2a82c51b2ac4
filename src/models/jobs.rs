use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DeviceType, InterfaceTemplate, Manufacturer};

/// Canonical job status values
pub mod job_status {
    pub const COMPLETED: &str = "completed";
    /// Stopped before touching the store (unparseable or incomplete document)
    pub const ABORTED: &str = "aborted";
    pub const FAILED: &str = "failed";
}

/// Canonical job names
pub mod job_name {
    pub const IMPORT_DEVICE_TYPE: &str = "import_device_type";
}

/// Log levels recorded against a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

/// JobLogEntry is one line of a job's operator-facing log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobLogEntry {
    pub level: LogLevel,
    pub message: String,
}

/// ImportSummary describes the records touched by one successful import
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub manufacturer: Manufacturer,
    pub device_type: DeviceType,
    pub created: bool,
    pub interfaces: Vec<InterfaceTemplate>,
}

/// JobResult is what the caller sees once an import job has finished
#[derive(Debug, Clone, Serialize)]
pub struct JobResult {
    pub id: String,
    pub name: String,
    pub status: String,
    pub logs: Vec<JobLogEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ImportSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}
