//! # Reporter Module
//!
//! Persists failure records so a run's problems can be inspected after the
//! fact. The report is a pretty-printed JSON array of
//! `{"hash", "files", "detail"}` objects, written even when it is empty.

use crate::core::organize::FailureRecord;
use crate::error::ReportError;
use std::fs;
use std::path::Path;

/// Default report file name
pub const DEFAULT_REPORT_FILE: &str = "failed_files.json";

/// Render failure records as pretty JSON
pub fn render_failure_report(records: &[FailureRecord]) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Write failure records to `path`, replacing any previous report
pub fn write_failure_report(path: &Path, records: &[FailureRecord]) -> Result<(), ReportError> {
    let json = render_failure_report(records)?;
    fs::write(path, json).map_err(|source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    })
}
