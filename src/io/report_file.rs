//! Read/write report JSON files.
//!
//! Report JSON is the "portable" representation of a projection run:
//! - the run configuration it was computed with
//! - every constituency's call and intervals
//! - seat tally, government verdict, national vote share
//!
//! A saved report can be re-rendered with `sample-count show` without
//! re-running any estimation.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::report::Report;

/// On-disk envelope around a [`Report`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportFile {
    pub tool: String,
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub report: Report,
}

impl ReportFile {
    pub fn new(report: Report) -> Self {
        Self {
            tool: "sample-count".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: Utc::now(),
            report,
        }
    }
}

/// Write a report JSON file.
pub fn write_report_json(path: &Path, report: &Report) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create report JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &ReportFile::new(report.clone()))
        .map_err(|e| AppError::new(2, format!("Failed to write report JSON: {e}")))?;

    Ok(())
}

/// Read a report JSON file.
pub fn read_report_json(path: &Path) -> Result<ReportFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open report JSON '{}': {e}", path.display())))?;
    let report: ReportFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid report JSON: {e}")))?;
    Ok(report)
}
