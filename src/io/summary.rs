//! Read/write the JSON run summary.
//!
//! The summary is the machine-readable companion to the combined CSV:
//! - run parameters (start year, horizon, latest/target year)
//! - which countries failed to forecast and why
//! - the regime transition table

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{CountryFailure, RegimeTransition};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub tool: String,
    pub start_year: i32,
    pub horizon: usize,
    pub latest_year: i32,
    pub target_year: i32,
    pub countries_total: usize,
    pub countries_forecast: usize,
    pub output_rows: usize,
    pub failures: Vec<CountryFailure>,
    pub transitions: Vec<RegimeTransition>,
}

/// Write the summary as pretty-printed JSON.
pub fn write_summary_json(path: &Path, summary: &RunSummary) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create summary JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, summary)
        .map_err(|e| AppError::new(2, format!("Failed to write summary JSON: {e}")))?;
    Ok(())
}

/// Read a summary written by `write_summary_json`.
pub fn read_summary_json(path: &Path) -> Result<RunSummary, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open summary JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid summary JSON: {e}")))
}
