//! CSV exports.
//!
//! - the combined historical + forecast table (`country,ds,value,source,regime`)
//! - the per-country regime transition table
//!
//! Both are meant to be easy to consume in spreadsheets or BI tools. Missing
//! values and regimes are written as empty cells.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::domain::{OutputRow, RegimeTransition};
use crate::error::AppError;

/// Write the combined table to a CSV file.
pub fn write_combined_csv(path: &Path, rows: &[OutputRow]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create output CSV '{}': {e}", path.display())))?;
    write_rows(file, rows)
}

/// Write the regime transition table to a CSV file.
pub fn write_transitions_csv(path: &Path, transitions: &[RegimeTransition]) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create transitions CSV '{}': {e}", path.display()))
    })?;
    write_rows(file, transitions)
}

/// Serialize rows (header derived from the field names) to any writer.
pub fn write_rows<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<(), AppError> {
    let mut out = csv::Writer::from_writer(writer);
    for row in rows {
        out.serialize(row)
            .map_err(|e| AppError::new(2, format!("Failed to write CSV row: {e}")))?;
    }
    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush CSV: {e}")))?;
    Ok(())
}
