//! CSV ingest.
//!
//! Turns the democracy-index CSV into a list of `Observation`s.
//!
//! Design goals:
//! - **Strict schema**: missing columns or unparseable year/score values are
//!   fatal (exit code 2), reported with the offending line
//! - **Explicit missing scores**: empty / `NA` / `NaN` cells become `None`
//! - **Separation of concerns**: no filtering or fitting logic beyond the
//!   start-year cut

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::info;

use crate::domain::Observation;
use crate::error::AppError;

/// Accepted header names per logical column (compared lowercase).
const COUNTRY_ALIASES: &[&str] = &["country", "entity"];
const CODE_ALIASES: &[&str] = &["code"];
const YEAR_ALIASES: &[&str] = &["year"];
const SCORE_ALIASES: &[&str] = &["score", "democracy score"];

/// Accepted calendar years; anything else is treated as a typo.
pub const MIN_YEAR: i32 = 1000;
pub const MAX_YEAR: i32 = 9999;

/// Cell values treated as a missing score.
const MISSING_MARKERS: &[&str] = &["", "na", "nan", "null"];

/// Ingest output.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub observations: Vec<Observation>,
    pub rows_read: usize,
}

/// Load observations from a CSV file.
pub fn load_observations(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let data = read_observations(file)?;
    info!(
        path = %path.display(),
        rows = data.rows_read,
        "loaded input dataset"
    );
    Ok(data)
}

/// Parse observations from any CSV reader.
pub fn read_observations<R: Read>(reader: R) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let columns = Columns {
        country: require_column(&header_map, COUNTRY_ALIASES)?,
        code: find_column(&header_map, CODE_ALIASES),
        year: require_column(&header_map, YEAR_ALIASES)?,
        score: require_column(&header_map, SCORE_ALIASES)?,
    };

    let mut observations = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records start after the header, lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| AppError::new(2, format!("CSV parse error on line {line}: {e}")))?;
        let obs = parse_row(&record, &columns).map_err(|msg| AppError::new(2, format!("Line {line}: {msg}")))?;
        observations.push(obs);
    }

    Ok(IngestedData {
        rows_read: observations.len(),
        observations,
    })
}

/// Keep only observations from `start_year` onwards.
///
/// Returns the kept rows and the number dropped.
pub fn filter_from_year(observations: Vec<Observation>, start_year: i32) -> (Vec<Observation>, usize) {
    let before = observations.len();
    let kept: Vec<Observation> = observations.into_iter().filter(|o| o.year >= start_year).collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

#[derive(Debug, Clone, Copy)]
struct Columns {
    country: usize,
    code: Option<usize>,
    year: usize,
    score: usize,
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn find_column(header_map: &HashMap<String, usize>, aliases: &[&str]) -> Option<usize> {
    aliases.iter().find_map(|a| header_map.get(*a).copied())
}

fn require_column(header_map: &HashMap<String, usize>, aliases: &[&str]) -> Result<usize, AppError> {
    find_column(header_map, aliases).ok_or_else(|| {
        let names: Vec<String> = aliases.iter().map(|a| format!("`{a}`")).collect();
        AppError::new(2, format!("Missing required column: {}", names.join(" or ")))
    })
}

fn parse_row(record: &StringRecord, columns: &Columns) -> Result<Observation, String> {
    let country = record
        .get(columns.country)
        .filter(|s| !s.is_empty())
        .ok_or("Missing country name.")?
        .to_string();

    let code = columns
        .code
        .and_then(|idx| record.get(idx))
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let year_raw = record.get(columns.year).unwrap_or("");
    let year = parse_year(year_raw).ok_or_else(|| format!("Invalid year `{year_raw}`."))?;
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(format!("Year `{year_raw}` is outside {MIN_YEAR}..={MAX_YEAR}."));
    }

    let score_raw = record.get(columns.score).unwrap_or("");
    let score = parse_score(score_raw).ok_or_else(|| format!("Invalid score `{score_raw}`."))?;

    Ok(Observation {
        country,
        code,
        year,
        score,
    })
}

fn parse_year(s: &str) -> Option<i32> {
    if let Ok(y) = s.parse::<i32>() {
        return Some(y);
    }
    // Accept integral floats such as `2010.0`.
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() && v.fract() == 0.0 && v.abs() < i32::MAX as f64 {
        Some(v as i32)
    } else {
        None
    }
}

/// `Some(None)` for a missing marker, `None` for garbage.
fn parse_score(s: &str) -> Option<Option<f64>> {
    if MISSING_MARKERS.contains(&s.to_ascii_lowercase().as_str()) {
        return Some(None);
    }
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(Some(v)) } else { None }
}
