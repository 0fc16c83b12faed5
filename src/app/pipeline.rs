//! The forecast pipeline shared by `dfx forecast` and the integration tests.
//!
//! ingest -> start-year cut -> country list -> batch forecast -> exports
//!
//! Fatal input problems surface before any forecasting starts, and nothing is
//! written unless at least one country forecast successfully. The combined
//! table is written last: if an optional export fails the run stops without
//! it, though exports written before the failure stay on disk.

use tracing::info;

use crate::batch::{BatchOutput, run_batch};
use crate::domain::{ForecastConfig, YearRange};
use crate::error::AppError;
use crate::io::ingest::{filter_from_year, load_observations};
use crate::io::summary::RunSummary;
use crate::report::DataQualityReport;
use crate::series::group_by_country;

/// All computed outputs of a single `dfx forecast` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub quality: DataQualityReport,
    /// Rows dropped by the start-year cut.
    pub dropped_before_start: usize,
    pub range: YearRange,
    pub batch: BatchOutput,
}

impl RunOutput {
    pub fn summary(&self, config: &ForecastConfig) -> RunSummary {
        RunSummary {
            tool: "dfx".to_string(),
            start_year: config.start_year,
            horizon: config.horizon,
            latest_year: self.batch.latest_year,
            target_year: self.batch.target_year,
            countries_total: self.batch.countries_total,
            countries_forecast: self.batch.countries_forecast(),
            output_rows: self.batch.rows.len(),
            failures: self.batch.failures.clone(),
            transitions: self.batch.transitions.clone(),
        }
    }
}

/// Reject configurations that cannot produce a forecast.
pub fn validate_config(config: &ForecastConfig) -> Result<(), AppError> {
    if config.horizon == 0 {
        return Err(AppError::new(4, "Horizon must be at least 1 year."));
    }
    let w = config.model.interval_width;
    if !(w > 0.0 && w < 1.0) {
        return Err(AppError::new(4, format!("Interval width must be in (0, 1), got {w}.")));
    }
    if config.model.min_observed < 2 {
        return Err(AppError::new(4, "A trend needs at least 2 observed scores per country."));
    }
    Ok(())
}

/// Run the forecast end to end and write the configured outputs.
pub fn run_pipeline(config: &ForecastConfig) -> Result<RunOutput, AppError> {
    validate_config(config)?;

    let ingest = load_observations(&config.input_path)?;
    let (observations, dropped_before_start) = filter_from_year(ingest.observations, config.start_year);
    info!(
        start_year = config.start_year,
        kept = observations.len(),
        dropped = dropped_before_start,
        "applied start-year cut"
    );

    let range = YearRange::spanning(&observations).ok_or_else(|| {
        AppError::new(
            3,
            format!("No rows left to forecast at or after {}.", config.start_year),
        )
    })?;

    let quality = DataQualityReport::from_observations(&observations);
    let countries: Vec<String> = group_by_country(&observations).into_iter().map(|(c, _)| c).collect();

    let batch = run_batch(&countries, &observations, range, config.horizon, &config.model, config.seed)
        .map_err(|e| AppError::new(4, format!("Cannot forecast from {}: {e}", range.max)))?;
    if batch.countries_forecast() == 0 {
        return Err(AppError::new(
            3,
            format!("All {} countries failed to forecast; no output written.", batch.countries_total),
        ));
    }

    let out = RunOutput {
        quality,
        dropped_before_start,
        range,
        batch,
    };

    if let Some(path) = &config.export_transitions {
        crate::io::export::write_transitions_csv(path, &out.batch.transitions)?;
    }
    if let Some(path) = &config.export_summary {
        crate::io::summary::write_summary_json(path, &out.summary(config))?;
    }

    crate::io::export::write_combined_csv(&config.output_path, &out.batch.rows)?;
    info!(path = %config.output_path.display(), rows = out.batch.rows.len(), "wrote combined table");

    Ok(out)
}
