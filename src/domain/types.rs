//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between pipeline stages by value
//! - exported to CSV/JSON
//! - reloaded later (the JSON run summary)

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lower bound of the democracy score domain.
pub const SCORE_MIN: f64 = 0.0;
/// Upper bound of the democracy score domain.
pub const SCORE_MAX: f64 = 10.0;

/// A single raw input row.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub country: String,
    /// ISO-style country code. Carried through ingest, unused downstream.
    pub code: Option<String>,
    pub year: i32,
    /// `None` is an explicit missing score, never zero.
    pub score: Option<f64>,
}

/// Inclusive range of calendar years.
///
/// An inverted range (`max < min`) is valid and empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Smallest range covering every observation's year.
    pub fn spanning(observations: &[Observation]) -> Option<Self> {
        let min = observations.iter().map(|o| o.year).min()?;
        let max = observations.iter().map(|o| o.year).max()?;
        Some(Self { min, max })
    }

    pub fn is_empty(&self) -> bool {
        self.max < self.min
    }

    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (i64::from(self.max) - i64::from(self.min) + 1) as usize
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.min && year <= self.max
    }

    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.min..=self.max
    }
}

/// One year of a normalized series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub year: i32,
    pub score: Option<f64>,
}

/// A gap-filled yearly series for one country.
///
/// Years are contiguous and strictly increasing by one.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSeries {
    pub country: String,
    pub points: Vec<SeriesPoint>,
}

impl NormalizedSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_year(&self) -> Option<i32> {
        self.points.first().map(|p| p.year)
    }

    pub fn last_year(&self) -> Option<i32> {
        self.points.last().map(|p| p.year)
    }
}

/// A fitted or forecast value with its uncertainty interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub country: String,
    pub year: i32,
    pub estimate: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Discrete political-system category derived from a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Regime {
    #[serde(rename = "Full Democracy")]
    FullDemocracy,
    #[serde(rename = "Flawed Democracy")]
    FlawedDemocracy,
    #[serde(rename = "Hybrid Regime")]
    HybridRegime,
    #[serde(rename = "Authoritarian")]
    Authoritarian,
}

impl Regime {
    pub fn label(&self) -> &'static str {
        match self {
            Regime::FullDemocracy => "Full Democracy",
            Regime::FlawedDemocracy => "Flawed Democracy",
            Regime::HybridRegime => "Hybrid Regime",
            Regime::Authoritarian => "Authoritarian",
        }
    }
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Regime at the latest historical year vs. the forecast target year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeTransition {
    pub country: String,
    pub latest_year: i32,
    pub target_year: i32,
    pub regime_latest: Option<Regime>,
    pub regime_target: Option<Regime>,
    pub changed_regime: bool,
}

/// Provenance of a combined-table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Historical,
    Forecast,
}

/// One row of the combined historical + forecast table.
///
/// Field order is the export column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRow {
    pub country: String,
    pub ds: NaiveDate,
    pub value: Option<f64>,
    pub source: Source,
    pub regime: Option<Regime>,
}

/// A country the forecaster could not handle, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryFailure {
    pub country: String,
    pub reason: String,
}

/// Fixed model settings.
///
/// These are not exposed on the command line; the pipeline always runs with
/// `ModelConfig::default()`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// Scale of the Laplace prior on trend changes. Larger bends more readily.
    pub changepoint_prior_scale: f64,
    /// Upper bound on the number of potential changepoints.
    pub n_changepoints: usize,
    /// Fraction of observed history in which changepoints may be placed.
    pub changepoint_range: f64,
    /// Std-dev of the Gaussian priors on the base growth rate and offset.
    pub trend_prior_scale: f64,
    /// Std-dev of the half-normal prior on observation noise.
    pub noise_prior_scale: f64,
    /// Coverage of the reported uncertainty interval.
    pub interval_width: f64,
    /// Simulation draws used to estimate the interval.
    pub uncertainty_samples: usize,
    /// Minimum non-missing points required to fit.
    pub min_observed: usize,
    pub max_iters: usize,
    pub tolerance: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            changepoint_prior_scale: 0.7,
            n_changepoints: 25,
            changepoint_range: 0.8,
            trend_prior_scale: 5.0,
            noise_prior_scale: 0.5,
            interval_width: 0.8,
            uncertainty_samples: 1000,
            min_observed: 2,
            max_iters: 200,
            tolerance: 1e-8,
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// History before this year is dropped before anything else runs.
    pub start_year: i32,
    /// Number of future years to forecast.
    pub horizon: usize,
    /// Base seed for the uncertainty simulation.
    pub seed: u64,
    pub model: ModelConfig,

    pub print_report: bool,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_transitions: Option<PathBuf>,
    pub export_summary: Option<PathBuf>,
}

impl ForecastConfig {
    /// Configuration with the fixed defaults for the given input/output files.
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            start_year: 2010,
            horizon: 7,
            seed: 42,
            model: ModelConfig::default(),
            print_report: false,
            plot: false,
            plot_width: 72,
            plot_height: 16,
            export_transitions: None,
            export_summary: None,
        }
    }
}
