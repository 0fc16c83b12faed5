//! Per-country forecast.
//!
//! Turns one normalized series into fitted values for every input year and
//! forecasts for the `horizon` years after the series' last year:
//!
//! 1. keep the observed (non-missing) years; gaps never enter the fit
//! 2. map dates onto the scaled axes (time in `[0, 1]` over observed history,
//!    scores divided by their maximum magnitude)
//! 3. place changepoints, fit the trend, simulate intervals
//! 4. map back to score units and clamp every value to the score domain
//!
//! History is dated `YYYY-01-01`; forecast years are dated at year end
//! (`YYYY-12-31`). Point, lower and upper are clamped independently, so a
//! clamped point can land outside its own interval.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{ForecastPoint, ModelConfig, NormalizedSeries, SCORE_MAX, SCORE_MIN};
use crate::error::ForecastError;
use crate::fit::changepoints::place_changepoints;
use crate::fit::fitter::fit_trend;
use crate::fit::uncertainty::simulate_intervals;

/// Fit summary kept for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct FitDiagnostics {
    pub n_observed: usize,
    pub n_changepoints: usize,
    pub iterations: usize,
    pub converged: bool,
    /// In-sample RMSE in score units.
    pub rmse: f64,
}

/// Output of a successful per-country forecast.
#[derive(Debug, Clone)]
pub struct CountryForecast {
    pub country: String,
    /// One point per year of the input series.
    pub historical: Vec<ForecastPoint>,
    /// One point per future year, immediately after the series' last year.
    pub future: Vec<ForecastPoint>,
    pub diagnostics: FitDiagnostics,
}

/// Forecast `horizon` years past the end of `series`.
pub fn forecast(
    series: &NormalizedSeries,
    horizon: usize,
    model: &ModelConfig,
    seed: u64,
) -> Result<CountryForecast, ForecastError> {
    if horizon == 0 {
        return Err(ForecastError::InvalidHorizon);
    }

    let observed: Vec<(i32, f64)> = series
        .points
        .iter()
        .filter_map(|p| p.score.filter(|s| s.is_finite()).map(|s| (p.year, s)))
        .collect();

    let required = model.min_observed.max(2);
    if observed.len() < required {
        return Err(ForecastError::InsufficientData {
            observed: observed.len(),
            required,
        });
    }

    let (Some(first_year), Some(last_year)) = (series.first_year(), series.last_year()) else {
        return Err(ForecastError::InsufficientData {
            observed: 0,
            required,
        });
    };

    let last_future = i32::try_from(horizon)
        .ok()
        .and_then(|h| last_year.checked_add(h))
        .ok_or(ForecastError::InvalidHorizon)?;

    let history_start = year_start(observed[0].0)?;
    let history_end = year_start(observed[observed.len() - 1].0)?;
    let span_days = (history_end - history_start).num_days() as f64;
    if span_days <= 0.0 {
        return Err(ForecastError::InsufficientData {
            observed: 1,
            required,
        });
    }
    let scale_t = |date: NaiveDate| (date - history_start).num_days() as f64 / span_days;

    let y_max = observed.iter().map(|(_, s)| s.abs()).fold(0.0_f64, f64::max);
    let y_scale = if y_max > 0.0 { y_max } else { 1.0 };

    let t_obs: Vec<f64> = observed
        .iter()
        .map(|&(year, _)| year_start(year).map(scale_t))
        .collect::<Result<_, _>>()?;
    let y_obs: Vec<f64> = observed.iter().map(|&(_, s)| s / y_scale).collect();

    let changepoints = place_changepoints(&t_obs, model.n_changepoints, model.changepoint_range);
    let fit = fit_trend(&t_obs, &y_obs, &changepoints, model)?;

    // Evaluation grid: every series year (history) followed by future years.
    let future_years: Vec<i32> = (last_year + 1..=last_future).collect();
    let mut years: Vec<i32> = (first_year..=last_year).collect();
    let mut t_eval: Vec<f64> = years
        .iter()
        .map(|&y| year_start(y).map(scale_t))
        .collect::<Result<_, _>>()?;
    for &year in &future_years {
        t_eval.push(scale_t(year_end(year)?));
        years.push(year);
    }

    let intervals = simulate_intervals(
        &fit,
        &t_eval,
        model.uncertainty_samples,
        model.interval_width,
        country_seed(seed, &series.country),
    )?;

    let n_hist = (last_year - first_year + 1) as usize;
    let mut points = Vec::with_capacity(years.len());
    for (i, &year) in years.iter().enumerate() {
        let estimate = fit.params.predict(t_eval[i]) * y_scale;
        let lower = intervals.lower[i] * y_scale;
        let upper = intervals.upper[i] * y_scale;
        if !(estimate.is_finite() && lower.is_finite() && upper.is_finite()) {
            return Err(ForecastError::NonFinite {
                stage: "prediction",
            });
        }
        points.push(ForecastPoint {
            country: series.country.clone(),
            year,
            estimate: clamp_score(estimate),
            lower: clamp_score(lower),
            upper: clamp_score(upper),
        });
    }
    let future = points.split_off(n_hist);

    let diagnostics = FitDiagnostics {
        n_observed: observed.len(),
        n_changepoints: changepoints.len(),
        iterations: fit.iterations,
        converged: fit.converged,
        rmse: fit.rmse * y_scale,
    };
    debug!(
        country = %series.country,
        n_observed = diagnostics.n_observed,
        n_changepoints = diagnostics.n_changepoints,
        iterations = diagnostics.iterations,
        converged = diagnostics.converged,
        rmse = diagnostics.rmse,
        "fitted trend"
    );

    Ok(CountryForecast {
        country: series.country.clone(),
        historical: points,
        future,
        diagnostics,
    })
}

/// Clamp into the score domain.
pub fn clamp_score(v: f64) -> f64 {
    v.clamp(SCORE_MIN, SCORE_MAX)
}

/// `YYYY-01-01`.
pub fn year_start(year: i32) -> Result<NaiveDate, ForecastError> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| ForecastError::InvalidInput(format!("year {year} is out of calendar range")))
}

/// `YYYY-12-31`.
pub fn year_end(year: i32) -> Result<NaiveDate, ForecastError> {
    NaiveDate::from_ymd_opt(year, 12, 31)
        .ok_or_else(|| ForecastError::InvalidInput(format!("year {year} is out of calendar range")))
}

/// Per-country RNG seed: stable for a given base seed and country name.
fn country_seed(seed: u64, country: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    country.hash(&mut hasher);
    hasher.finish()
}
