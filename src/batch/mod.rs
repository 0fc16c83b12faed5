//! Cross-country aggregation.
//!
//! Runs normalize → forecast once per country, keeps going when a country
//! fails, then assembles the combined historical + forecast table and the
//! regime transitions.
//!
//! Countries are independent, so the per-country work runs on the rayon pool.
//! Nothing downstream depends on scheduling: results are collected in input
//! order and the combined table is sorted by (country, year) afterwards.

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::domain::{
    CountryFailure, ForecastPoint, ModelConfig, Observation, OutputRow, RegimeTransition, Source, YearRange,
};
use crate::error::ForecastError;
use crate::fit::forecaster::{FitDiagnostics, forecast, year_start};
use crate::regime::{classify, detect_transitions};
use crate::series::{group_by_country, normalize};

/// Everything a batch run produces.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    /// Future-year points of every successful country, in country input order.
    pub future_table: Vec<ForecastPoint>,
    /// Combined table, sorted by country then year.
    pub rows: Vec<OutputRow>,
    pub transitions: Vec<RegimeTransition>,
    pub failures: Vec<CountryFailure>,
    pub diagnostics: Vec<(String, FitDiagnostics)>,
    pub countries_total: usize,
    pub latest_year: i32,
    pub target_year: i32,
}

impl BatchOutput {
    pub fn countries_forecast(&self) -> usize {
        self.countries_total - self.failures.len()
    }
}

/// Per-country success payload.
#[derive(Debug, Clone)]
struct CountryResult {
    rows: Vec<OutputRow>,
    future: Vec<ForecastPoint>,
    diagnostics: FitDiagnostics,
}

/// Forecast every country in `countries` over the shared `range`.
///
/// `range.max` is the latest historical year; the transition target year is
/// `range.max + horizon - 1`. A country listed in `countries` with no rows in
/// `observations` fails with insufficient data like any other sparse country.
///
/// Errors only when the horizon itself is unusable (zero, or a target year
/// past `i32`); per-country failures are collected instead.
pub fn run_batch(
    countries: &[String],
    observations: &[Observation],
    range: YearRange,
    horizon: usize,
    model: &ModelConfig,
    seed: u64,
) -> Result<BatchOutput, ForecastError> {
    let latest_year = range.max;
    let target_year = target_year(latest_year, horizon)?;

    let groups: HashMap<String, Vec<(i32, Option<f64>)>> = group_by_country(observations).into_iter().collect();
    let empty = Vec::new();

    info!(countries = countries.len(), horizon, "forecasting countries");

    let outcomes: Vec<(&String, Result<CountryResult, ForecastError>)> = countries
        .par_iter()
        .map(|country| {
            let obs = groups.get(country).unwrap_or(&empty);
            (country, forecast_country(country, obs, range, horizon, model, seed))
        })
        .collect();

    let mut future_table = Vec::new();
    let mut rows = Vec::new();
    let mut failures = Vec::new();
    let mut diagnostics = Vec::new();

    for (country, outcome) in outcomes {
        match outcome {
            Ok(result) => {
                future_table.extend(result.future);
                rows.extend(result.rows);
                diagnostics.push((country.clone(), result.diagnostics));
            }
            Err(err) => {
                warn!(country = %country, error = %err, "forecast failed; skipping country");
                failures.push(CountryFailure {
                    country: country.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    rows.sort_by(|a, b| a.country.cmp(&b.country).then(a.ds.cmp(&b.ds)));

    let transitions = detect_transitions(&rows, latest_year, target_year);

    info!(
        succeeded = countries.len() - failures.len(),
        failed = failures.len(),
        rows = rows.len(),
        "batch complete"
    );

    Ok(BatchOutput {
        future_table,
        rows,
        transitions,
        failures,
        diagnostics,
        countries_total: countries.len(),
        latest_year,
        target_year,
    })
}

/// Last forecast year: `latest_year + horizon - 1`.
pub fn target_year(latest_year: i32, horizon: usize) -> Result<i32, ForecastError> {
    let h = i32::try_from(horizon).map_err(|_| ForecastError::InvalidHorizon)?;
    if h == 0 {
        return Err(ForecastError::InvalidHorizon);
    }
    latest_year.checked_add(h - 1).ok_or(ForecastError::InvalidHorizon)
}

fn forecast_country(
    country: &str,
    observations: &[(i32, Option<f64>)],
    range: YearRange,
    horizon: usize,
    model: &ModelConfig,
    seed: u64,
) -> Result<CountryResult, ForecastError> {
    let series = normalize(country, observations, range);
    let fc = forecast(&series, horizon, model, seed)?;

    let mut rows = Vec::with_capacity(series.len() + fc.future.len());
    for p in &series.points {
        rows.push(OutputRow {
            country: country.to_string(),
            ds: year_start(p.year)?,
            value: p.score,
            source: Source::Historical,
            regime: classify(p.score),
        });
    }
    for p in &fc.future {
        rows.push(OutputRow {
            country: country.to_string(),
            ds: year_start(p.year)?,
            value: Some(p.estimate),
            source: Source::Forecast,
            regime: classify(Some(p.estimate)),
        });
    }

    Ok(CountryResult {
        rows,
        future: fc.future,
        diagnostics: fc.diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Regime, SCORE_MAX, SCORE_MIN};
    use chrono::Datelike;

    fn obs(country: &str, year: i32, score: Option<f64>) -> Observation {
        Observation {
            country: country.to_string(),
            code: None,
            year,
            score,
        }
    }

    fn linear(country: &str, from: i32, to: i32, start: f64, step: f64) -> Vec<Observation> {
        (from..=to)
            .map(|y| obs(country, y, Some(start + step * (y - from) as f64)))
            .collect()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn one_bad_country_does_not_blank_the_batch() {
        let mut data = linear("Good", 2010, 2024, 7.0, 0.02);
        data.extend(linear("AlsoGood", 2010, 2024, 2.0, 0.01));
        data.push(obs("Sparse", 2014, Some(5.0)));
        for y in (2010..=2024).filter(|&y| y != 2014) {
            data.push(obs("Sparse", y, None));
        }

        let out = run_batch(
            &names(&["Good", "Sparse", "AlsoGood"]),
            &data,
            YearRange::new(2010, 2024),
            7,
            &ModelConfig::default(),
            42,
        )
        .unwrap();

        assert_eq!(out.failures.len(), 1);
        assert_eq!(out.failures[0].country, "Sparse");
        assert!(out.failures[0].reason.contains("insufficient data"));
        assert!(out.future_table.iter().all(|p| p.country != "Sparse"));
        assert_eq!(out.future_table.len(), 2 * 7);
        assert!(out.rows.iter().all(|r| r.country != "Sparse"));
        assert_eq!(out.countries_forecast(), 2);
    }

    #[test]
    fn row_count_is_successes_times_years() {
        let mut data = linear("A", 2010, 2020, 6.5, 0.0);
        data.extend(linear("B", 2010, 2020, 8.5, -0.01));
        data.extend(linear("C", 2012, 2018, 4.5, 0.0)); // shorter history, still gap-filled
        let range = YearRange::new(2010, 2020);

        let out = run_batch(
            &names(&["A", "B", "C"]),
            &data,
            range,
            5,
            &ModelConfig::default(),
            1,
        )
        .unwrap();
        assert!(out.failures.is_empty());
        assert_eq!(out.rows.len(), 3 * (range.len() + 5));
    }

    #[test]
    fn combined_table_is_sorted_and_tagged() {
        let mut data = linear("Zeta", 2010, 2015, 5.0, 0.1);
        data.extend(linear("Alpha", 2010, 2015, 9.0, 0.0));
        let out = run_batch(
            &names(&["Zeta", "Alpha"]),
            &data,
            YearRange::new(2010, 2015),
            3,
            &ModelConfig::default(),
            5,
        )
        .unwrap();

        for pair in out.rows.windows(2) {
            let a = (&pair[0].country, pair[0].ds);
            let b = (&pair[1].country, pair[1].ds);
            assert!(a < b, "rows out of order: {a:?} then {b:?}");
        }
        for row in &out.rows {
            assert_eq!(row.ds.month(), 1);
            assert_eq!(row.ds.day(), 1);
            let expected = if row.ds.year() <= 2015 { Source::Historical } else { Source::Forecast };
            assert_eq!(row.source, expected);
            assert_eq!(row.regime, classify(row.value));
        }
    }

    #[test]
    fn forecast_rows_are_clamped() {
        let data = linear("Rising", 2010, 2020, 8.0, 0.19);
        let out = run_batch(
            &names(&["Rising"]),
            &data,
            YearRange::new(2010, 2020),
            7,
            &ModelConfig::default(),
            2,
        )
        .unwrap();
        for p in &out.future_table {
            for v in [p.estimate, p.lower, p.upper] {
                assert!((SCORE_MIN..=SCORE_MAX).contains(&v));
            }
        }
        assert_eq!(out.future_table.last().unwrap().estimate, SCORE_MAX);
    }

    #[test]
    fn low_flat_country_has_no_transition() {
        let data = linear("Testland", 2010, 2020, 3.0, 0.05);
        let out = run_batch(
            &names(&["Testland"]),
            &data,
            YearRange::new(2010, 2020),
            7,
            &ModelConfig::default(),
            42,
        )
        .unwrap();

        assert!(out.future_table.iter().all(|p| classify(Some(p.estimate)) == Some(Regime::Authoritarian)));
        assert_eq!(out.transitions.len(), 1);
        let t = &out.transitions[0];
        assert_eq!((t.latest_year, t.target_year), (2020, 2026));
        assert_eq!(t.regime_latest, Some(Regime::Authoritarian));
        assert_eq!(t.regime_target, Some(Regime::Authoritarian));
        assert!(!t.changed_regime);
    }

    #[test]
    fn unknown_country_fails_cleanly() {
        let data = linear("A", 2010, 2015, 5.0, 0.0);
        let out = run_batch(
            &names(&["A", "Ghost"]),
            &data,
            YearRange::new(2010, 2015),
            2,
            &ModelConfig::default(),
            0,
        )
        .unwrap();
        assert_eq!(out.failures.len(), 1);
        assert_eq!(out.failures[0].country, "Ghost");
    }

    #[test]
    fn target_year_rejects_overflow() {
        assert_eq!(target_year(2020, 7), Ok(2026));
        assert_eq!(target_year(2020, 0), Err(ForecastError::InvalidHorizon));
        assert_eq!(target_year(i32::MAX - 1, 7), Err(ForecastError::InvalidHorizon));
        assert_eq!(target_year(2020, usize::MAX), Err(ForecastError::InvalidHorizon));
    }

    #[test]
    fn huge_horizon_is_rejected_before_forecasting() {
        let data = linear("A", 2010, 2015, 5.0, 0.0);
        let err = run_batch(
            &names(&["A"]),
            &data,
            YearRange::new(2010, 2015),
            usize::MAX,
            &ModelConfig::default(),
            0,
        )
        .unwrap_err();
        assert_eq!(err, ForecastError::InvalidHorizon);
    }

    #[test]
    fn reruns_give_identical_rows() {
        let mut data = linear("A", 2010, 2024, 6.0, 0.03);
        data.extend(linear("B", 2010, 2024, 4.2, -0.04));
        let countries = names(&["A", "B"]);
        let range = YearRange::new(2010, 2024);
        let a = run_batch(&countries, &data, range, 7, &ModelConfig::default(), 42).unwrap();
        let b = run_batch(&countries, &data, range, 7, &ModelConfig::default(), 42).unwrap();
        assert_eq!(a.rows, b.rows);
        assert_eq!(a.transitions, b.transitions);
    }
}
