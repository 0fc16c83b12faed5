//! Regime classification and transition detection.
//!
//! Thresholds are fixed and evaluated top-down; the first match wins.

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::domain::{OutputRow, Regime, RegimeTransition};

pub const FULL_DEMOCRACY_MIN: f64 = 8.01;
pub const FLAWED_DEMOCRACY_MIN: f64 = 6.01;
pub const HYBRID_REGIME_MIN: f64 = 4.01;

/// Classify a score. A missing score has no regime.
pub fn classify(score: Option<f64>) -> Option<Regime> {
    let score = score?;
    if score.is_nan() {
        return None;
    }

    let regime = if score >= FULL_DEMOCRACY_MIN {
        Regime::FullDemocracy
    } else if score >= FLAWED_DEMOCRACY_MIN {
        Regime::FlawedDemocracy
    } else if score >= HYBRID_REGIME_MIN {
        Regime::HybridRegime
    } else {
        Regime::Authoritarian
    };
    Some(regime)
}

/// Compare each country's regime at `latest_year` with `target_year`.
///
/// Rows are grouped by country; the output is sorted by country. Two missing
/// regimes compare equal (no change). A missing regime on exactly one side
/// counts as a change.
pub fn detect_transitions(rows: &[OutputRow], latest_year: i32, target_year: i32) -> Vec<RegimeTransition> {
    let mut by_country: BTreeMap<&str, (Option<Option<Regime>>, Option<Option<Regime>>)> = BTreeMap::new();

    for row in rows {
        let entry = by_country.entry(row.country.as_str()).or_default();
        let year = row.ds.year();
        // First row per (country, year) wins.
        if year == latest_year && entry.0.is_none() {
            entry.0 = Some(row.regime);
        }
        if year == target_year && entry.1.is_none() {
            entry.1 = Some(row.regime);
        }
    }

    by_country
        .into_iter()
        .map(|(country, (latest, target))| {
            let regime_latest = latest.flatten();
            let regime_target = target.flatten();
            RegimeTransition {
                country: country.to_string(),
                latest_year,
                target_year,
                regime_latest,
                regime_target,
                changed_regime: regime_latest != regime_target,
            }
        })
        .collect()
}
