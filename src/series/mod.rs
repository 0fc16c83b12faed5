//! Per-country series normalization.
//!
//! The forecaster expects a regular yearly grid. Source data is ragged: a
//! country may be missing whole years, or carry a row with an empty score.
//! Both cases end up as an explicit `None` on the grid; nothing is
//! interpolated here.

use std::collections::HashMap;

use tracing::warn;

use crate::domain::{NormalizedSeries, Observation, SeriesPoint, YearRange};

/// Build the gap-filled series for one country over `range`.
///
/// Years outside `range` are ignored. When a year appears more than once the
/// last observation wins. An empty or inverted range yields an empty series.
pub fn normalize(country: &str, observations: &[(i32, Option<f64>)], range: YearRange) -> NormalizedSeries {
    if range.is_empty() {
        return NormalizedSeries {
            country: country.to_string(),
            points: Vec::new(),
        };
    }

    let mut slots: Vec<Option<Option<f64>>> = vec![None; range.len()];
    for &(year, score) in observations {
        if !range.contains(year) {
            continue;
        }
        let idx = (year - range.min) as usize;
        if slots[idx].is_some() {
            warn!(country, year, "duplicate year in input; keeping the later row");
        }
        slots[idx] = Some(score);
    }

    let points = range
        .years()
        .zip(slots)
        .map(|(year, slot)| SeriesPoint {
            year,
            score: slot.flatten(),
        })
        .collect();

    NormalizedSeries {
        country: country.to_string(),
        points,
    }
}

/// Group observations by country, preserving first-appearance order.
pub fn group_by_country(observations: &[Observation]) -> Vec<(String, Vec<(i32, Option<f64>)>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<(i32, Option<f64>)>)> = Vec::new();

    for obs in observations {
        let slot = *index.entry(obs.country.as_str()).or_insert_with(|| {
            groups.push((obs.country.clone(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push((obs.year, obs.score));
    }

    groups
}
