//! Data-quality checks and terminal reporting.
//!
//! `DataQualityReport` collects the descriptive statistics printed before a
//! run (coverage, missing values, per-year counts, global average trend);
//! `format` turns it and the batch results into text.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::domain::{Observation, YearRange};

pub mod format;

pub use format::*;

/// Descriptive statistics about an input dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DataQualityReport {
    pub n_rows: usize,
    pub n_countries: usize,
    pub year_range: Option<YearRange>,
    /// Rows per country, fewest first (ties by name).
    pub rows_per_country: Vec<(String, usize)>,
    pub missing_code: usize,
    pub missing_score: usize,
    /// Rows per year, ascending by year.
    pub rows_per_year: Vec<(i32, usize)>,
    /// Years inside `year_range` with no rows at all.
    pub missing_years: Vec<i32>,
    /// Countries with at least one missing score, fewest missing first.
    pub countries_with_missing: Vec<(String, usize)>,
    /// Mean non-missing score per year.
    pub global_trend: Vec<(i32, f64)>,
}

impl DataQualityReport {
    pub fn from_observations(observations: &[Observation]) -> Self {
        let mut per_country: HashMap<&str, usize> = HashMap::new();
        let mut missing_per_country: HashMap<&str, usize> = HashMap::new();
        let mut per_year: BTreeMap<i32, usize> = BTreeMap::new();
        let mut score_sums: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
        let mut missing_code = 0;
        let mut missing_score = 0;

        for o in observations {
            *per_country.entry(o.country.as_str()).or_default() += 1;
            *per_year.entry(o.year).or_default() += 1;
            if o.code.is_none() {
                missing_code += 1;
            }
            match o.score {
                Some(s) => {
                    let e = score_sums.entry(o.year).or_insert((0.0, 0));
                    e.0 += s;
                    e.1 += 1;
                }
                None => {
                    missing_score += 1;
                    *missing_per_country.entry(o.country.as_str()).or_default() += 1;
                }
            }
        }

        let year_range = YearRange::spanning(observations);
        let present: BTreeSet<i32> = per_year.keys().copied().collect();
        let missing_years = year_range
            .map(|r| r.years().filter(|y| !present.contains(y)).collect())
            .unwrap_or_default();

        Self {
            n_rows: observations.len(),
            n_countries: per_country.len(),
            year_range,
            rows_per_country: sorted_counts(per_country),
            missing_code,
            missing_score,
            rows_per_year: per_year.into_iter().collect(),
            missing_years,
            countries_with_missing: sorted_counts(missing_per_country),
            global_trend: score_sums
                .into_iter()
                .map(|(year, (sum, n))| (year, sum / n as f64))
                .collect(),
        }
    }
}

fn sorted_counts(map: HashMap<&str, usize>) -> Vec<(String, usize)> {
    let mut out: Vec<(String, usize)> = map.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
    out.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(country: &str, code: Option<&str>, year: i32, score: Option<f64>) -> Observation {
        Observation {
            country: country.to_string(),
            code: code.map(str::to_string),
            year,
            score,
        }
    }

    #[test]
    fn report_counts_coverage_and_gaps() {
        let data = vec![
            obs("A", Some("AAA"), 2010, Some(4.0)),
            obs("A", Some("AAA"), 2011, None),
            obs("A", Some("AAA"), 2013, Some(6.0)),
            obs("B", None, 2010, Some(8.0)),
        ];
        let r = DataQualityReport::from_observations(&data);

        assert_eq!(r.n_rows, 4);
        assert_eq!(r.n_countries, 2);
        assert_eq!(r.year_range, Some(YearRange::new(2010, 2013)));
        assert_eq!(r.rows_per_country, vec![("B".to_string(), 1), ("A".to_string(), 3)]);
        assert_eq!(r.missing_code, 1);
        assert_eq!(r.missing_score, 1);
        assert_eq!(r.rows_per_year, vec![(2010, 2), (2011, 1), (2013, 1)]);
        assert_eq!(r.missing_years, vec![2012]);
        assert_eq!(r.countries_with_missing, vec![("A".to_string(), 1)]);
        assert_eq!(r.global_trend, vec![(2010, 6.0), (2013, 6.0)]);
    }

    #[test]
    fn empty_dataset_has_no_range() {
        let r = DataQualityReport::from_observations(&[]);
        assert_eq!(r.year_range, None);
        assert!(r.missing_years.is_empty());
        assert!(r.global_trend.is_empty());
    }
}
