//! Formatted terminal output.
//!
//! Everything that turns run results into text lives here so the
//! forecasting code never touches `println!`.

use crate::batch::BatchOutput;
use crate::domain::{ForecastConfig, Regime, RegimeTransition};

use super::DataQualityReport;

/// Countries listed in the "fewest observations" section.
pub const SMALLEST_COVERAGE_N: usize = 10;

/// Format the dataset overview printed before forecasting.
pub fn format_quality_report(report: &DataQualityReport, dropped_before_start: Option<(i32, usize)>) -> String {
    let mut out = String::new();

    out.push_str("=== dfx - Democracy Index Forecast ===\n");
    out.push_str(&format!("Rows: {} | countries: {}\n", report.n_rows, report.n_countries));
    match report.year_range {
        Some(r) => out.push_str(&format!("Years: [{}, {}] ({} years)\n", r.min, r.max, r.len())),
        None => out.push_str("Years: none\n"),
    }
    if let Some((start_year, dropped)) = dropped_before_start {
        out.push_str(&format!("Dropped {dropped} row(s) before {start_year}\n"));
    }

    out.push_str("\nMissing values per column:\n");
    out.push_str(&format!("  {:<8} {}\n", "country", 0));
    out.push_str(&format!("  {:<8} {}\n", "code", report.missing_code));
    out.push_str(&format!("  {:<8} {}\n", "year", 0));
    out.push_str(&format!("  {:<8} {}\n", "score", report.missing_score));

    out.push_str(&format!("\nFewest observations ({} countries):\n", SMALLEST_COVERAGE_N));
    for (country, n) in report.rows_per_country.iter().take(SMALLEST_COVERAGE_N) {
        out.push_str(&format!("  {:<32} {n}\n", truncate(country, 32)));
    }

    out.push_str("\nRows per year:\n");
    for (year, n) in &report.rows_per_year {
        out.push_str(&format!("  {year} {n}\n"));
    }

    if report.missing_years.is_empty() {
        out.push_str("\nNo years missing entirely.\n");
    } else {
        let years: Vec<String> = report.missing_years.iter().map(|y| y.to_string()).collect();
        out.push_str(&format!("\nYears missing entirely: {}\n", years.join(", ")));
    }

    if report.countries_with_missing.is_empty() {
        out.push_str("No countries with missing scores.\n");
    } else {
        out.push_str(&format!(
            "Countries with missing scores: {}\n",
            report.countries_with_missing.len()
        ));
        for (country, n) in &report.countries_with_missing {
            out.push_str(&format!("  {:<32} {n}\n", truncate(country, 32)));
        }
    }

    out.push_str("\nGlobal average score by year:\n");
    for (year, mean) in &report.global_trend {
        out.push_str(&format!("  {year} {mean:.3}\n"));
    }

    out
}

/// Format the outcome of a batch run: parameters, failures, fit stats.
pub fn format_batch_summary(batch: &BatchOutput, config: &ForecastConfig) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Forecast: start_year={} | horizon={} | seed={} | latest={} | target={}\n",
        config.start_year, config.horizon, config.seed, batch.latest_year, batch.target_year
    ));
    out.push_str(&format!(
        "Countries: {} forecast, {} failed, {} total | rows={}\n",
        batch.countries_forecast(),
        batch.failures.len(),
        batch.countries_total,
        batch.rows.len()
    ));

    if !batch.failures.is_empty() {
        out.push_str("\nFailed countries:\n");
        for f in &batch.failures {
            out.push_str(&format!("  {:<32} {}\n", truncate(&f.country, 32), f.reason));
        }
    }

    let unconverged = batch.diagnostics.iter().filter(|(_, d)| !d.converged).count();
    if unconverged > 0 {
        out.push_str(&format!("\nFits stopped at the iteration cap: {unconverged}\n"));
    }

    out
}

/// Format the regime transition table. Countries that change regime come first.
pub fn format_transitions(transitions: &[RegimeTransition]) -> String {
    let mut rows: Vec<&RegimeTransition> = transitions.iter().collect();
    rows.sort_by(|a, b| b.changed_regime.cmp(&a.changed_regime).then_with(|| a.country.cmp(&b.country)));

    let changed = transitions.iter().filter(|t| t.changed_regime).count();

    let mut out = String::new();
    out.push_str(&format!(
        "Regime transitions: {changed} of {} countries change regime\n",
        transitions.len()
    ));
    out.push_str(
        format!(
            "{:<32} {:<18} {:<18} {:<7}\n",
            "country", "regime_latest", "regime_target", "changed"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<32} {:-<18} {:-<18} {:-<7}\n", "", "", "", "").trim_end());
    out.push('\n');

    for t in rows {
        out.push_str(
            format!(
                "{:<32} {:<18} {:<18} {:<7}\n",
                truncate(&t.country, 32),
                fmt_regime(t.regime_latest),
                fmt_regime(t.regime_target),
                if t.changed_regime { "yes" } else { "no" },
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn fmt_regime(r: Option<Regime>) -> &'static str {
    r.map(|r| r.label()).unwrap_or("-")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Observation, YearRange};

    fn transition(country: &str, latest: Option<Regime>, target: Option<Regime>) -> RegimeTransition {
        RegimeTransition {
            country: country.to_string(),
            latest_year: 2024,
            target_year: 2030,
            regime_latest: latest,
            regime_target: target,
            changed_regime: latest != target,
        }
    }

    #[test]
    fn transitions_table_lists_changes_first() {
        let rows = vec![
            transition("Alpha", Some(Regime::FullDemocracy), Some(Regime::FullDemocracy)),
            transition("Beta", Some(Regime::HybridRegime), Some(Regime::Authoritarian)),
            transition("Gamma", None, Some(Regime::Authoritarian)),
        ];
        let txt = format_transitions(&rows);
        let lines: Vec<&str> = txt.lines().collect();

        assert_eq!(lines[0], "Regime transitions: 2 of 3 countries change regime");
        assert!(lines[3].starts_with("Beta"));
        assert!(lines[3].ends_with("yes"));
        assert!(lines[4].starts_with("Gamma"));
        assert!(lines[4].contains(" - "));
        assert!(lines[5].starts_with("Alpha"));
        assert!(lines[5].ends_with("no"));
    }

    #[test]
    fn quality_report_mentions_gaps() {
        let data = vec![
            Observation {
                country: "A".to_string(),
                code: None,
                year: 2010,
                score: Some(5.0),
            },
            Observation {
                country: "A".to_string(),
                code: None,
                year: 2012,
                score: None,
            },
        ];
        let report = DataQualityReport::from_observations(&data);
        assert_eq!(report.year_range, Some(YearRange::new(2010, 2012)));

        let txt = format_quality_report(&report, Some((2010, 3)));
        assert!(txt.contains("Rows: 2 | countries: 1"));
        assert!(txt.contains("Dropped 3 row(s) before 2010"));
        assert!(txt.contains("Years missing entirely: 2011"));
        assert!(txt.contains("Countries with missing scores: 1"));
        assert!(txt.contains("  2010 5.000"));
    }

    #[test]
    fn truncate_keeps_short_names() {
        assert_eq!(truncate("Chile", 10), "Chile");
        assert_eq!(truncate("Central African Republic", 8), "Central.");
    }
}
