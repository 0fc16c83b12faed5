use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use democracy_forecast::app::pipeline::run_pipeline;
use democracy_forecast::domain::{ForecastConfig, Regime};
use democracy_forecast::io::summary::read_summary_json;

fn write_fixture(path: &Path) {
    let mut csv = String::from("Entity,Code,Year,Democracy score\n");
    for year in 2006..=2020 {
        let t = (year - 2006) as f64;
        writeln!(csv, "Norland,NRL,{year},{:.2}", 9.2 + 0.01 * t).unwrap();
        writeln!(csv, "Testland,TST,{year},{:.2}", 2.4 + 0.05 * t).unwrap();
        if year == 2015 {
            writeln!(csv, "Sparseland,SPL,{year},5.0").unwrap();
        } else {
            writeln!(csv, "Sparseland,SPL,{year},").unwrap();
        }
    }
    // Gappy country: a few missing years in the middle.
    for year in [2010, 2011, 2012, 2016, 2017, 2019, 2020] {
        writeln!(csv, "Gapland,GAP,{year},6.5").unwrap();
    }
    fs::write(path, csv).unwrap();
}

fn read_rows(path: &Path) -> Vec<csv::StringRecord> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let header: Vec<&str> = reader.headers().unwrap().iter().collect();
    assert_eq!(header, vec!["country", "ds", "value", "source", "regime"]);
    reader.records().map(|r| r.unwrap()).collect()
}

#[test]
fn forecast_skips_sparse_country_and_keeps_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("democracy.csv");
    let output = dir.path().join("out.csv");
    let summary = dir.path().join("summary.json");
    write_fixture(&input);

    let mut config = ForecastConfig::new(&input, &output);
    config.export_summary = Some(summary.clone());
    let run = run_pipeline(&config).unwrap();

    assert_eq!(run.dropped_before_start, 4 * 3);
    assert_eq!((run.range.min, run.range.max), (2010, 2020));
    assert_eq!(run.batch.failures.len(), 1);
    assert_eq!(run.batch.failures[0].country, "Sparseland");

    let rows = read_rows(&output);
    // 3 successful countries * (11 history years + 7 forecast years)
    assert_eq!(rows.len(), 3 * (11 + 7));
    assert!(rows.iter().all(|r| &r[0] != "Sparseland"));

    let forecasts: Vec<&csv::StringRecord> = rows.iter().filter(|r| &r[3] == "forecast").collect();
    assert_eq!(forecasts.len(), 3 * 7);
    for r in &forecasts {
        let v: f64 = r[2].parse().unwrap();
        assert!((0.0..=10.0).contains(&v));
        assert!(r[1].ends_with("-01-01"));
    }

    // Gap years are present in the history with an empty value and regime.
    let gap_2014 = rows
        .iter()
        .find(|r| &r[0] == "Gapland" && &r[1] == "2014-01-01")
        .unwrap();
    assert_eq!((&gap_2014[2], &gap_2014[3], &gap_2014[4]), ("", "historical", ""));

    let s = read_summary_json(&summary).unwrap();
    assert_eq!((s.latest_year, s.target_year), (2020, 2026));
    assert_eq!(s.countries_forecast, 3);
    let testland = s.transitions.iter().find(|t| t.country == "Testland").unwrap();
    assert_eq!(testland.regime_latest, Some(Regime::Authoritarian));
    assert_eq!(testland.regime_target, Some(Regime::Authoritarian));
    assert!(!testland.changed_regime);
}

#[test]
fn reruns_write_identical_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("democracy.csv");
    write_fixture(&input);

    let first = dir.path().join("a.csv");
    let second = dir.path().join("b.csv");
    run_pipeline(&ForecastConfig::new(&input, &first)).unwrap();
    run_pipeline(&ForecastConfig::new(&input, &second)).unwrap();

    assert_eq!(fs::read_to_string(first).unwrap(), fs::read_to_string(second).unwrap());
}

#[test]
fn missing_column_is_fatal_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.csv");
    let output = dir.path().join("out.csv");
    fs::write(&input, "Entity,Code,Year\nNorland,NRL,2015\n").unwrap();

    let err = run_pipeline(&ForecastConfig::new(&input, &output)).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(!output.exists());
}

#[test]
fn every_country_failing_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("sparse.csv");
    let output = dir.path().join("out.csv");
    fs::write(&input, "country,code,year,score\nA,AAA,2015,4.0\nB,BBB,2016,\n").unwrap();

    let err = run_pipeline(&ForecastConfig::new(&input, &output)).unwrap_err();
    assert_eq!(err.exit_code(), 3);
    assert!(!output.exists());
}

#[test]
fn start_year_past_the_data_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("democracy.csv");
    write_fixture(&input);

    let mut config = ForecastConfig::new(&input, dir.path().join("out.csv"));
    config.start_year = 2030;
    assert_eq!(run_pipeline(&config).unwrap_err().exit_code(), 3);
}

#[test]
fn failed_summary_export_leaves_no_combined_table() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("democracy.csv");
    let output = dir.path().join("out.csv");
    write_fixture(&input);

    let mut config = ForecastConfig::new(&input, &output);
    config.export_summary = Some(dir.path().join("no-such-dir").join("summary.json"));
    let err = run_pipeline(&config).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(!output.exists());
}

#[test]
fn typo_year_is_rejected_at_ingest() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("typo.csv");
    let output = dir.path().join("out.csv");
    fs::write(&input, "country,year,score\nA,2147483647,5.0\nA,2147483646,5.1\n").unwrap();

    let err = run_pipeline(&ForecastConfig::new(&input, &output)).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(!output.exists());
}

#[test]
fn horizon_beyond_the_calendar_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("democracy.csv");
    let output = dir.path().join("out.csv");
    write_fixture(&input);

    let mut config = ForecastConfig::new(&input, &output);
    config.horizon = usize::MAX;
    assert_eq!(run_pipeline(&config).unwrap_err().exit_code(), 4);
    assert!(!output.exists());
}
