//! Command-line parsing for the democracy-index forecaster.
//!
//! Argument parsing stays here; `app` turns parsed args into a
//! `ForecastConfig` and dispatches.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "dfx", version, about = "Democracy index forecaster (per-country trend + regime transitions)")]
pub struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Forecast every country and write the combined historical + forecast CSV.
    Forecast(ForecastArgs),
    /// Print the data-quality report for an input CSV without forecasting.
    Report(ReportArgs),
}

/// Options for `dfx forecast`.
#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    /// Input CSV (country/entity, code, year, score columns).
    #[arg(short, long, value_name = "CSV")]
    pub input: PathBuf,

    /// Combined output CSV (`country,ds,value,source,regime`).
    #[arg(short, long, value_name = "CSV", default_value = "democracy_forecast.csv")]
    pub output: PathBuf,

    /// Drop history before this year.
    #[arg(long, default_value_t = 2010)]
    pub start_year: i32,

    /// Number of future years to forecast.
    #[arg(long, default_value_t = 7)]
    pub horizon: usize,

    /// Seed for the uncertainty simulation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Export the regime transition table to CSV.
    #[arg(long, value_name = "CSV")]
    pub export_transitions: Option<PathBuf>,

    /// Export a JSON run summary (parameters, failures, transitions).
    #[arg(long, value_name = "JSON")]
    pub export_summary: Option<PathBuf>,

    /// Print the data-quality report and the transition table.
    #[arg(long)]
    pub report: bool,

    /// Render the global average score chart (implies --report).
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 16)]
    pub height: usize,
}

/// Options for `dfx report`.
#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    /// Input CSV.
    #[arg(short, long, value_name = "CSV")]
    pub input: PathBuf,

    /// Drop history before this year.
    #[arg(long, default_value_t = 2010)]
    pub start_year: i32,

    /// Render the global average score chart.
    #[arg(long)]
    pub plot: bool,

    #[arg(long, default_value_t = 72)]
    pub width: usize,

    #[arg(long, default_value_t = 16)]
    pub height: usize,
}
