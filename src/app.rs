//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - parses CLI arguments and installs the log subscriber
//! - runs the forecast pipeline
//! - prints reports/plots

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, ForecastArgs, ReportArgs};
use crate::domain::{ForecastConfig, YearRange};
use crate::error::AppError;
use crate::io::ingest::{filter_from_year, load_observations};
use crate::report::DataQualityReport;

pub mod pipeline;

/// Entry point for the `dfx` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Forecast(args) => handle_forecast(args),
        Command::Report(args) => handle_report(args),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A second init (e.g. from tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_forecast(args: ForecastArgs) -> Result<(), AppError> {
    let config = forecast_config_from_args(&args);
    let run = pipeline::run_pipeline(&config)?;

    if config.print_report {
        println!(
            "{}",
            crate::report::format_quality_report(&run.quality, Some((config.start_year, run.dropped_before_start)))
        );
    }
    if config.plot {
        println!(
            "{}",
            crate::plot::render_year_chart(&run.quality.global_trend, config.plot_width, config.plot_height)
        );
    }

    println!("{}", crate::report::format_batch_summary(&run.batch, &config));
    if config.print_report {
        println!("{}", crate::report::format_transitions(&run.batch.transitions));
    }
    println!("Wrote {} rows to {}", run.batch.rows.len(), config.output_path.display());

    Ok(())
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let ingest = load_observations(&args.input)?;
    let (observations, dropped) = filter_from_year(ingest.observations, args.start_year);
    if YearRange::spanning(&observations).is_none() {
        return Err(AppError::new(3, format!("No rows at or after {}.", args.start_year)));
    }

    let report = DataQualityReport::from_observations(&observations);
    println!(
        "{}",
        crate::report::format_quality_report(&report, Some((args.start_year, dropped)))
    );
    if args.plot {
        println!("{}", crate::plot::render_year_chart(&report.global_trend, args.width, args.height));
    }
    Ok(())
}

pub fn forecast_config_from_args(args: &ForecastArgs) -> ForecastConfig {
    let mut config = ForecastConfig::new(&args.input, &args.output);
    config.start_year = args.start_year;
    config.horizon = args.horizon;
    config.seed = args.seed;
    config.print_report = args.report || args.plot;
    config.plot = args.plot;
    config.plot_width = args.width;
    config.plot_height = args.height;
    config.export_transitions = args.export_transitions.clone();
    config.export_summary = args.export_summary.clone();
    config
}
