//! `democracy-forecast` library crate.
//!
//! The binary (`dfx`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - each pipeline stage (normalize, forecast, classify, aggregate) can be
//!   used on its own

pub mod app;
pub mod batch;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod regime;
pub mod report;
pub mod series;
