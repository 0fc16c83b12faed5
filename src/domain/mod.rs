//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input observations and the gap-filled per-country series
//! - forecast outputs (`ForecastPoint`, `RegimeTransition`, `OutputRow`)
//! - run configuration (`ForecastConfig`, `ModelConfig`)

pub mod types;

pub use types::*;
