//! Per-country trend fitting and forecasting.
//!
//! Responsibilities:
//!
//! - place potential changepoints over observed history
//! - fit the changepoint trend (deterministic MAP estimate)
//! - simulate predictive intervals
//! - expose the per-country `forecast` contract

pub mod changepoints;
pub mod fitter;
pub mod forecaster;
pub mod uncertainty;

pub use changepoints::*;
pub use fitter::*;
pub use forecaster::*;
pub use uncertainty::*;
