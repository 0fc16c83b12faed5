//! Trend model implementation.
//!
//! Kept as small pure functions so the fitter and the uncertainty simulation
//! can share the same evaluation code.

pub mod trend;

pub use trend::*;
