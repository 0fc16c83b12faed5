//! Error types.
//!
//! Two classes of failure exist in a run:
//!
//! - `AppError`: fatal, batch-level. Carries the process exit code.
//! - `ForecastError`: recoverable, scoped to a single country's fit. The batch
//!   aggregator decides what to do with it; it never aborts a run by itself.

use thiserror::Error;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Why a single country could not be forecast.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    #[error("insufficient data: {observed} observed score(s), at least {required} required")]
    InsufficientData { observed: usize, required: usize },

    #[error("horizon must be at least 1 year")]
    InvalidHorizon,

    #[error("least-squares system is singular")]
    Singular,

    #[error("non-finite values produced during {stage}")]
    NonFinite { stage: &'static str },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_error_keeps_exit_code_and_message() {
        let err = AppError::new(3, "nothing to do");
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.to_string(), "nothing to do");
    }

    #[test]
    fn forecast_error_messages_name_the_cause() {
        let err = ForecastError::InsufficientData {
            observed: 1,
            required: 2,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data: 1 observed score(s), at least 2 required"
        );
    }
}
