//! Error types.
//!
//! - `AppError` is what the binary reports: a message plus a process exit code.
//! - `AnalysisError` is the typed failure of the catalog/fit core. It converts
//!   into `AppError` at the command boundary.

use thiserror::Error;

/// Exit code for bad input, configuration or I/O.
pub const EXIT_INPUT: u8 = 2;
/// Exit code for "not enough data to do the requested work".
pub const EXIT_DATA: u8 = 3;
/// Exit code for numeric or rendering failures.
pub const EXIT_COMPUTE: u8 = 4;

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

/// Failures of the catalog loader and the fit estimator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// A two-parameter line needs at least three points.
    #[error("insufficient samples: need at least 3 points, got {n}")]
    InsufficientSamples { n: usize },
    /// Zero/non-finite uncertainties, identical x values, or a singular solve.
    #[error("degenerate input: {0}")]
    DegenerateInput(String),
    /// Missing column or unparseable value in the catalog.
    #[error("malformed catalog: {0}")]
    MalformedCatalog(String),
}

impl AnalysisError {
    pub fn exit_code(&self) -> u8 {
        match self {
            AnalysisError::InsufficientSamples { .. } => EXIT_DATA,
            AnalysisError::DegenerateInput(_) => EXIT_COMPUTE,
            AnalysisError::MalformedCatalog(_) => EXIT_INPUT,
        }
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_errors_map_to_exit_codes() {
        let e: AppError = AnalysisError::InsufficientSamples { n: 2 }.into();
        assert_eq!(e.exit_code(), EXIT_DATA);
        assert!(e.message().contains("got 2"));

        let e: AppError = AnalysisError::MalformedCatalog("missing column `Z`".into()).into();
        assert_eq!(e.exit_code(), EXIT_INPUT);

        let e: AppError = AnalysisError::DegenerateInput("all x identical".into()).into();
        assert_eq!(e.exit_code(), EXIT_COMPUTE);
    }
}
