//! Error types.
//!
//! `AppError` is the process-boundary error: a message plus the exit code the binary returns.
//! The typed enums below are what library code produces; only configuration and output I/O
//! failures are ever promoted to an `AppError`. Dataset and evaluation errors stay inside a
//! domain report.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::DomainId;

/// Exit code: aggregate verdict is FAIL (predictions contradicted by data).
pub const EXIT_FAIL: u8 = 1;
/// Exit code: aggregate verdict is INSUFFICIENT_DATA (an upstream stage is broken).
pub const EXIT_INSUFFICIENT_DATA: u8 = 3;
/// Exit code: tolerance table or model parameters are unusable.
pub const EXIT_CONFIG: u8 = 4;
/// Exit code: an output artifact could not be written.
pub const EXIT_IO: u8 = 5;

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

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(EXIT_IO, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
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

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::new(EXIT_CONFIG, format!("Configuration error: {err}"))
    }
}

/// Why a dataset could not be used. Always surfaces as `INSUFFICIENT_DATA`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DatasetError {
    #[error("dataset file not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("failed to read '{}': {message}", path.display())]
    Unreadable { path: PathBuf, message: String },

    #[error("missing required column `{column}`")]
    MissingColumn { column: &'static str },

    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },

    #[error("no data rows")]
    Empty,
}

/// A prediction that could not be evaluated for one row. The row counts as a failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("{variable}={value} is outside the model's domain of validity")]
    OutOfDomain { variable: &'static str, value: f64 },

    #[error("non-finite prediction ({value})")]
    NonFinitePrediction { value: f64 },

    #[error("uncertainty {value} cannot normalize a deviation")]
    DegenerateUncertainty { value: f64 },

    #[error("reference value {value} cannot normalize a deviation")]
    DegenerateReference { value: f64 },
}

/// Setup defects: fatal before any verdict is produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("failed to read tolerance file '{}': {message}", path.display())]
    Unreadable { path: PathBuf, message: String },

    #[error("invalid tolerance file '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("unknown domain `{0}` in tolerance table")]
    UnknownDomain(String),

    #[error("no tolerance defined for domain `{0}`")]
    MissingTolerance(DomainId),

    #[error("domain `{domain}` requires a `{name}` summary bound")]
    MissingSummaryBound { domain: DomainId, name: &'static str },

    #[error("domain `{domain}` has unknown summary bound `{name}`")]
    UnknownSummaryBound { domain: DomainId, name: String },

    #[error("domain `{domain}`: {message}")]
    InvalidThreshold { domain: DomainId, message: String },

    #[error("model parameter `{name}` is not finite ({value})")]
    InvalidParameter { name: &'static str, value: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_map_to_config_exit_code() {
        let err: AppError = ConfigError::MissingTolerance(DomainId::DarkMatter).into();
        assert_eq!(err.exit_code(), EXIT_CONFIG);
        assert!(err.to_string().contains("dark_matter"));
    }

    #[test]
    fn dataset_error_messages_name_the_problem() {
        let err = DatasetError::MissingColumn { column: "flux" };
        assert_eq!(err.to_string(), "missing required column `flux`");

        let err = DatasetError::Malformed {
            line: 7,
            message: "non-numeric `ell`".to_string(),
        };
        assert_eq!(err.to_string(), "line 7: non-numeric `ell`");
    }

    #[test]
    fn eval_error_reports_offending_value() {
        let err = EvalError::OutOfDomain {
            variable: "mass_gev",
            value: -5.0,
        };
        assert!(err.to_string().contains("mass_gev=-5"));
    }
}
