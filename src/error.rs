//! Error types.
//!
//! - `EngineError`: failures of the distribution engine (curves, ratios, builder).
//! - `AppError`: process-level error carrying the exit code reported by `hyeto`.
//!
//! Exit codes: 2 = bad input/configuration, 3 = bad external data,
//! 4 = internal invariant failure.

use thiserror::Error;

/// Errors raised by the distribution engine.
///
/// All variants are recoverable by the caller except `MassConservation` and
/// `UnknownDistribution`, which indicate a defect in reference data or code.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("malformed reference data for {curve}: {reason}")]
    MalformedReferenceData { curve: String, reason: String },

    #[error("no reference curve is tabulated for distribution '{0}'")]
    UnknownDistribution(String),

    #[error("return periods differ: short-duration depth is {short}-yr, long-duration depth is {long}-yr")]
    MismatchedReturnPeriod { short: u32, long: u32 },

    #[error("long-duration depth is {0}; the intensity ratio is undefined")]
    DivisionByZero(f64),

    #[error("storm window sums to {actual:.9} but the total depth is {expected:.9}")]
    MassConservation { expected: f64, actual: f64 },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl EngineError {
    pub(crate) fn malformed(curve: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::MalformedReferenceData {
            curve: curve.into(),
            reason: reason.into(),
        }
    }

    /// Exit code used when this error terminates the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            EngineError::MalformedReferenceData { .. } | EngineError::InvalidParameter(_) => 2,
            EngineError::MismatchedReturnPeriod { .. } | EngineError::DivisionByZero(_) => 3,
            EngineError::UnknownDistribution(_) | EngineError::MassConservation { .. } => 4,
        }
    }
}

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

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
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
