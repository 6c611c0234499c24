//! Solver error types.

use thiserror::Error;

/// Errors raised while building or solving a model.
///
/// Infeasibility and budget exhaustion are not errors; they are reported
/// through [`SolveStatus`](super::SolveStatus).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Model references unknown variables or carries non-finite data.
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    /// Solver budget is unusable.
    #[error("Invalid solver config: {0}")]
    InvalidConfig(String),

    /// The integer programming backend failed.
    #[error("Solver backend failed: {0}")]
    Backend(String),
}

impl SolverError {
    /// Create an invalid model error.
    pub fn invalid_model(message: impl Into<String>) -> Self {
        Self::InvalidModel(message.into())
    }

    /// Create an invalid config error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Create a backend failure.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    /// Check if this is a model construction error.
    pub fn is_invalid_model(&self) -> bool {
        matches!(self, Self::InvalidModel(_))
    }

    /// Check if this is a budget error.
    pub fn is_invalid_config(&self) -> bool {
        matches!(self, Self::InvalidConfig(_))
    }
}
