//! Portfolio generation errors.

use crate::config::ConfigError;
use lineup_core::{ShapeError, TailRiskError};
use lineup_optimiser::{ComplianceError, SolverError};
use thiserror::Error;

/// Errors raised by the portfolio layer.
///
/// Only structurally invalid inputs are errors. A portfolio smaller than
/// requested is reported through [`PortfolioStatus`](crate::PortfolioStatus).
///
/// # Examples
///
/// ```
/// use lineup_portfolio::PortfolioError;
///
/// let err = PortfolioError::invalid_input("no candidates");
/// assert_eq!(format!("{}", err), "Invalid input: no candidates");
/// assert!(err.is_invalid_input());
/// ```
#[derive(Error, Debug)]
pub enum PortfolioError {
    /// Candidate pool or parameters are unusable.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Scenario matrix columns do not match the candidate pool.
    #[error("Scenario matrix has {columns} columns for {candidates} candidates")]
    ShapeMismatch {
        /// Columns in the matrix
        columns: usize,
        /// Candidates in the pool
        candidates: usize,
    },

    /// Scenario storage error.
    #[error("Scenario shape error: {0}")]
    Shape(#[from] ShapeError),

    /// Scenario supplier failed.
    #[error("Scenario supplier failed for '{race_id}' ({n_scenarios} scenarios): {message}")]
    ScenarioSupplier {
        /// Cache key
        race_id: String,
        /// Requested scenario count
        n_scenarios: usize,
        /// Supplier error message
        message: String,
    },

    /// Tail metric computation failed.
    #[error("Tail risk error: {0}")]
    TailRisk(#[from] TailRiskError),

    /// Compliance rules could not be built or applied.
    #[error("Compliance error: {0}")]
    Compliance(#[from] ComplianceError),

    /// Model construction failed.
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Lineups cannot be exported.
    #[error("Export error: {0}")]
    Export(String),

    /// CSV writer failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO failure while writing an export.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PortfolioError {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an export error.
    pub fn export(message: impl Into<String>) -> Self {
        Self::Export(message.into())
    }

    /// Check if this is an invalid input error.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Check if this is an export error.
    pub fn is_export(&self) -> bool {
        matches!(self, Self::Export(_))
    }
}
