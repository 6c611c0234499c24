//! Tail-risk error types.

use thiserror::Error;

/// Errors raised by tail-risk estimation.
///
/// Invalid parameters are reported immediately and never coerced into range.
///
/// # Examples
///
/// ```
/// use lineup_core::risk::TailRiskError;
///
/// let err = TailRiskError::invalid_alpha(1.5);
/// assert_eq!(format!("{}", err), "Invalid alpha: 1.5 (must be in [0, 1])");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TailRiskError {
    /// Outcome vector has no elements.
    #[error("Empty outcome vector")]
    EmptyInput,

    /// Tail quantile outside [0, 1] or not finite.
    #[error("Invalid alpha: {alpha} (must be in [0, 1])")]
    InvalidAlpha {
        /// The rejected alpha
        alpha: f64,
    },

    /// At α = 1 the tail fraction is zero, so no finite scenario count
    /// can guarantee the requested number of tail samples.
    #[error("Unbounded scenario count at alpha {alpha}: tail fraction is zero")]
    UnboundedTail {
        /// The rejected alpha
        alpha: f64,
    },

    /// Too few bootstrap replicates requested.
    #[error("Insufficient bootstrap replicates: need at least {required}, got {provided}")]
    InsufficientReplicates {
        /// Minimum number of replicates
        required: usize,
        /// Number requested
        provided: usize,
    },

    /// General invalid input error.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl TailRiskError {
    /// Create an invalid alpha error.
    pub fn invalid_alpha(alpha: f64) -> Self {
        Self::InvalidAlpha { alpha }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Check if this is an invalid alpha error.
    pub fn is_invalid_alpha(&self) -> bool {
        matches!(self, Self::InvalidAlpha { .. })
    }

    /// Check if this is an empty input error.
    pub fn is_empty_input(&self) -> bool {
        matches!(self, Self::EmptyInput)
    }
}
