//! Validity kernel configuration errors.

use thiserror::Error;

/// Errors raised when configuring a [`ValidityKernel`](super::ValidityKernel).
///
/// Validation *failures* are not errors: they are returned as
/// [`ValidationResult`](super::ValidationResult)s and counted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidityError {
    /// Field size must be positive.
    #[error("Invalid field size: {0} (must be > 0)")]
    InvalidFieldSize(usize),

    /// Required lineup size must be positive and fit in the field.
    #[error("Invalid required size {required} for field of {field_size}")]
    InvalidRequiredSize {
        /// Requested roster size
        required: usize,
        /// Current field size
        field_size: usize,
    },
}
