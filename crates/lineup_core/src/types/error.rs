//! Shape errors for scenario storage.

use thiserror::Error;

/// Errors raised when outcome data does not have the declared dimensions.
///
/// # Examples
///
/// ```
/// use lineup_core::types::ShapeError;
///
/// let err = ShapeError::DataLength { expected: 12, actual: 10 };
/// assert_eq!(
///     format!("{}", err),
///     "Data length mismatch: expected 12 values, got 10"
/// );
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// Matrix has zero scenarios or zero candidates.
    #[error("Empty matrix: {n_scenarios} scenarios x {n_candidates} candidates")]
    Empty {
        /// Number of scenario rows
        n_scenarios: usize,
        /// Number of candidate columns
        n_candidates: usize,
    },

    /// Flat data length does not equal rows × columns.
    #[error("Data length mismatch: expected {expected} values, got {actual}")]
    DataLength {
        /// Expected number of values
        expected: usize,
        /// Number of values supplied
        actual: usize,
    },

    /// A row has a different width from the first row.
    #[error("Ragged row {row}: expected {expected} columns, got {actual}")]
    RaggedRow {
        /// Offending row index
        row: usize,
        /// Width of the first row
        expected: usize,
        /// Width of the offending row
        actual: usize,
    },

    /// A column or row index outside the matrix was requested.
    #[error("Index {index} out of range for dimension of size {size}")]
    OutOfRange {
        /// Requested index
        index: usize,
        /// Size of the dimension
        size: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ragged_row_display() {
        let err = ShapeError::RaggedRow {
            row: 3,
            expected: 5,
            actual: 4,
        };
        assert_eq!(
            format!("{}", err),
            "Ragged row 3: expected 5 columns, got 4"
        );
    }

    #[test]
    fn test_error_trait_implementation() {
        let err = ShapeError::OutOfRange { index: 9, size: 2 };
        let _: &dyn std::error::Error = &err;
        assert!(err.to_string().contains("out of range"));
    }
}
