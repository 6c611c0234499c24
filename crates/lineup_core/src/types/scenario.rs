//! Row-major scenario outcome storage.
//!
//! A `ScenarioMatrix` holds simulated outcomes with shape
//! `(n_scenarios, n_candidates)`. The matrix is produced by an external
//! simulator and is never mutated after construction.

use super::error::ShapeError;

/// Dense (scenario × candidate) matrix of simulated outcomes.
///
/// Stored as a single flat `Vec<f64>` in row-major order so that a scenario
/// row is a contiguous slice.
///
/// # Examples
///
/// ```
/// use lineup_core::types::ScenarioMatrix;
///
/// let matrix = ScenarioMatrix::from_rows(vec![
///     vec![1.0, 2.0, 3.0],
///     vec![4.0, 5.0, 6.0],
/// ]).unwrap();
///
/// assert_eq!(matrix.n_scenarios(), 2);
/// assert_eq!(matrix.n_candidates(), 3);
/// assert_eq!(matrix.column(1).unwrap(), vec![2.0, 5.0]);
/// assert_eq!(matrix.lineup_outcomes(&[0, 2]).unwrap(), vec![4.0, 10.0]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioMatrix {
    n_scenarios: usize,
    n_candidates: usize,
    data: Vec<f64>,
}

impl ScenarioMatrix {
    /// Create a matrix from flat row-major data.
    ///
    /// # Errors
    ///
    /// - `ShapeError::Empty` if either dimension is zero
    /// - `ShapeError::DataLength` if `data.len() != n_scenarios * n_candidates`
    pub fn new(n_scenarios: usize, n_candidates: usize, data: Vec<f64>) -> Result<Self, ShapeError> {
        if n_scenarios == 0 || n_candidates == 0 {
            return Err(ShapeError::Empty {
                n_scenarios,
                n_candidates,
            });
        }
        let expected = n_scenarios * n_candidates;
        if data.len() != expected {
            return Err(ShapeError::DataLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            n_scenarios,
            n_candidates,
            data,
        })
    }

    /// Create a matrix from one `Vec` per scenario.
    ///
    /// # Errors
    ///
    /// - `ShapeError::Empty` if there are no rows or the first row is empty
    /// - `ShapeError::RaggedRow` if any row differs in width from the first
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, ShapeError> {
        let n_scenarios = rows.len();
        let n_candidates = rows.first().map_or(0, Vec::len);
        if n_scenarios == 0 || n_candidates == 0 {
            return Err(ShapeError::Empty {
                n_scenarios,
                n_candidates,
            });
        }

        let mut data = Vec::with_capacity(n_scenarios * n_candidates);
        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() != n_candidates {
                return Err(ShapeError::RaggedRow {
                    row: row_idx,
                    expected: n_candidates,
                    actual: row.len(),
                });
            }
            data.extend(row);
        }

        Self::new(n_scenarios, n_candidates, data)
    }

    /// Number of scenarios (rows).
    #[inline]
    pub fn n_scenarios(&self) -> usize {
        self.n_scenarios
    }

    /// Number of candidates (columns).
    #[inline]
    pub fn n_candidates(&self) -> usize {
        self.n_candidates
    }

    /// `(n_scenarios, n_candidates)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_scenarios, self.n_candidates)
    }

    /// Outcome for a scenario/candidate pair, or `None` when out of range.
    #[inline]
    pub fn get(&self, scenario: usize, candidate: usize) -> Option<f64> {
        if scenario >= self.n_scenarios || candidate >= self.n_candidates {
            return None;
        }
        Some(self.data[scenario * self.n_candidates + candidate])
    }

    /// Contiguous slice for one scenario.
    pub fn row(&self, scenario: usize) -> Result<&[f64], ShapeError> {
        if scenario >= self.n_scenarios {
            return Err(ShapeError::OutOfRange {
                index: scenario,
                size: self.n_scenarios,
            });
        }
        let start = scenario * self.n_candidates;
        Ok(&self.data[start..start + self.n_candidates])
    }

    /// Copy of one candidate's outcomes across all scenarios.
    pub fn column(&self, candidate: usize) -> Result<Vec<f64>, ShapeError> {
        if candidate >= self.n_candidates {
            return Err(ShapeError::OutOfRange {
                index: candidate,
                size: self.n_candidates,
            });
        }
        Ok(self
            .data
            .chunks_exact(self.n_candidates)
            .map(|row| row[candidate])
            .collect())
    }

    /// Per-scenario sum of the outcomes of the given candidate columns.
    pub fn lineup_outcomes(&self, candidates: &[usize]) -> Result<Vec<f64>, ShapeError> {
        if let Some(&bad) = candidates.iter().find(|&&c| c >= self.n_candidates) {
            return Err(ShapeError::OutOfRange {
                index: bad,
                size: self.n_candidates,
            });
        }
        Ok(self
            .data
            .chunks_exact(self.n_candidates)
            .map(|row| candidates.iter().map(|&c| row[c]).sum())
            .collect())
    }

    /// Flat row-major view of the data.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}
