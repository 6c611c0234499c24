//! Solver budget.

use super::SolverError;
use std::time::Duration;

/// Wall-clock budget for [`MilpSolver`](super::MilpSolver).
///
/// Running out ends the solve with
/// [`SolveStatus::TimeLimit`](super::SolveStatus::TimeLimit).
///
/// # Example
///
/// ```
/// use lineup_optimiser::solver::SolverConfig;
/// use std::time::Duration;
///
/// let config = SolverConfig::default();
/// assert_eq!(config.time_limit, Duration::from_secs(10));
///
/// let custom = SolverConfig::new(Duration::from_millis(250)).unwrap();
/// assert_eq!(custom.time_limit, Duration::from_millis(250));
/// assert!(SolverConfig::new(Duration::ZERO).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    /// Wall-clock budget per solve.
    pub time_limit: Duration,
}

impl Default for SolverConfig {
    /// Default values:
    /// - `time_limit`: 10 s
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(10),
        }
    }
}

impl SolverConfig {
    /// Create a configuration with an explicit budget.
    ///
    /// # Errors
    ///
    /// `SolverError::InvalidConfig` if `time_limit` is zero.
    pub fn new(time_limit: Duration) -> Result<Self, SolverError> {
        if time_limit.is_zero() {
            return Err(SolverError::invalid_config("time_limit must be positive"));
        }
        Ok(Self { time_limit })
    }

    /// Tight budget for interactive use (1 s).
    pub fn fast() -> Self {
        Self {
            time_limit: Duration::from_secs(1),
        }
    }

    /// Set the time budget.
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SolverConfig::default();
        assert_eq!(config.time_limit, Duration::from_secs(10));
    }

    #[test]
    fn test_fast_is_tighter() {
        assert!(SolverConfig::fast().time_limit < SolverConfig::default().time_limit);
    }

    #[test]
    fn test_zero_time_limit_rejected() {
        let err = SolverConfig::new(Duration::ZERO).unwrap_err();
        assert!(err.is_invalid_config());
        assert!(err.to_string().contains("time_limit"));
    }

    #[test]
    fn test_positive_time_limit_accepted() {
        let config = SolverConfig::new(Duration::from_millis(1)).unwrap();
        assert_eq!(config.time_limit, Duration::from_millis(1));
    }
}
