//! Adaptive minimum scenario counts for tail estimation.

use super::error::TailRiskError;
use super::tail::validate_alpha;
use tracing::warn;

/// Default number of scenarios the tail should contain.
pub const DEFAULT_MIN_TAIL_SAMPLES: usize = 100;

/// Relative slack absorbed before rounding up, so that
/// `100 / (1 - 0.9)` evaluates to 1000 rather than 1001.
const CEIL_TOLERANCE: f64 = 1e-9;

/// Floor on the scenario count for a given tail quantile.
///
/// | α        | floor  |
/// |----------|--------|
/// | ≥ 0.99   | 10,000 |
/// | ≥ 0.95   | 2,000  |
/// | ≥ 0.90   | 1,000  |
/// | otherwise| 500    |
pub fn tier_floor(alpha: f64) -> usize {
    if alpha >= 0.99 {
        10_000
    } else if alpha >= 0.95 {
        2_000
    } else if alpha >= 0.90 {
        1_000
    } else {
        500
    }
}

/// Minimum number of scenarios needed for a tail of `min_tail_samples`.
///
/// Returns `max(ceil(min_tail_samples / (1 - α)), tier_floor(α))`.
///
/// # Errors
///
/// - `TailRiskError::InvalidAlpha` if α is outside [0, 1]
/// - `TailRiskError::UnboundedTail` if α = 1
/// - `TailRiskError::InvalidInput` if `min_tail_samples` is zero
///
/// # Examples
///
/// ```
/// use lineup_core::risk::{adaptive_scenario_count, DEFAULT_MIN_TAIL_SAMPLES};
///
/// let n90 = adaptive_scenario_count(0.90, DEFAULT_MIN_TAIL_SAMPLES).unwrap();
/// let n95 = adaptive_scenario_count(0.95, DEFAULT_MIN_TAIL_SAMPLES).unwrap();
/// let n99 = adaptive_scenario_count(0.99, DEFAULT_MIN_TAIL_SAMPLES).unwrap();
///
/// assert!(n90 < n95 && n95 < n99);
/// assert!(n99 >= 10_000);
/// ```
pub fn adaptive_scenario_count(alpha: f64, min_tail_samples: usize) -> Result<usize, TailRiskError> {
    validate_alpha(alpha)?;
    if alpha >= 1.0 {
        return Err(TailRiskError::UnboundedTail { alpha });
    }
    if min_tail_samples == 0 {
        return Err(TailRiskError::invalid_input(
            "min_tail_samples must be greater than 0",
        ));
    }

    let raw = min_tail_samples as f64 / (1.0 - alpha);
    let needed = (raw * (1.0 - CEIL_TOLERANCE)).ceil() as usize;
    Ok(needed.max(tier_floor(alpha)))
}

/// Outcome of comparing a supplied scenario count against the advisor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScenarioCountAdvice {
    /// Scenario count the caller supplied
    pub supplied: usize,
    /// Scenario count the advisor recommends
    pub recommended: usize,
}

impl ScenarioCountAdvice {
    /// True when the supplied count meets the recommendation.
    pub fn is_sufficient(&self) -> bool {
        self.supplied >= self.recommended
    }

    /// Shortfall against the recommendation (zero when sufficient).
    pub fn shortfall(&self) -> usize {
        self.recommended.saturating_sub(self.supplied)
    }
}

/// Compare a scenario count with [`adaptive_scenario_count`] using
/// [`DEFAULT_MIN_TAIL_SAMPLES`], warning when it falls short.
pub fn check_scenario_count(supplied: usize, alpha: f64) -> Result<ScenarioCountAdvice, TailRiskError> {
    let recommended = adaptive_scenario_count(alpha, DEFAULT_MIN_TAIL_SAMPLES)?;
    let advice = ScenarioCountAdvice {
        supplied,
        recommended,
    };
    if !advice.is_sufficient() {
        warn!(
            supplied,
            recommended,
            alpha,
            "scenario count below adaptive minimum; tail estimates may be noisy"
        );
    }
    Ok(advice)
}
