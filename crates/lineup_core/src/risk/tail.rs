//! Upper-tail metrics over a one-dimensional outcome vector.

use super::error::TailRiskError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::warn;

/// Tail estimates below this many samples are flagged unstable.
pub const MIN_STABLE_TAIL_SAMPLES: usize = 10;

/// Upper-tail summary of an outcome distribution.
///
/// For α ∈ (0, 1) the metrics always satisfy
/// `min ≤ var ≤ cvar ≤ top_x_pct ≤ max` over finite inputs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TailMetrics {
    /// Smallest value retained in the tail
    pub var: f64,
    /// Mean of the tail
    pub cvar: f64,
    /// Largest value in the tail
    pub top_x_pct: f64,
    /// CVaR minus the mean of all outcomes
    pub conditional_upside: f64,
    /// Tail quantile the metrics were computed at
    pub alpha: f64,
    /// Number of scenarios in the tail
    pub tail_count: usize,
}

impl TailMetrics {
    /// True when the tail holds at least [`MIN_STABLE_TAIL_SAMPLES`] scenarios.
    pub fn is_stable(&self) -> bool {
        self.tail_count >= MIN_STABLE_TAIL_SAMPLES
    }

    fn nan(alpha: f64, tail_count: usize) -> Self {
        Self {
            var: f64::NAN,
            cvar: f64::NAN,
            top_x_pct: f64::NAN,
            conditional_upside: f64::NAN,
            alpha,
            tail_count,
        }
    }
}

/// Check that `alpha` is finite and within [0, 1].
pub fn validate_alpha(alpha: f64) -> Result<(), TailRiskError> {
    if !(0.0..=1.0).contains(&alpha) {
        return Err(TailRiskError::invalid_alpha(alpha));
    }
    Ok(())
}

/// Number of scenarios in the upper tail: `max(1, round((1 - α) · n))`,
/// capped at `n`.
///
/// # Examples
///
/// ```
/// use lineup_core::risk::tail_size;
///
/// assert_eq!(tail_size(100, 0.99), 1);
/// assert_eq!(tail_size(1000, 0.95), 50);
/// assert_eq!(tail_size(10, 1.0), 1);
/// ```
#[inline]
pub fn tail_size(n: usize, alpha: f64) -> usize {
    let k = ((1.0 - alpha) * n as f64).round().max(1.0) as usize;
    k.min(n)
}

/// Compute VaR, CVaR, top-X% and conditional upside in the upper tail.
///
/// # Edge Cases
///
/// - α = 1: all three tail values equal `max(outcomes)`
/// - α = 0: all three tail values equal `min(outcomes)`
/// - any NaN in the input: every metric is NaN
///
/// # Errors
///
/// - `TailRiskError::EmptyInput` if `outcomes` is empty
/// - `TailRiskError::InvalidAlpha` if α is outside [0, 1]
///
/// # Examples
///
/// ```
/// use lineup_core::risk::tail_metrics;
///
/// let outcomes: Vec<f64> = (0..1000).map(f64::from).collect();
/// let m = tail_metrics(&outcomes, 0.95).unwrap();
///
/// assert_eq!(m.tail_count, 50);
/// assert_eq!(m.var, 950.0);
/// assert_eq!(m.top_x_pct, 999.0);
/// assert!((m.cvar - 974.5).abs() < 1e-9);
/// ```
pub fn tail_metrics(outcomes: &[f64], alpha: f64) -> Result<TailMetrics, TailRiskError> {
    validate_alpha(alpha)?;
    if outcomes.is_empty() {
        return Err(TailRiskError::EmptyInput);
    }

    let n = outcomes.len();
    let k = if alpha == 0.0 { n } else { tail_size(n, alpha) };

    if outcomes.iter().any(|v| v.is_nan()) {
        return Ok(TailMetrics::nan(alpha, k));
    }
    if k < MIN_STABLE_TAIL_SAMPLES {
        warn!(
            tail_count = k,
            n_scenarios = n,
            alpha,
            "tail estimate rests on fewer than {} scenarios",
            MIN_STABLE_TAIL_SAMPLES
        );
    }

    let mean = outcomes.iter().sum::<f64>() / n as f64;

    if alpha == 0.0 {
        let min = outcomes.iter().copied().fold(f64::INFINITY, f64::min);
        return Ok(TailMetrics {
            var: min,
            cvar: min,
            top_x_pct: min,
            conditional_upside: min - mean,
            alpha,
            tail_count: k,
        });
    }

    let mut scratch = outcomes.to_vec();
    let split = n - k;
    scratch.select_nth_unstable_by(split, f64::total_cmp);
    let tail = &scratch[split..];

    let var = tail[0];
    let top_x_pct = tail
        .iter()
        .copied()
        .max_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
        .unwrap_or(var);
    let mut cvar = tail.iter().sum::<f64>() / k as f64;
    // Summation rounding can push the mean a few ulps outside the tail range.
    if var.is_finite() && top_x_pct.is_finite() {
        cvar = cvar.clamp(var, top_x_pct);
    }

    Ok(TailMetrics {
        var,
        cvar,
        top_x_pct,
        conditional_upside: cvar - mean,
        alpha,
        tail_count: k,
    })
}

/// Conditional value-at-risk (mean of the upper tail).
///
/// # Examples
///
/// ```
/// use lineup_core::risk::cvar;
///
/// let outcomes: Vec<f64> = (0..100).map(f64::from).collect();
/// assert_eq!(cvar(&outcomes, 0.99).unwrap(), 99.0);
/// ```
pub fn cvar(outcomes: &[f64], alpha: f64) -> Result<f64, TailRiskError> {
    tail_metrics(outcomes, alpha).map(|m| m.cvar)
}

/// Value-at-risk (smallest value retained in the upper tail).
pub fn var(outcomes: &[f64], alpha: f64) -> Result<f64, TailRiskError> {
    tail_metrics(outcomes, alpha).map(|m| m.var)
}
