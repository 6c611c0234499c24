//! Bootstrap stability check for tail estimates.
//!
//! Resamples the outcome vector with replacement, recomputes CVaR and a
//! caller-supplied ranking on every replicate, and reports how much the
//! estimate moves.
//!
//! Replicates run in parallel with Rayon. Each replicate seeds its own
//! `StdRng` from `seed + replicate_index`, so the report is identical for a
//! given seed regardless of thread scheduling.

use super::error::TailRiskError;
use super::tail::{tail_metrics, validate_alpha};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Minimum number of bootstrap replicates.
pub const MIN_BOOTSTRAP_REPLICATES: usize = 2;

/// CVaR coefficient of variation must stay below this to be stable.
pub const STABLE_CV: f64 = 0.2;

/// Ranking agreement must exceed this to be stable.
pub const STABLE_AGREEMENT: f64 = 0.7;

/// Result of [`validate_tail_stability`].
#[derive(Clone, Debug, PartialEq)]
pub struct StabilityReport {
    /// Number of replicates drawn
    pub n_bootstrap: usize,
    /// Mean CVaR across replicates
    pub cvar_mean: f64,
    /// Population standard deviation of CVaR across replicates
    pub cvar_std: f64,
    /// `cvar_std / |cvar_mean|`
    pub cvar_cv: f64,
    /// Fraction of replicates whose top-ranked key matches the full sample
    pub ranking_agreement: f64,
    /// `cvar_cv < STABLE_CV && ranking_agreement > STABLE_AGREEMENT`
    pub is_stable: bool,
}

/// Bootstrap the outcome vector and report CVaR dispersion and ranking
/// agreement.
///
/// `ranking_fn` maps a (resampled) outcome vector to whatever key identifies
/// the top-ranked choice; agreement counts replicates whose key equals the
/// key computed on the full sample.
///
/// # Errors
///
/// - `TailRiskError::InsufficientReplicates` if `n_bootstrap < 2`
/// - `TailRiskError::EmptyInput` / `InvalidAlpha` as for `tail_metrics`
///
/// # Examples
///
/// ```
/// use lineup_core::risk::validate_tail_stability;
///
/// let outcomes: Vec<f64> = (0..2_000).map(|i| 100.0 + (i % 50) as f64).collect();
/// let report = validate_tail_stability(&outcomes, 0.9, 50, 7, |sample| {
///     sample.iter().any(|&v| v >= 140.0)
/// })
/// .unwrap();
///
/// assert_eq!(report.n_bootstrap, 50);
/// assert!(report.is_stable);
/// ```
pub fn validate_tail_stability<K, F>(
    outcomes: &[f64],
    alpha: f64,
    n_bootstrap: usize,
    seed: u64,
    ranking_fn: F,
) -> Result<StabilityReport, TailRiskError>
where
    K: PartialEq + Send + Sync,
    F: Fn(&[f64]) -> K + Sync,
{
    validate_alpha(alpha)?;
    if outcomes.is_empty() {
        return Err(TailRiskError::EmptyInput);
    }
    if n_bootstrap < MIN_BOOTSTRAP_REPLICATES {
        return Err(TailRiskError::InsufficientReplicates {
            required: MIN_BOOTSTRAP_REPLICATES,
            provided: n_bootstrap,
        });
    }

    let n = outcomes.len();
    let baseline = ranking_fn(outcomes);

    let replicates: Vec<(f64, bool)> = (0..n_bootstrap)
        .into_par_iter()
        .map(|b| -> Result<(f64, bool), TailRiskError> {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(b as u64));
            let sample: Vec<f64> = (0..n).map(|_| outcomes[rng.gen_range(0..n)]).collect();
            let cvar = tail_metrics(&sample, alpha)?.cvar;
            Ok((cvar, ranking_fn(&sample) == baseline))
        })
        .collect::<Result<_, TailRiskError>>()?;

    let count = replicates.len() as f64;
    let cvar_mean = replicates.iter().map(|(c, _)| c).sum::<f64>() / count;
    let variance = replicates
        .iter()
        .map(|(c, _)| (c - cvar_mean).powi(2))
        .sum::<f64>()
        / count;
    let cvar_std = variance.sqrt();
    let cvar_cv = coefficient_of_variation(cvar_mean, cvar_std);
    let agreeing = replicates.iter().filter(|(_, agrees)| *agrees).count();
    let ranking_agreement = agreeing as f64 / count;

    Ok(StabilityReport {
        n_bootstrap,
        cvar_mean,
        cvar_std,
        cvar_cv,
        ranking_agreement,
        is_stable: cvar_cv < STABLE_CV && ranking_agreement > STABLE_AGREEMENT,
    })
}

fn coefficient_of_variation(mean: f64, std: f64) -> f64 {
    if std == 0.0 {
        0.0
    } else if mean == 0.0 {
        f64::INFINITY
    } else {
        std / mean.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_constant_sample_is_perfectly_stable() {
        let outcomes = vec![5.0; 200];
        let report = validate_tail_stability(&outcomes, 0.95, 20, 1, |_| 0usize).unwrap();
        assert_relative_eq!(report.cvar_mean, 5.0);
        assert_eq!(report.cvar_std, 0.0);
        assert_eq!(report.cvar_cv, 0.0);
        assert_eq!(report.ranking_agreement, 1.0);
        assert!(report.is_stable);
    }

    #[test]
    fn test_same_seed_same_report() {
        let outcomes: Vec<f64> = (0..500).map(|i| ((i * 37) % 101) as f64).collect();
        let a = validate_tail_stability(&outcomes, 0.9, 30, 99, |s| s.len()).unwrap();
        let b = validate_tail_stability(&outcomes, 0.9, 30, 99, |s| s.len()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_disagreeing_ranking_is_unstable() {
        let outcomes: Vec<f64> = (0..200).map(f64::from).collect();
        // A resampled total almost never reproduces the original total.
        let report = validate_tail_stability(&outcomes, 0.9, 40, 3, |s| {
            s.iter().sum::<f64>() as i64
        })
        .unwrap();
        assert!(report.ranking_agreement < STABLE_AGREEMENT);
        assert!(!report.is_stable);
    }

    #[test]
    fn test_zero_mean_with_dispersion_is_infinite_cv() {
        assert_eq!(coefficient_of_variation(0.0, 1.0), f64::INFINITY);
        assert_relative_eq!(coefficient_of_variation(-2.0, 1.0), 0.5);
    }

    #[test]
    fn test_rejects_too_few_replicates() {
        let err = validate_tail_stability(&[1.0, 2.0], 0.5, 1, 0, |_| ()).unwrap_err();
        assert_eq!(
            err,
            TailRiskError::InsufficientReplicates {
                required: 2,
                provided: 1
            }
        );
    }

    #[test]
    fn test_rejects_empty_input() {
        let err = validate_tail_stability(&[], 0.5, 10, 0, |_| ()).unwrap_err();
        assert!(err.is_empty_input());
    }
}
