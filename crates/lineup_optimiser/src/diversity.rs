//! Overlap penalties and portfolio similarity.

use lineup_core::{Candidate, EntityId, Lineup};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::hash::Hash;

/// Jaccard similarity `|a ∩ b| / |a ∪ b|`, zero when both are empty.
///
/// Duplicates within either slice are ignored.
///
/// # Examples
///
/// ```
/// use lineup_optimiser::diversity::jaccard;
///
/// let s = jaccard(&[0, 1, 2, 3, 4, 5], &[0, 1, 2, 6, 7, 8]);
/// assert!((s - 3.0 / 9.0).abs() < 1e-12);
/// assert_eq!(jaccard::<u8>(&[], &[]), 0.0);
/// ```
pub fn jaccard<T: Eq + Hash>(a: &[T], b: &[T]) -> f64 {
    let a: HashSet<&T> = a.iter().collect();
    let b: HashSet<&T> = b.iter().collect();
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

/// Jaccard similarity of two lineups' entity sets.
pub fn lineup_similarity(a: &Lineup, b: &Lineup) -> f64 {
    jaccard(a.entity_ids(), b.entity_ids())
}

/// Overlap of `selected` with every previous lineup, scaled by `weight`.
///
/// Each previous lineup contributes the number of selected entities it also
/// contains.
pub fn correlation_penalty(selected: &[EntityId], previous: &[Lineup], weight: f64) -> f64 {
    let selected: HashSet<&EntityId> = selected.iter().collect();
    let overlap: usize = previous
        .iter()
        .map(|lineup| lineup.entity_set().iter().filter(|id| selected.contains(*id)).count())
        .sum();
    weight * overlap as f64
}

/// Per-candidate objective adjustment equivalent to [`correlation_penalty`].
///
/// Summing the coefficients of a selection reproduces its penalty, so the
/// penalty can be subtracted from a linear objective.
pub fn penalty_coefficients(candidates: &[Candidate], previous: &[Lineup], weight: f64) -> Vec<f64> {
    candidates
        .iter()
        .map(|c| {
            let appearances = previous.iter().filter(|l| l.contains(&c.id)).count();
            weight * appearances as f64
        })
        .collect()
}

/// Pairwise similarity summary of a portfolio.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DiversityReport {
    /// Number of lineups compared
    pub n_lineups: usize,
    /// Mean pairwise Jaccard similarity
    pub mean_similarity: f64,
    /// Smallest pairwise similarity
    pub min_similarity: f64,
    /// Largest pairwise similarity
    pub max_similarity: f64,
    /// Indices of the most similar pair (first on ties)
    pub most_similar: Option<(usize, usize)>,
    /// Indices of the least similar pair (first on ties)
    pub least_similar: Option<(usize, usize)>,
}

/// Average, minimum and maximum pairwise similarity.
///
/// Fewer than two lineups yields an all-zero report with no pairs.
pub fn portfolio_correlation(lineups: &[Lineup]) -> DiversityReport {
    let n = lineups.len();
    let mut report = DiversityReport {
        n_lineups: n,
        ..DiversityReport::default()
    };
    if n < 2 {
        return report;
    }

    let mut sum = 0.0;
    let mut pairs = 0usize;
    let mut max = f64::NEG_INFINITY;
    let mut min = f64::INFINITY;
    for i in 0..n {
        for j in (i + 1)..n {
            let s = lineup_similarity(&lineups[i], &lineups[j]);
            sum += s;
            pairs += 1;
            if s > max {
                max = s;
                report.most_similar = Some((i, j));
            }
            if s < min {
                min = s;
                report.least_similar = Some((i, j));
            }
        }
    }
    report.mean_similarity = sum / pairs as f64;
    report.min_similarity = min;
    report.max_similarity = max;
    report
}

/// Full symmetric similarity matrix with unit diagonal.
pub fn similarity_matrix(lineups: &[Lineup]) -> Vec<Vec<f64>> {
    (0..lineups.len())
        .into_par_iter()
        .map(|i| {
            lineups
                .iter()
                .enumerate()
                .map(|(j, other)| {
                    if i == j {
                        1.0
                    } else {
                        lineup_similarity(&lineups[i], other)
                    }
                })
                .collect()
        })
        .collect()
}

/// Greedily pick `k` mutually dissimilar lineups.
///
/// Starts from a lineup drawn with `seed`, then repeatedly adds the candidate
/// with the lowest mean similarity to those already picked (lowest index on
/// ties). Returns indices in pick order; `k >= lineups.len()` returns every
/// index.
pub fn greedy_diverse_subset(lineups: &[Lineup], k: usize, seed: u64) -> Vec<usize> {
    let n = lineups.len();
    if k >= n {
        return (0..n).collect();
    }
    if k == 0 {
        return Vec::new();
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let first = rng.gen_range(0..n);
    let mut picked = vec![first];
    let mut remaining: Vec<usize> = (0..n).filter(|&i| i != first).collect();
    // Running similarity sum to the picked set.
    let mut total: Vec<f64> = (0..n)
        .map(|i| lineup_similarity(&lineups[i], &lineups[first]))
        .collect();

    while picked.len() < k && !remaining.is_empty() {
        let mut best_pos = 0;
        for pos in 1..remaining.len() {
            if total[remaining[pos]] < total[remaining[best_pos]] {
                best_pos = pos;
            }
        }
        let chosen = remaining.remove(best_pos);
        picked.push(chosen);
        for &i in &remaining {
            total[i] += lineup_similarity(&lineups[i], &lineups[chosen]);
        }
    }
    picked
}
