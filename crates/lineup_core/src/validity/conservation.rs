//! Conservation inputs for simulated races.

use serde::{Deserialize, Serialize};

/// Per-entity dominator statistics from one simulated race, with the
/// declared race totals they must respect.
///
/// Laps led can never sum to more than the race length, and fastest laps
/// can never sum to more than the green-flag laps actually run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DominatorScenario {
    /// Laps led, per entity
    pub leading_counts: Vec<u32>,
    /// Fastest laps, per entity
    pub fastest_counts: Vec<u32>,
    /// Scheduled race length in laps
    pub race_length: u32,
    /// Laps run under green flag
    pub green_flag_laps: u32,
}

impl DominatorScenario {
    /// Create a scenario from per-entity counts and declared totals.
    pub fn new(
        leading_counts: Vec<u32>,
        fastest_counts: Vec<u32>,
        race_length: u32,
        green_flag_laps: u32,
    ) -> Self {
        Self {
            leading_counts,
            fastest_counts,
            race_length,
            green_flag_laps,
        }
    }

    /// Sum of laps led across entities.
    pub fn total_leading(&self) -> u64 {
        self.leading_counts.iter().map(|&c| u64::from(c)).sum()
    }

    /// Sum of fastest laps across entities.
    pub fn total_fastest(&self) -> u64 {
        self.fastest_counts.iter().map(|&c| u64::from(c)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_do_not_overflow() {
        let s = DominatorScenario::new(vec![u32::MAX, u32::MAX], vec![1, 2, 3], 10, 5);
        assert_eq!(s.total_leading(), 2 * u64::from(u32::MAX));
        assert_eq!(s.total_fastest(), 6);
    }
}
