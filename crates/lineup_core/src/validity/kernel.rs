//! Structural and conservation validators.

use super::conservation::DominatorScenario;
use super::error::ValidityError;
use super::result::{ValidationResult, VetoReason};
use super::tracker::RejectionTracker;
use crate::types::VetoRule;
use std::collections::{BTreeSet, HashSet};

/// Default number of entities in a lineup.
pub const DEFAULT_LINEUP_SIZE: usize = 6;

/// Validity kernel for candidate states.
///
/// Structural checks (`validate_*`, `is_impossible_state`) are pure.
/// Conservation and veto-rule checks are counted in a caller-owned
/// [`RejectionTracker`].
///
/// # Examples
///
/// ```
/// use lineup_core::validity::{DominatorScenario, RejectionTracker, ValidityKernel};
///
/// let kernel = ValidityKernel::new(40).unwrap();
/// assert!(kernel.validate_position(1));
/// assert!(!kernel.validate_position(41));
/// assert!(kernel.is_impossible_state(&[1, 2, 2, 4, 5, 6], None, None));
///
/// let mut tracker = RejectionTracker::new();
/// let scenario = DominatorScenario::new(vec![150, 60], vec![20, 10], 200, 180);
/// let result = kernel.validate_dominator_conservation(&scenario, &mut tracker);
/// assert!(!result.is_valid);
/// assert_eq!(tracker.total_rejected(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidityKernel {
    field_size: usize,
    required_size: usize,
}

impl ValidityKernel {
    /// Create a kernel for a field of `field_size` positions with the
    /// default roster size.
    ///
    /// # Errors
    ///
    /// `ValidityError::InvalidFieldSize` if `field_size` is zero.
    pub fn new(field_size: usize) -> Result<Self, ValidityError> {
        if field_size == 0 {
            return Err(ValidityError::InvalidFieldSize(field_size));
        }
        Ok(Self {
            field_size,
            required_size: DEFAULT_LINEUP_SIZE,
        })
    }

    /// Set the roster size used by [`is_impossible_state`](Self::is_impossible_state).
    pub fn with_required_size(mut self, required_size: usize) -> Result<Self, ValidityError> {
        if required_size == 0 {
            return Err(ValidityError::InvalidRequiredSize {
                required: required_size,
                field_size: self.field_size,
            });
        }
        self.required_size = required_size;
        Ok(self)
    }

    /// Number of positions in the field.
    pub fn field_size(&self) -> usize {
        self.field_size
    }

    /// Roster size expected by `is_impossible_state`.
    pub fn required_size(&self) -> usize {
        self.required_size
    }

    /// Change the field size, re-validating the bound.
    pub fn set_field_size(&mut self, field_size: usize) -> Result<(), ValidityError> {
        if field_size == 0 {
            return Err(ValidityError::InvalidFieldSize(field_size));
        }
        self.field_size = field_size;
        Ok(())
    }

    /// True iff `1 <= position <= field_size`.
    #[inline]
    pub fn validate_position(&self, position: i64) -> bool {
        position >= 1 && (position as u64) <= self.field_size as u64
    }

    /// True iff every position is within the field.
    pub fn validate_lineup_positions(&self, positions: &[i64]) -> bool {
        positions.iter().all(|&p| self.validate_position(p))
    }

    /// True iff no position appears twice.
    pub fn validate_unique_positions(&self, positions: &[i64]) -> bool {
        let mut seen = HashSet::with_capacity(positions.len());
        positions.iter().all(|p| seen.insert(*p))
    }

    /// True iff `n == required`.
    #[inline]
    pub fn validate_lineup_size(&self, n: usize, required: usize) -> bool {
        n == required
    }

    /// True if any structural check fails, or if `costs` and `budget_cap`
    /// are both supplied and the costs sum above the cap.
    pub fn is_impossible_state(
        &self,
        positions: &[i64],
        costs: Option<&[f64]>,
        budget_cap: Option<f64>,
    ) -> bool {
        if !self.validate_lineup_size(positions.len(), self.required_size)
            || !self.validate_lineup_positions(positions)
            || !self.validate_unique_positions(positions)
        {
            return true;
        }
        match (costs, budget_cap) {
            (Some(costs), Some(cap)) => costs.iter().sum::<f64>() > cap,
            _ => false,
        }
    }

    /// Check that per-entity dominator counts respect the race totals.
    ///
    /// Every call is recorded in `tracker`.
    pub fn validate_dominator_conservation(
        &self,
        scenario: &DominatorScenario,
        tracker: &mut RejectionTracker,
    ) -> ValidationResult {
        let race_length = u64::from(scenario.race_length);
        let green_flag_laps = u64::from(scenario.green_flag_laps);
        let mut reasons = Vec::new();

        let leading = scenario.total_leading();
        if leading > race_length {
            reasons.push(VetoReason::LeadingExceedsRaceLength {
                total: leading,
                race_length,
            });
        }
        let fastest = scenario.total_fastest();
        if fastest > green_flag_laps {
            reasons.push(VetoReason::FastestExceedsGreenFlag {
                total: fastest,
                green_flag_laps,
            });
        }

        let result = ValidationResult::from_reasons(reasons);
        tracker.record(&result);
        result
    }

    /// Keep only the scenarios that pass conservation, counting each one.
    pub fn retain_conserving(
        &self,
        scenarios: Vec<DominatorScenario>,
        tracker: &mut RejectionTracker,
    ) -> Vec<DominatorScenario> {
        scenarios
            .into_iter()
            .filter(|s| self.validate_dominator_conservation(s, tracker).is_valid)
            .collect()
    }

    /// Check a veto rule against the known node set.
    ///
    /// Every call is recorded in `tracker`.
    pub fn validate_veto_rule(
        &self,
        rule: &VetoRule,
        known_nodes: &BTreeSet<String>,
        tracker: &mut RejectionTracker,
    ) -> ValidationResult {
        let mut reasons = Vec::new();
        if rule.is_self_loop() {
            reasons.push(VetoReason::SelfLoop {
                node: rule.source.clone(),
            });
        }
        for node in [&rule.source, &rule.target] {
            if !known_nodes.contains(node) {
                reasons.push(VetoReason::UnknownNode { node: node.clone() });
            }
        }
        if rule.reason.trim().is_empty() {
            reasons.push(VetoReason::MissingReason);
        }

        let result = ValidationResult::from_reasons(reasons);
        tracker.record(&result);
        result
    }
}
