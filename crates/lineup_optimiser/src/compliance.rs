//! Roster, budget and stacking rules.
//!
//! The same rules exist twice: as rows injected into a [`Model`] before a
//! solve, and as a solver-independent check over a concrete lineup.

use crate::model::{Model, Sense, VarId};
use crate::solver::SolverError;
use lineup_core::{Candidate, EntityId, GroupId};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Relative tolerance when comparing a lineup cost with the cap.
const BUDGET_TOL: f64 = 1e-9;

/// Errors raised while configuring or applying compliance rules.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComplianceError {
    /// Rule parameters are inconsistent.
    #[error("Invalid compliance parameter: {0}")]
    InvalidParameter(String),

    /// Candidate and variable slices differ in length.
    #[error("Length mismatch: {candidates} candidates, {vars} variables")]
    LengthMismatch {
        /// Number of candidates
        candidates: usize,
        /// Number of selection variables
        vars: usize,
    },

    /// Wrapped model construction error.
    #[error("Model error: {0}")]
    Model(#[from] SolverError),
}

impl ComplianceError {
    /// Create an invalid parameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }
}

/// Result of [`ComplianceRules::validate_lineup`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LineupValidation {
    /// True when no rule is violated
    pub valid: bool,
    /// One message per violation
    pub errors: Vec<String>,
}

/// Group indicator variables created by [`ComplianceRules::apply`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StackVars {
    /// Indicator per stacked group
    pub indicators: BTreeMap<GroupId, VarId>,
}

/// Lineup construction rules.
///
/// - exactly `required_size` entities
/// - total cost at most `budget_cap`
/// - for every group with at least `min_stack` candidates, either no member
///   is picked or between `min_stack` and `max_stack` members are
///
/// # Examples
///
/// ```
/// use lineup_core::{Candidate, EntityId};
/// use lineup_optimiser::compliance::ComplianceRules;
///
/// let pool = vec![
///     Candidate::new("a", 10.0, "red"),
///     Candidate::new("b", 10.0, "red"),
///     Candidate::new("c", 10.0, "blue"),
/// ];
/// let rules = ComplianceRules::new(2, 25.0, 2, 2).unwrap();
///
/// let ok = rules.validate_lineup(&[EntityId::new("a"), EntityId::new("b")], &pool);
/// assert!(ok.valid);
///
/// let bad = rules.validate_lineup(&[EntityId::new("a"), EntityId::new("c")], &pool);
/// assert!(!bad.valid);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComplianceRules {
    required_size: usize,
    budget_cap: f64,
    min_stack: usize,
    max_stack: usize,
}

impl ComplianceRules {
    /// Create validated rules.
    ///
    /// # Errors
    ///
    /// `ComplianceError::InvalidParameter` for a zero roster, a negative or
    /// non-finite cap, a zero `min_stack`, or `min_stack > max_stack`.
    pub fn new(
        required_size: usize,
        budget_cap: f64,
        min_stack: usize,
        max_stack: usize,
    ) -> Result<Self, ComplianceError> {
        if required_size == 0 {
            return Err(ComplianceError::invalid_parameter(
                "required_size must be > 0",
            ));
        }
        if !budget_cap.is_finite() || budget_cap < 0.0 {
            return Err(ComplianceError::invalid_parameter(format!(
                "budget_cap must be finite and >= 0, got {}",
                budget_cap
            )));
        }
        if min_stack == 0 || min_stack > max_stack {
            return Err(ComplianceError::invalid_parameter(format!(
                "stack band must satisfy 1 <= min_stack <= max_stack, got {}..{}",
                min_stack, max_stack
            )));
        }
        Ok(Self {
            required_size,
            budget_cap,
            min_stack,
            max_stack,
        })
    }

    /// Entities per lineup.
    pub fn required_size(&self) -> usize {
        self.required_size
    }

    /// Cost cap per lineup.
    pub fn budget_cap(&self) -> f64 {
        self.budget_cap
    }

    /// Minimum picks from a used group.
    pub fn min_stack(&self) -> usize {
        self.min_stack
    }

    /// Maximum picks from any stacked group.
    pub fn max_stack(&self) -> usize {
        self.max_stack
    }

    /// Candidate indices per group, for groups large enough to stack.
    pub fn stacked_groups(&self, candidates: &[Candidate]) -> BTreeMap<GroupId, Vec<usize>> {
        let mut groups: BTreeMap<GroupId, Vec<usize>> = BTreeMap::new();
        for (i, c) in candidates.iter().enumerate() {
            groups.entry(c.group.clone()).or_default().push(i);
        }
        groups.retain(|_, members| members.len() >= self.min_stack);
        groups
    }

    /// Inject roster, budget and stacking rows into `model`.
    ///
    /// `vars[i]` is the selection variable of `candidates[i]`. One indicator
    /// variable is added per stacked group.
    pub fn apply(
        &self,
        model: &mut Model,
        candidates: &[Candidate],
        vars: &[VarId],
    ) -> Result<StackVars, ComplianceError> {
        if candidates.len() != vars.len() {
            return Err(ComplianceError::LengthMismatch {
                candidates: candidates.len(),
                vars: vars.len(),
            });
        }

        model.add_constraint(
            "roster_size",
            vars.iter().map(|&v| (v, 1.0)).collect(),
            Sense::Eq,
            self.required_size as f64,
        )?;
        model.add_constraint(
            "budget",
            vars.iter().zip(candidates).map(|(&v, c)| (v, c.cost)).collect(),
            Sense::Le,
            self.budget_cap,
        )?;

        let mut stack = StackVars::default();
        for (group, members) in self.stacked_groups(candidates) {
            let indicator = model.add_binary(format!("stack[{}]", group));
            for &i in &members {
                model.add_constraint(
                    format!("stack_link[{}:{}]", group, candidates[i].id),
                    vec![(vars[i], 1.0), (indicator, -1.0)],
                    Sense::Le,
                    0.0,
                )?;
            }
            model.add_constraint(
                format!("stack_max[{}]", group),
                members.iter().map(|&i| (vars[i], 1.0)).collect(),
                Sense::Le,
                self.max_stack as f64,
            )?;
            let mut band: Vec<(VarId, f64)> = members.iter().map(|&i| (vars[i], 1.0)).collect();
            band.push((indicator, -(self.min_stack as f64)));
            model.add_constraint(format!("stack_min[{}]", group), band, Sense::Ge, 0.0)?;

            stack.indicators.insert(group, indicator);
        }
        Ok(stack)
    }

    /// Re-check every rule against a concrete lineup.
    pub fn validate_lineup(
        &self,
        entity_ids: &[EntityId],
        candidates: &[Candidate],
    ) -> LineupValidation {
        let mut errors = Vec::new();
        let by_id: BTreeMap<&EntityId, &Candidate> =
            candidates.iter().map(|c| (&c.id, c)).collect();

        if entity_ids.len() != self.required_size {
            errors.push(format!(
                "Lineup has {} entities, expected {}",
                entity_ids.len(),
                self.required_size
            ));
        }

        let mut seen = BTreeSet::new();
        let mut duplicates = BTreeSet::new();
        for id in entity_ids {
            if !seen.insert(id) {
                duplicates.insert(id);
            }
        }
        for id in duplicates {
            errors.push(format!("Duplicate entity {}", id));
        }

        let mut total_cost = 0.0;
        let mut group_counts: BTreeMap<&GroupId, usize> = BTreeMap::new();
        for id in &seen {
            match by_id.get(id) {
                Some(c) => {
                    total_cost += c.cost;
                    *group_counts.entry(&c.group).or_default() += 1;
                }
                None => errors.push(format!("Unknown entity {}", id)),
            }
        }

        if total_cost > self.budget_cap + BUDGET_TOL * self.budget_cap.max(1.0) {
            errors.push(format!(
                "Total cost {} exceeds budget cap {}",
                total_cost, self.budget_cap
            ));
        }

        let stacked = self.stacked_groups(candidates);
        for (group, count) in group_counts {
            if !stacked.contains_key(group) {
                continue;
            }
            if count < self.min_stack {
                errors.push(format!(
                    "Group {} has {} selected, below minimum stack {}",
                    group, count, self.min_stack
                ));
            } else if count > self.max_stack {
                errors.push(format!(
                    "Group {} has {} selected, above maximum stack {}",
                    group, count, self.max_stack
                ));
            }
        }

        LineupValidation {
            valid: errors.is_empty(),
            errors,
        }
    }
}
