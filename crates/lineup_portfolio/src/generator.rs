//! Sequential portfolio generation.
//!
//! Each slot is one 0-1 solve over the candidate pool:
//!
//! ```text
//! Init → { Solve → Validate → Accept | Reject } × n → Done | Infeasible
//! ```
//!
//! The objective is a weighted blend of per-candidate CVaR minus an overlap
//! penalty against lineups already accepted. Compliance rows, exposure
//! exclusions, overlap cuts and no-good cuts for rejected selections are
//! rebuilt for every solve from the current [`ExposureBook`]. A compiled
//! [`ConstraintSpec`] can tighten individual entity caps through its
//! `max_usage` bounds.

use crate::config::PortfolioConfig;
use crate::error::PortfolioError;
use lineup_core::risk::{check_scenario_count, cvar, tail_metrics};
use lineup_core::validity::ValidityKernel;
use lineup_core::{Candidate, Lineup, ScenarioMatrix};
use lineup_optimiser::{
    greedy_diverse_subset, penalty_coefficients, portfolio_correlation, ComplianceRules,
    DiversityReport, ExposureBook, ExposureLimits, ExposureMetrics, ExposureViolation,
    MilpSolver, Model, Sense, SolveStatus, SolverConfig, VarId,
};
use lineup_spec::ConstraintSpec;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Relative tolerance on the budget when re-checking a solved lineup.
const BUDGET_TOL: f64 = 1e-9;

/// Generator state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum GeneratorState {
    /// Inputs validated, nothing solved yet
    Init,
    /// Building and solving the model for the next slot
    Solve,
    /// Re-checking the solver's selection
    Validate,
    /// Selection emitted as a lineup
    Accept,
    /// Selection discarded and cut off
    Reject,
    /// Requested number of lineups reached
    Done,
    /// No further lineup could be produced
    Infeasible,
}

/// Why generation stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PortfolioStatus {
    /// Every requested lineup was produced.
    Complete,
    /// A solve proved no further compliant lineup exists.
    Infeasible,
    /// A solve ran out of time.
    TimeLimit,
    /// Too many consecutive selections failed re-validation.
    RejectionLimit,
}

impl PortfolioStatus {
    /// True if the portfolio has the requested size.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Terminal generator state for this status.
    pub fn final_state(&self) -> GeneratorState {
        match self {
            Self::Complete => GeneratorState::Done,
            _ => GeneratorState::Infeasible,
        }
    }
}

impl fmt::Display for PortfolioStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete => write!(f, "complete"),
            Self::Infeasible => write!(f, "infeasible"),
            Self::TimeLimit => write!(f, "time limit"),
            Self::RejectionLimit => write!(f, "rejection limit"),
        }
    }
}

/// Output of [`PortfolioGenerator::generate`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PortfolioResult {
    /// Accepted lineups in acceptance order
    pub lineups: Vec<Lineup>,
    /// Why generation stopped
    pub status: PortfolioStatus,
    /// Realized entity exposure over the accepted lineups
    pub exposure: ExposureMetrics,
    /// Caps exceeded by the accepted lineups (empty for a complete portfolio)
    pub exposure_violations: Vec<ExposureViolation>,
    /// Pairwise similarity of the accepted lineups
    pub diversity: DiversityReport,
    /// Selections discarded by re-validation
    pub rejected: usize,
    /// Solver calls made
    pub solves: usize,
}

impl PortfolioResult {
    /// Number of accepted lineups.
    pub fn len(&self) -> usize {
        self.lineups.len()
    }

    /// True if no lineup was accepted.
    pub fn is_empty(&self) -> bool {
        self.lineups.is_empty()
    }

    /// `k` mutually dissimilar lineups, starting from one drawn with `seed`.
    pub fn diverse_subset(&self, k: usize, seed: u64) -> Vec<&Lineup> {
        greedy_diverse_subset(&self.lineups, k, seed)
            .into_iter()
            .map(|i| &self.lineups[i])
            .collect()
    }
}

/// Sequential, exposure-aware lineup generator.
///
/// # Examples
///
/// ```
/// use lineup_core::{Candidate, ScenarioMatrix};
/// use lineup_portfolio::{PortfolioConfig, PortfolioGenerator};
///
/// let pool: Vec<Candidate> = (0..5)
///     .map(|i| Candidate::new(format!("e{}", i), 10.0, format!("g{}", i)))
///     .collect();
/// let rows = (0..20).map(|s| (0..5).map(|c| (s * c) as f64).collect()).collect();
/// let scenarios = ScenarioMatrix::from_rows(rows).unwrap();
///
/// let config = PortfolioConfig {
///     n_lineups: 3,
///     required_size: 2,
///     budget_cap: 30.0,
///     max_stack: 1,
///     ..PortfolioConfig::default()
/// };
/// let result = PortfolioGenerator::new(config).unwrap().generate(&pool, &scenarios).unwrap();
///
/// assert!(result.status.is_complete());
/// assert_eq!(result.len(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct PortfolioGenerator {
    config: PortfolioConfig,
    rules: ComplianceRules,
    limits: ExposureLimits,
    solver: MilpSolver,
    spec_hash: Option<String>,
}

impl PortfolioGenerator {
    /// Create a generator from a validated configuration.
    ///
    /// # Errors
    ///
    /// `PortfolioError::Config` if the configuration does not validate.
    pub fn new(config: PortfolioConfig) -> Result<Self, PortfolioError> {
        config.validate()?;
        let rules = config.compliance_rules()?;
        let limits = config.exposure_limits();
        let solver = MilpSolver::new(config.solver_config());
        Ok(Self {
            config,
            rules,
            limits,
            solver,
            spec_hash: None,
        })
    }

    /// Replace the per-solve budget derived from `time_limit_ms`.
    pub fn with_solver_config(mut self, solver_config: SolverConfig) -> Self {
        self.solver = MilpSolver::new(solver_config);
        self
    }

    /// Cap each entity of `spec` at its `max_usage`.
    ///
    /// Caps above `max_entity_exposure` have no effect; entities absent
    /// from the candidate pool are ignored.
    pub fn with_constraint_spec(mut self, spec: &ConstraintSpec) -> Self {
        for (id, entity) in spec.entities() {
            self.limits.entity_caps.insert(id.clone(), entity.max_usage);
        }
        self.spec_hash = Some(spec.content_hash().to_string());
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &PortfolioConfig {
        &self.config
    }

    /// Compliance rules derived from the configuration.
    pub fn rules(&self) -> &ComplianceRules {
        &self.rules
    }

    /// Exposure caps, including any per-entity caps from a spec.
    pub fn limits(&self) -> &ExposureLimits {
        &self.limits
    }

    /// Blended CVaR of each candidate's scenario column.
    ///
    /// # Errors
    ///
    /// `PortfolioError::InvalidInput` if a column yields a non-finite value,
    /// since such a candidate cannot be ranked.
    pub fn objective_coefficients(
        &self,
        candidates: &[Candidate],
        scenarios: &ScenarioMatrix,
    ) -> Result<Vec<f64>, PortfolioError> {
        check_shape(candidates, scenarios)?;
        candidates
            .iter()
            .enumerate()
            .map(|(j, candidate)| {
                let column = scenarios.column(j)?;
                let mut blended = 0.0;
                for term in &self.config.alpha_weights {
                    blended += term.weight * cvar(&column, term.alpha)?;
                }
                if !blended.is_finite() {
                    return Err(PortfolioError::invalid_input(format!(
                        "candidate {} has non-finite tail value {}",
                        candidate.id, blended
                    )));
                }
                Ok(blended)
            })
            .collect()
    }

    /// Generate up to `n_lineups` lineups.
    ///
    /// Stops early, returning what was accepted, when a solve is infeasible
    /// or exhausts its budget, or when re-validation rejects more than
    /// `max_rejections` selections in a row.
    ///
    /// # Errors
    ///
    /// Only for structurally invalid inputs: an empty or duplicated pool,
    /// unusable costs, a scenario matrix whose columns do not match the pool,
    /// or non-finite scenario values.
    pub fn generate(
        &self,
        candidates: &[Candidate],
        scenarios: &ScenarioMatrix,
    ) -> Result<PortfolioResult, PortfolioError> {
        let started = Instant::now();
        let mut state = GeneratorState::Init;
        validate_candidates(candidates)?;
        check_shape(candidates, scenarios)?;
        for term in &self.config.alpha_weights {
            if term.alpha < 1.0 {
                check_scenario_count(scenarios.n_scenarios(), term.alpha)?;
            }
        }

        let base = self.objective_coefficients(candidates, scenarios)?;
        let kernel = ValidityKernel::new(candidates.len())
            .and_then(|k| k.with_required_size(self.config.required_size))
            .map_err(|e| PortfolioError::invalid_input(e.to_string()))?;
        let budget_slack =
            self.config.budget_cap + BUDGET_TOL * self.config.budget_cap.max(1.0);

        info!(
            n_lineups = self.config.n_lineups,
            n_candidates = candidates.len(),
            n_scenarios = scenarios.n_scenarios(),
            spec_hash = self.spec_hash.as_deref().unwrap_or("none"),
            "starting portfolio generation"
        );

        let mut book = ExposureBook::new();
        let mut lineups: Vec<Lineup> = Vec::with_capacity(self.config.n_lineups);
        let mut no_goods: Vec<Vec<usize>> = Vec::new();
        let mut rejected = 0usize;
        let mut consecutive_rejections = 0usize;
        let mut solves = 0usize;

        let status = loop {
            if lineups.len() >= self.config.n_lineups {
                break PortfolioStatus::Complete;
            }

            transition(&mut state, GeneratorState::Solve);
            let (model, vars) = self.build_model(candidates, &base, &lineups, &book, &no_goods)?;
            let solution = self.solver.solve(&model)?;
            solves += 1;
            match solution.status {
                SolveStatus::Optimal => {}
                SolveStatus::Infeasible => {
                    warn!(
                        accepted = lineups.len(),
                        requested = self.config.n_lineups,
                        "no further feasible lineup; stopping early"
                    );
                    break PortfolioStatus::Infeasible;
                }
                SolveStatus::TimeLimit => {
                    warn!(
                        accepted = lineups.len(),
                        requested = self.config.n_lineups,
                        elapsed_ms = solution.elapsed.as_millis() as u64,
                        "solver time limit reached; stopping early"
                    );
                    break PortfolioStatus::TimeLimit;
                }
            }

            transition(&mut state, GeneratorState::Validate);
            let picked: Vec<usize> = vars
                .iter()
                .enumerate()
                .filter(|(_, &v)| solution.value(v))
                .map(|(i, _)| i)
                .collect();
            let entity_ids: Vec<_> = picked.iter().map(|&i| candidates[i].id.clone()).collect();
            let positions: Vec<i64> = picked.iter().map(|&i| i as i64 + 1).collect();
            let costs: Vec<f64> = picked.iter().map(|&i| candidates[i].cost).collect();

            let structural_ok = !kernel.is_impossible_state(&positions, Some(&costs), Some(budget_slack));
            let validation = self.rules.validate_lineup(&entity_ids, candidates);

            if !(structural_ok && validation.valid) {
                transition(&mut state, GeneratorState::Reject);
                rejected += 1;
                consecutive_rejections += 1;
                warn!(
                    slot = lineups.len(),
                    structural_ok,
                    errors = ?validation.errors,
                    "solver selection failed re-validation"
                );
                no_goods.push(picked);
                if consecutive_rejections > self.config.max_rejections {
                    warn!(
                        consecutive_rejections,
                        "rejection limit reached; stopping early"
                    );
                    break PortfolioStatus::RejectionLimit;
                }
                continue;
            }

            transition(&mut state, GeneratorState::Accept);
            consecutive_rejections = 0;
            let outcomes = scenarios.lineup_outcomes(&picked)?;
            let metrics = tail_metrics(&outcomes, self.config.metrics_alpha)?;
            let selected: Vec<&Candidate> = picked.iter().map(|&i| &candidates[i]).collect();
            let lineup = Lineup::from_candidates(&selected).with_metrics(metrics);
            book = book.update(&lineup);
            let lineup = lineup.with_exposure_snapshot(book.snapshot());
            debug!(
                slot = lineups.len(),
                objective = solution.objective,
                cvar = metrics.cvar,
                "lineup accepted"
            );
            lineups.push(lineup);
        };
        transition(&mut state, status.final_state());

        let exposure = book.compute_metrics(lineups.len());
        let exposure_violations = if lineups.is_empty() {
            Vec::new()
        } else {
            book.check_limits(lineups.len(), &self.limits)
        };
        if !exposure_violations.is_empty() {
            warn!(
                violations = exposure_violations.len(),
                accepted = lineups.len(),
                "partial portfolio exceeds exposure caps"
            );
        }
        let diversity = portfolio_correlation(&lineups);

        info!(
            accepted = lineups.len(),
            rejected,
            solves,
            status = %status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "portfolio generation finished"
        );

        Ok(PortfolioResult {
            lineups,
            status,
            exposure,
            exposure_violations,
            diversity,
            rejected,
            solves,
        })
    }

    /// Model for the next slot.
    ///
    /// `vars[i]` selects `candidates[i]`.
    pub(crate) fn build_model(
        &self,
        candidates: &[Candidate],
        base: &[f64],
        previous: &[Lineup],
        book: &ExposureBook,
        no_goods: &[Vec<usize>],
    ) -> Result<(Model, Vec<VarId>), PortfolioError> {
        let mut model = Model::new();
        let vars: Vec<VarId> = candidates
            .iter()
            .map(|c| model.add_binary(c.id.as_str()))
            .collect();

        let penalty = penalty_coefficients(candidates, previous, self.config.diversity_weight);
        for ((&var, &value), &p) in vars.iter().zip(base).zip(&penalty) {
            model.set_objective(var, value - p)?;
        }

        self.rules.apply(&mut model, candidates, &vars)?;
        let excluded = book.add_exposure_constraints(
            &mut model,
            candidates,
            &vars,
            self.config.n_lineups,
            &self.limits,
        )?;
        if !excluded.is_empty() {
            debug!(
                entities = excluded.entities.len(),
                groups = excluded.groups.len(),
                "exposure exclusions applied"
            );
        }

        let max_overlap = self.config.effective_max_overlap() as f64;
        for (k, lineup) in previous.iter().enumerate() {
            let members: BTreeSet<_> = lineup.entity_set();
            let terms: Vec<(VarId, f64)> = candidates
                .iter()
                .zip(&vars)
                .filter(|(c, _)| members.contains(&c.id))
                .map(|(_, &v)| (v, 1.0))
                .collect();
            model.add_constraint(format!("overlap[{}]", k), terms, Sense::Le, max_overlap)?;
        }

        for (k, selection) in no_goods.iter().enumerate() {
            let terms: Vec<(VarId, f64)> = selection.iter().map(|&i| (vars[i], 1.0)).collect();
            let rhs = selection.len().saturating_sub(1) as f64;
            model.add_constraint(format!("no_good[{}]", k), terms, Sense::Le, rhs)?;
        }

        Ok((model, vars))
    }
}

fn transition(state: &mut GeneratorState, next: GeneratorState) {
    debug!(from = ?*state, to = ?next, "generator transition");
    *state = next;
}

fn check_shape(candidates: &[Candidate], scenarios: &ScenarioMatrix) -> Result<(), PortfolioError> {
    if scenarios.n_candidates() != candidates.len() {
        return Err(PortfolioError::ShapeMismatch {
            columns: scenarios.n_candidates(),
            candidates: candidates.len(),
        });
    }
    Ok(())
}

fn validate_candidates(candidates: &[Candidate]) -> Result<(), PortfolioError> {
    if candidates.is_empty() {
        return Err(PortfolioError::invalid_input("candidate pool is empty"));
    }
    let mut seen = BTreeSet::new();
    for c in candidates {
        if !seen.insert(&c.id) {
            return Err(PortfolioError::invalid_input(format!(
                "duplicate candidate {}",
                c.id
            )));
        }
        if !c.cost.is_finite() || c.cost < 0.0 {
            return Err(PortfolioError::invalid_input(format!(
                "candidate {} has invalid cost {}",
                c.id, c.cost
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use lineup_core::EntityId;
    use lineup_spec::EntityConstraints;
    use std::collections::BTreeMap;

    /// One group per candidate; every scenario repeats `values`.
    fn constant_pool(values: &[f64]) -> (Vec<Candidate>, ScenarioMatrix) {
        let pool = values
            .iter()
            .enumerate()
            .map(|(i, _)| Candidate::new(format!("e{}", i), 10.0, format!("g{}", i)))
            .collect();
        let rows = (0..20).map(|_| values.to_vec()).collect();
        (pool, ScenarioMatrix::from_rows(rows).unwrap())
    }

    fn config(n_lineups: usize, required_size: usize) -> PortfolioConfig {
        PortfolioConfig {
            n_lineups,
            required_size,
            budget_cap: 1_000.0,
            min_stack: 1,
            max_stack: 1,
            diversity_weight: 0.0,
            ..PortfolioConfig::default()
        }
    }

    fn ids(lineup: &Lineup) -> Vec<&str> {
        lineup.entity_ids().iter().map(EntityId::as_str).collect()
    }

    // ========================================
    // Objective Tests
    // ========================================

    #[test]
    fn test_objective_blends_cvar() {
        let (pool, _) = constant_pool(&[1.0, 2.0]);
        let rows = (0..100).map(|s| vec![s as f64, 5.0]).collect();
        let scenarios = ScenarioMatrix::from_rows(rows).unwrap();
        let generator = PortfolioGenerator::new(config(1, 1)).unwrap();

        let coeffs = generator.objective_coefficients(&pool, &scenarios).unwrap();
        // 0.7 * CVaR_0.99 (= 99) + 0.3 * CVaR_0.95 (= mean 95..99 = 97)
        assert_relative_eq!(coeffs[0], 0.7 * 99.0 + 0.3 * 97.0, epsilon = 1e-9);
        assert_relative_eq!(coeffs[1], 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_objective_rejects_nan_column() {
        let (pool, _) = constant_pool(&[1.0, 2.0]);
        let rows = (0..10).map(|_| vec![f64::NAN, 1.0]).collect();
        let scenarios = ScenarioMatrix::from_rows(rows).unwrap();
        let generator = PortfolioGenerator::new(config(1, 1)).unwrap();
        let err = generator.objective_coefficients(&pool, &scenarios).unwrap_err();
        assert!(err.is_invalid_input());
    }

    // ========================================
    // Generation Tests
    // ========================================

    #[test]
    fn test_sequential_lineups_follow_objective() {
        let (pool, scenarios) = constant_pool(&[10.0, 9.0, 8.0, 7.0, 5.5, 3.0]);
        let generator = PortfolioGenerator::new(config(3, 3)).unwrap();
        let result = generator.generate(&pool, &scenarios).unwrap();

        assert_eq!(result.status, PortfolioStatus::Complete);
        assert_eq!(ids(&result.lineups[0]), vec!["e0", "e1", "e2"]);
        assert_eq!(ids(&result.lineups[1]), vec!["e0", "e1", "e3"]);
        assert_eq!(ids(&result.lineups[2]), vec!["e0", "e2", "e3"]);

        let metrics = result.lineups[0].metrics().unwrap();
        assert_relative_eq!(metrics.cvar, 27.0, epsilon = 1e-9);
        assert_eq!(result.rejected, 0);
        assert_eq!(result.solves, 3);
    }

    #[test]
    fn test_exhausted_pool_degrades_softly() {
        // Only four 3-subsets of four candidates exist.
        let (pool, scenarios) = constant_pool(&[4.0, 3.0, 2.0, 1.0]);
        let generator = PortfolioGenerator::new(config(6, 3)).unwrap();
        let result = generator.generate(&pool, &scenarios).unwrap();

        assert_eq!(result.status, PortfolioStatus::Infeasible);
        assert_eq!(result.status.final_state(), GeneratorState::Infeasible);
        assert_eq!(result.len(), 4);
        let distinct: BTreeSet<Vec<&str>> = result.lineups.iter().map(ids).collect();
        assert_eq!(distinct.len(), 4);
    }

    #[test]
    fn test_entity_exposure_cap_respected() {
        let values: Vec<f64> = (0..12).map(|i| 12.0 - i as f64).collect();
        let (pool, scenarios) = constant_pool(&values);
        let generator = PortfolioGenerator::new(PortfolioConfig {
            max_entity_exposure: 0.5,
            ..config(4, 3)
        })
        .unwrap();
        let result = generator.generate(&pool, &scenarios).unwrap();

        assert!(result.status.is_complete());
        assert!(result.exposure_violations.is_empty());
        for fraction in result.exposure.fractions.values() {
            assert!(*fraction <= 0.5 + 1e-12);
        }
        assert_eq!(ids(&result.lineups[0]), vec!["e0", "e1", "e2"]);
        assert_eq!(ids(&result.lineups[1]), vec!["e3", "e4", "e5"]);
        // Everything used so far sits at one half after two lineups.
        assert_eq!(ids(&result.lineups[2]), vec!["e6", "e7", "e8"]);
        assert_eq!(ids(&result.lineups[3]), vec!["e0", "e1", "e3"]);
    }

    #[test]
    fn test_entity_at_cap_so_far_sits_out_next_lineup() {
        let (pool, scenarios) = constant_pool(&[100.0, 5.0, 4.0, 3.0, 2.0, 1.0]);
        let cap = 0.5;
        let generator = PortfolioGenerator::new(PortfolioConfig {
            max_entity_exposure: cap,
            ..config(4, 2)
        })
        .unwrap();
        let result = generator.generate(&pool, &scenarios).unwrap();
        assert!(result.status.is_complete());

        for k in 1..result.len() {
            let mut counts: BTreeMap<&EntityId, usize> = BTreeMap::new();
            for lineup in &result.lineups[..k] {
                for id in lineup.entity_ids() {
                    *counts.entry(id).or_default() += 1;
                }
            }
            for (id, count) in counts {
                if count as f64 / k as f64 >= cap {
                    assert!(!result.lineups[k].contains(id), "{} reused in lineup {}", id, k);
                }
            }
        }
        assert_eq!(ids(&result.lineups[0]), vec!["e0", "e1"]);
        assert_eq!(ids(&result.lineups[1]), vec!["e2", "e3"]);
        assert_eq!(ids(&result.lineups[3]), vec!["e0", "e2"]);
    }

    #[test]
    fn test_constraint_spec_caps_entity_usage() {
        let (pool, scenarios) = constant_pool(&[10.0, 9.0, 8.0, 7.0, 6.0]);
        let mut entities = BTreeMap::new();
        entities.insert(
            EntityId::new("e0"),
            EntityConstraints::new(0.9, 0.5, 0.1).with_usage_bounds(0.0, 0.25),
        );
        entities.insert(EntityId::new("e1"), EntityConstraints::new(0.8, 0.5, 0.1));
        let spec = ConstraintSpec::new("slate", entities, BTreeMap::new()).unwrap();

        let generator = PortfolioGenerator::new(config(4, 2))
            .unwrap()
            .with_constraint_spec(&spec);
        assert_eq!(generator.limits().entity_cap(&EntityId::new("e0")), 0.25);
        assert_eq!(generator.limits().entity_cap(&EntityId::new("e1")), 1.0);

        let result = generator.generate(&pool, &scenarios).unwrap();
        assert!(result.status.is_complete());
        assert!(result.exposure_violations.is_empty());
        let with_e0: Vec<usize> = (0..result.len())
            .filter(|&k| result.lineups[k].contains(&EntityId::new("e0")))
            .collect();
        assert_eq!(with_e0, vec![0]);
    }

    #[test]
    fn test_exposure_snapshot_includes_own_lineup() {
        let (pool, scenarios) = constant_pool(&[3.0, 2.0, 1.0]);
        let generator = PortfolioGenerator::new(config(2, 2)).unwrap();
        let result = generator.generate(&pool, &scenarios).unwrap();

        let first = result.lineups[0].exposure_snapshot();
        assert_eq!(first.get(&EntityId::new("e0")), Some(&1.0));
        let second = result.lineups[1].exposure_snapshot();
        assert_eq!(second.get(&EntityId::new("e0")), Some(&1.0));
        assert_eq!(second.get(&EntityId::new("e1")), Some(&0.5));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let (pool, scenarios) = constant_pool(&[5.0, 4.0, 4.0, 3.0, 2.0, 2.0, 1.0]);
        let generator = PortfolioGenerator::new(PortfolioConfig {
            diversity_weight: 0.5,
            ..config(5, 3)
        })
        .unwrap();
        let a = generator.generate(&pool, &scenarios).unwrap();
        let b = generator.generate(&pool, &scenarios).unwrap();
        assert_eq!(a.lineups, b.lineups);
        assert_eq!(a.solves, b.solves);
    }

    // ========================================
    // Model Construction Tests
    // ========================================

    #[test]
    fn test_no_good_cut_blocks_selection() {
        let (pool, _) = constant_pool(&[3.0, 2.0, 1.0]);
        let generator = PortfolioGenerator::new(config(1, 2)).unwrap();
        let base = vec![3.0, 2.0, 1.0];

        let (model, vars) = generator
            .build_model(&pool, &base, &[], &ExposureBook::new(), &[vec![0, 1]])
            .unwrap();
        let solution = MilpSolver::with_defaults().solve(&model).unwrap();
        assert!(solution.is_optimal());
        let picked: Vec<bool> = vars.iter().map(|&v| solution.value(v)).collect();
        assert_eq!(picked, vec![true, false, true]);
    }

    #[test]
    fn test_overlap_cut_uses_configured_bound() {
        let (pool, scenarios) = constant_pool(&[4.0, 3.0, 2.0, 1.0, 0.5]);
        let generator = PortfolioGenerator::new(PortfolioConfig {
            max_overlap: Some(1),
            ..config(2, 3)
        })
        .unwrap();
        let result = generator.generate(&pool, &scenarios).unwrap();
        assert_eq!(result.len(), 2);
        let shared = result.lineups[1]
            .entity_ids()
            .iter()
            .filter(|id| result.lineups[0].contains(id))
            .count();
        assert!(shared <= 1);
    }

    // ========================================
    // Input Validation Tests
    // ========================================

    #[test]
    fn test_shape_mismatch_is_error() {
        let (pool, _) = constant_pool(&[1.0, 2.0, 3.0]);
        let scenarios = ScenarioMatrix::new(2, 2, vec![1.0; 4]).unwrap();
        let generator = PortfolioGenerator::new(config(1, 1)).unwrap();
        let err = generator.generate(&pool, &scenarios).unwrap_err();
        assert!(matches!(
            err,
            PortfolioError::ShapeMismatch {
                columns: 2,
                candidates: 3
            }
        ));
    }

    #[test]
    fn test_duplicate_and_empty_pool_rejected() {
        let generator = PortfolioGenerator::new(config(1, 1)).unwrap();
        let scenarios = ScenarioMatrix::new(1, 2, vec![1.0, 2.0]).unwrap();
        let pool = vec![Candidate::new("a", 1.0, "g"), Candidate::new("a", 1.0, "g")];
        assert!(generator.generate(&pool, &scenarios).unwrap_err().is_invalid_input());
        assert!(generator.generate(&[], &scenarios).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = PortfolioGenerator::new(PortfolioConfig {
            n_lineups: 0,
            ..PortfolioConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, PortfolioError::Config(_)));
    }

    #[test]
    fn test_diverse_subset_picks_from_result() {
        let (pool, scenarios) = constant_pool(&[5.0, 4.0, 3.0, 2.0, 1.0]);
        let generator = PortfolioGenerator::new(config(4, 2)).unwrap();
        let result = generator.generate(&pool, &scenarios).unwrap();
        let subset = result.diverse_subset(2, 9);
        assert_eq!(subset.len(), 2);
        assert_ne!(subset[0], subset[1]);
    }
}
