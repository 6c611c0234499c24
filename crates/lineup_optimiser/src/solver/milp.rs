//! Binary models solved through `good_lp`.

use super::{SolverConfig, SolverError};
use crate::model::{Model, Sense, VarId};
use good_lp::solvers::microlp::microlp;
use good_lp::{
    constraint, variable, Expression, ProblemVariables, ResolutionError, Solution as _,
    SolverModel, Variable,
};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Absolute tolerance when re-checking a backend assignment.
const FEAS_TOL: f64 = 1e-6;

/// Outcome of a solve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolveStatus {
    /// The backend returned an optimal assignment.
    Optimal,
    /// The backend proved the model has no feasible assignment.
    Infeasible,
    /// The wall-clock budget ran out before the backend answered.
    TimeLimit,
}

/// Result of [`MilpSolver::solve`].
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    /// Solve status
    pub status: SolveStatus,
    /// Assignment indexed by variable; empty unless `Optimal`
    pub values: Vec<bool>,
    /// Objective of `values`; `f64::NEG_INFINITY` unless `Optimal`
    pub objective: f64,
    /// Wall-clock time spent
    pub elapsed: Duration,
}

impl Solution {
    fn without_assignment(status: SolveStatus, elapsed: Duration) -> Self {
        Self {
            status,
            values: Vec::new(),
            objective: f64::NEG_INFINITY,
            elapsed,
        }
    }

    /// True if the backend returned an optimal assignment.
    pub fn is_optimal(&self) -> bool {
        self.status == SolveStatus::Optimal
    }

    /// Value of `var` in the assignment.
    pub fn value(&self, var: VarId) -> bool {
        self.values.get(var.index()).copied().unwrap_or(false)
    }

    /// Indices of variables set to one.
    pub fn selected(&self) -> Vec<usize> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, &v)| v)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Exact maximiser for [`Model`]s.
///
/// Every model variable becomes a binary `good_lp` variable (zero-fixed
/// variables get an upper bound of zero) and every row a linear constraint.
/// The `microlp` backend runs on a worker thread; if it has not answered
/// within [`SolverConfig::time_limit`] the solve reports
/// [`SolveStatus::TimeLimit`] and the worker's late answer is dropped.
///
/// # Example
///
/// ```
/// use lineup_optimiser::model::{Model, Sense};
/// use lineup_optimiser::solver::{MilpSolver, SolveStatus};
///
/// // Knapsack: values 6, 5, 4; weights 3, 2, 2; capacity 4.
/// let mut model = Model::new();
/// let vars: Vec<_> = (0..3).map(|i| model.add_binary(format!("x{}", i))).collect();
/// for (v, c) in vars.iter().zip([6.0, 5.0, 4.0]) {
///     model.set_objective(*v, c).unwrap();
/// }
/// let weights = vars.iter().copied().zip([3.0, 2.0, 2.0]).collect();
/// model.add_constraint("capacity", weights, Sense::Le, 4.0).unwrap();
///
/// let solution = MilpSolver::with_defaults().solve(&model).unwrap();
/// assert_eq!(solution.status, SolveStatus::Optimal);
/// assert_eq!(solution.selected(), vec![1, 2]);
/// assert_eq!(solution.objective, 9.0);
/// ```
#[derive(Debug, Clone)]
pub struct MilpSolver {
    config: SolverConfig,
}

impl MilpSolver {
    /// Create a solver with the given budget.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Create a solver with the default budget.
    pub fn with_defaults() -> Self {
        Self::new(SolverConfig::default())
    }

    /// Budget in use.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Maximise the model objective.
    ///
    /// # Errors
    ///
    /// `SolverError::Backend` if the backend fails for a reason other than
    /// infeasibility, or returns an assignment that breaks a row.
    pub fn solve(&self, model: &Model) -> Result<Solution, SolverError> {
        let start = Instant::now();

        // Rows whose terms all merged away never reach the backend.
        if model
            .constraints()
            .iter()
            .any(|c| c.terms().is_empty() && !c.is_satisfied(&[], FEAS_TOL))
        {
            return Ok(Solution::without_assignment(
                SolveStatus::Infeasible,
                start.elapsed(),
            ));
        }

        let (tx, rx) = mpsc::channel();
        let owned = model.clone();
        thread::Builder::new()
            .name("lineup-milp".into())
            .spawn(move || {
                // The receiver is gone once the deadline passed.
                let _ = tx.send(solve_blocking(&owned));
            })
            .map_err(|e| SolverError::backend(format!("cannot start solver thread: {}", e)))?;

        let outcome = match rx.recv_timeout(self.config.time_limit) {
            Ok(outcome) => outcome?,
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    time_limit_ms = self.config.time_limit.as_millis() as u64,
                    n_vars = model.n_vars(),
                    n_rows = model.n_constraints(),
                    "solve abandoned at time limit"
                );
                return Ok(Solution::without_assignment(
                    SolveStatus::TimeLimit,
                    start.elapsed(),
                ));
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err(SolverError::backend("solver thread exited without an answer"));
            }
        };

        let elapsed = start.elapsed();
        let solution = match outcome {
            Some(values) => {
                if !model.is_feasible(&values, FEAS_TOL) {
                    return Err(SolverError::backend(
                        "backend assignment violates a model row",
                    ));
                }
                let objective = model.evaluate(&values);
                Solution {
                    status: SolveStatus::Optimal,
                    values,
                    objective,
                    elapsed,
                }
            }
            None => Solution::without_assignment(SolveStatus::Infeasible, elapsed),
        };

        debug!(
            status = ?solution.status,
            objective = solution.objective,
            n_vars = model.n_vars(),
            n_rows = model.n_constraints(),
            elapsed_ms = elapsed.as_millis() as u64,
            "MILP solve finished"
        );
        Ok(solution)
    }
}

/// Translate and solve; `None` when the backend proves infeasibility.
fn solve_blocking(model: &Model) -> Result<Option<Vec<bool>>, SolverError> {
    if model.n_vars() == 0 {
        return Ok(Some(Vec::new()));
    }

    let mut vars = ProblemVariables::new();
    let columns: Vec<Variable> = model
        .fixed_zero_mask()
        .iter()
        .map(|&fixed| {
            let def = variable().binary();
            vars.add(if fixed { def.max(0.0) } else { def })
        })
        .collect();

    let objective = model
        .objective()
        .iter()
        .zip(&columns)
        .fold(Expression::from(0.0), |acc, (&c, &x)| acc + c * x);

    let mut problem = vars.maximise(objective).using(microlp);
    for row in model.constraints().iter().filter(|c| !c.terms().is_empty()) {
        let lhs = row
            .terms()
            .iter()
            .fold(Expression::from(0.0), |acc, &(v, a)| acc + a * columns[v.index()]);
        let rhs = row.rhs();
        problem = match row.sense() {
            Sense::Le => problem.with(constraint!(lhs <= rhs)),
            Sense::Ge => problem.with(constraint!(lhs >= rhs)),
            Sense::Eq => problem.with(constraint!(lhs == rhs)),
        };
    }

    match problem.solve() {
        Ok(solution) => Ok(Some(
            columns.iter().map(|&x| solution.value(x) > 0.5).collect(),
        )),
        Err(ResolutionError::Infeasible) => Ok(None),
        Err(e) => Err(SolverError::backend(e.to_string())),
    }
}
