//! # lineup_optimiser
//!
//! Integer model, exact solver and portfolio rules for lineup selection.
//!
//! ## Modules
//!
//! - `model`: binary variables, linear rows, maximisation objective
//! - `solver`: `MilpSolver` over `good_lp` with a wall-clock budget
//! - `compliance`: roster size, budget cap and group stacking rules
//! - `exposure`: `ExposureBook` usage counts and forward exclusion
//! - `diversity`: Jaccard similarity, overlap penalties, diverse subsets
//!
//! ## Example
//!
//! ```rust
//! use lineup_core::Candidate;
//! use lineup_optimiser::compliance::ComplianceRules;
//! use lineup_optimiser::model::Model;
//! use lineup_optimiser::solver::MilpSolver;
//!
//! let pool: Vec<Candidate> = (0..6)
//!     .map(|i| Candidate::new(format!("e{}", i), 10.0, format!("g{}", i % 3)))
//!     .collect();
//! let rules = ComplianceRules::new(2, 25.0, 1, 2).unwrap();
//!
//! let mut model = Model::new();
//! let vars: Vec<_> = pool.iter().map(|c| model.add_binary(c.id.to_string())).collect();
//! for (i, v) in vars.iter().enumerate() {
//!     model.set_objective(*v, i as f64).unwrap();
//! }
//! rules.apply(&mut model, &pool, &vars).unwrap();
//!
//! let solution = MilpSolver::with_defaults().solve(&model).unwrap();
//! assert!(solution.is_optimal());
//! assert!(solution.value(vars[5]) && solution.value(vars[4]));
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod compliance;
pub mod diversity;
pub mod exposure;
pub mod model;
pub mod solver;

pub use compliance::{ComplianceError, ComplianceRules, LineupValidation, StackVars};
pub use diversity::{
    correlation_penalty, greedy_diverse_subset, jaccard, penalty_coefficients,
    portfolio_correlation, similarity_matrix, DiversityReport,
};
pub use exposure::{ExclusionSummary, ExposureBook, ExposureLimits, ExposureMetrics, ExposureViolation};
pub use model::{LinearConstraint, Model, Sense, VarId};
pub use solver::{MilpSolver, Solution, SolveStatus, SolverConfig, SolverError};
