//! Exact 0-1 solves for lineup models.
//!
//! - [`MilpSolver`]: translates a [`Model`](crate::model::Model) into a
//!   `good_lp` problem and solves it with `microlp` under a time limit
//! - [`SolverConfig`]: wall-clock budget
//! - [`Solution`] / [`SolveStatus`]: solve outcome

mod config;
mod error;
mod milp;

pub use config::SolverConfig;
pub use error::SolverError;
pub use milp::{MilpSolver, Solution, SolveStatus};
