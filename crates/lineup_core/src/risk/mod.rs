//! Upper-tail risk estimation over simulated outcomes.
//!
//! This module provides:
//! - `tail_metrics`: VaR, CVaR, top-X% and conditional upside in one pass
//! - `adaptive_scenario_count`: minimum scenario count for a tail quantile
//! - `validate_tail_stability`: bootstrap check of CVaR and ranking stability
//!
//! All metrics are taken in the *upper* tail: at α = 0.99 the tail is the
//! best 1% of scenarios.
//!
//! ## Tail Size
//!
//! ```text
//! k = max(1, round((1 - α) · n))
//! ```
//!
//! The top-k values are extracted with an O(n) partial selection rather than
//! a full sort.

mod advisor;
mod bootstrap;
mod error;
mod tail;

pub use advisor::{
    adaptive_scenario_count, check_scenario_count, tier_floor, ScenarioCountAdvice,
    DEFAULT_MIN_TAIL_SAMPLES,
};
pub use bootstrap::{
    validate_tail_stability, StabilityReport, MIN_BOOTSTRAP_REPLICATES, STABLE_AGREEMENT,
    STABLE_CV,
};
pub use error::TailRiskError;
pub use tail::{cvar, tail_metrics, tail_size, validate_alpha, var, TailMetrics, MIN_STABLE_TAIL_SAMPLES};
