//! Validity kernel: rejects structurally or physically impossible states.
//!
//! This module provides:
//! - `ValidityKernel`: stateless structural checks (positions, uniqueness,
//!   roster size, budget) plus conservation and veto-rule validators
//! - `RejectionTracker`: explicitly owned rejection counters with reset
//! - `SharedRejectionTracker`: mutex-protected handle for parallel runs
//! - `ValidationResult` / `VetoReason`: outcome of a counted validation
//!
//! ## Ownership
//!
//! Rejection statistics are never global. Whoever orchestrates an
//! optimisation run owns a `RejectionTracker` and lends it to the kernel by
//! `&mut`. Parallel runs either own one tracker each or share a
//! `SharedRejectionTracker`.

mod conservation;
mod error;
mod kernel;
mod result;
mod tracker;

pub use conservation::DominatorScenario;
pub use error::ValidityError;
pub use kernel::{ValidityKernel, DEFAULT_LINEUP_SIZE};
pub use result::{ValidationResult, VetoReason};
pub use tracker::{RejectionTracker, SharedRejectionTracker};
