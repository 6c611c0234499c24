//! # lineup_core: Foundation for Tail-Optimised Lineup Portfolios
//!
//! ## Layer 1 (Foundation) Role
//!
//! lineup_core is the bottom layer of the lineup workspace, providing:
//! - Identifier and record types: `EntityId`, `GroupId`, `Candidate`, `Lineup` (`types`)
//! - Read-only scenario storage: `ScenarioMatrix` (`types::scenario`)
//! - Upper-tail metrics (VaR, CVaR, top-X%, conditional upside), the
//!   adaptive scenario-count advisor and bootstrap stability checks (`risk`)
//! - Structural and conservation validators with explicit rejection
//!   accounting (`validity`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other lineup_* crates. External
//! dependencies are limited to:
//! - rand: seeded resampling
//! - rayon: parallel bootstrap replicates
//! - serde: serialisation of identifiers and metrics
//! - thiserror: structured errors
//! - tracing: warnings about undersized scenario sets
//!
//! ## Usage Examples
//!
//! ```rust
//! use lineup_core::risk::tail_metrics;
//!
//! let outcomes: Vec<f64> = (0..100).map(f64::from).collect();
//! let metrics = tail_metrics(&outcomes, 0.99).unwrap();
//! assert_eq!(metrics.cvar, 99.0);
//! assert!(metrics.cvar >= metrics.var);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod risk;
pub mod types;
pub mod validity;

pub use risk::{TailMetrics, TailRiskError};
pub use types::{Candidate, EntityId, GroupId, Lineup, ScenarioMatrix, ShapeError, VetoRule};
pub use validity::{RejectionTracker, ValidationResult, ValidityError, ValidityKernel};
