//! Core value types shared across the lineup workspace.
//!
//! This module provides:
//! - `EntityId`, `GroupId`: strongly-typed identifiers
//! - `Candidate`: a selectable entity with cost, group and display name
//! - `Lineup`: an immutable, emitted selection with its derived fields
//! - `ScenarioMatrix`: read-only (scenario × candidate) outcome storage
//! - `VetoRule`: a forbidden causal relationship
//! - `ShapeError`: dimension errors for matrix construction

mod candidate;
mod error;
mod ids;
mod lineup;
pub mod scenario;
mod veto;

pub use candidate::Candidate;
pub use error::ShapeError;
pub use ids::{EntityId, GroupId};
pub use lineup::Lineup;
pub use scenario::ScenarioMatrix;
pub use veto::VetoRule;
