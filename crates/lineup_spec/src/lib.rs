//! # lineup_spec
//!
//! Immutable constraint specifications compiled once per optimisation run.
//!
//! This crate sits between the foundation (L1) and the optimiser (L3). It
//! pulls every entity and group attribute the run needs from an external
//! attribute store in exactly one batch per record type, then freezes the
//! result in a content-hashed [`ConstraintSpec`]. After compilation the
//! optimisation loop never touches the store again.
//!
//! ## Modules
//!
//! - `store`: the `AttributeStore` seam plus an in-memory implementation
//! - `compiler`: `ConstraintSpecCompiler` (fail-closed batch compilation)
//! - `spec`: `ConstraintSpec`, `EntityConstraints`, `GroupConstraints`
//! - `run_config`: `RunConfig` and `SimParams` for reproducible runs
//! - `digest`: canonical JSON and SHA-256 content digests
//!
//! ## Example
//!
//! ```rust
//! use lineup_spec::{
//!     ConstraintSpecCompiler, EntityConstraints, GroupConstraints, InMemoryAttributeStore,
//! };
//! use lineup_core::{EntityId, GroupId};
//!
//! let mut store = InMemoryAttributeStore::new();
//! store.insert_entity(EntityId::new("E1"), EntityConstraints::new(0.8, 0.4, 0.2));
//! store.insert_group(GroupId::new("G1"), GroupConstraints::new(1.2, 0.9, 0.05));
//!
//! let compiler = ConstraintSpecCompiler::new(&store);
//! let spec = compiler
//!     .compile_spec("slate-1", &[EntityId::new("E1")], &[GroupId::new("G1")])
//!     .unwrap();
//!
//! assert_eq!(spec.content_hash().len(), 64);
//! assert_eq!(store.entity_batches(), 1);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod compiler;
pub mod digest;
pub mod run_config;
pub mod spec;
pub mod store;

mod error;

pub use compiler::ConstraintSpecCompiler;
pub use error::SpecError;
pub use run_config::{RunConfig, RunConfigError, SimParams};
pub use spec::{ConstraintSpec, EntityConstraints, GroupConstraints, CONSTRAINT_SPEC_VERSION};
pub use store::{AttributeStore, EntityRecord, GroupRecord, InMemoryAttributeStore, StoreError};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::compiler::ConstraintSpecCompiler;
    pub use crate::run_config::{RunConfig, SimParams};
    pub use crate::spec::{ConstraintSpec, EntityConstraints, GroupConstraints};
    pub use crate::store::{AttributeStore, InMemoryAttributeStore};
    pub use crate::SpecError;
}
