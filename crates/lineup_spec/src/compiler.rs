//! Fail-closed batch compilation of constraint specs.

use crate::error::SpecError;
use crate::spec::{ConstraintSpec, EntityConstraints, GroupConstraints};
use crate::store::AttributeStore;
use lineup_core::{EntityId, GroupId};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;
use tracing::{debug, info};

/// Compiles [`ConstraintSpec`]s from an injected attribute store.
///
/// Each compile issues exactly one batch query per record type. Any
/// requested id the store does not return aborts the compile with an error
/// that names every missing id.
#[derive(Debug, Clone)]
pub struct ConstraintSpecCompiler<S> {
    store: S,
}

impl<S: AttributeStore> ConstraintSpecCompiler<S> {
    /// Wrap a store handle.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetch and freeze entity attributes in one batch.
    ///
    /// # Errors
    ///
    /// `SpecError::MissingEntities` listing every requested id absent from
    /// the result set.
    pub fn compile_entity_constraints(
        &self,
        ids: &[EntityId],
    ) -> Result<BTreeMap<EntityId, EntityConstraints>, SpecError> {
        let requested: BTreeSet<EntityId> = ids.iter().cloned().collect();
        let query: Vec<EntityId> = requested.iter().cloned().collect();
        let records = self.store.fetch_entities(&query)?;

        let mut compiled = BTreeMap::new();
        for record in records {
            if requested.contains(&record.id) {
                compiled.insert(record.id, record.constraints);
            }
        }

        let missing: Vec<EntityId> = requested
            .into_iter()
            .filter(|id| !compiled.contains_key(id))
            .collect();
        if !missing.is_empty() {
            return Err(SpecError::MissingEntities(missing));
        }

        debug!(count = compiled.len(), "Compiled entity constraints");
        Ok(compiled)
    }

    /// Fetch and freeze group attributes in one batch.
    ///
    /// # Errors
    ///
    /// `SpecError::MissingGroups` listing every requested id absent from the
    /// result set.
    pub fn compile_group_constraints(
        &self,
        ids: &[GroupId],
    ) -> Result<BTreeMap<GroupId, GroupConstraints>, SpecError> {
        let requested: BTreeSet<GroupId> = ids.iter().cloned().collect();
        let query: Vec<GroupId> = requested.iter().cloned().collect();
        let records = self.store.fetch_groups(&query)?;

        let mut compiled = BTreeMap::new();
        for record in records {
            if requested.contains(&record.id) {
                compiled.insert(record.id, record.constraints);
            }
        }

        let missing: Vec<GroupId> = requested
            .into_iter()
            .filter(|id| !compiled.contains_key(id))
            .collect();
        if !missing.is_empty() {
            return Err(SpecError::MissingGroups(missing));
        }

        debug!(count = compiled.len(), "Compiled group constraints");
        Ok(compiled)
    }

    /// Compile the full spec for a slate.
    pub fn compile_spec(
        &self,
        slate_id: &str,
        entity_ids: &[EntityId],
        group_ids: &[GroupId],
    ) -> Result<ConstraintSpec, SpecError> {
        let start = Instant::now();
        let entities = self.compile_entity_constraints(entity_ids)?;
        let groups = self.compile_group_constraints(group_ids)?;
        let spec = ConstraintSpec::new(slate_id, entities, groups)?;

        info!(
            slate_id,
            entities = spec.entity_count(),
            groups = spec.group_count(),
            hash = spec.content_hash(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "Compiled constraint spec"
        );
        Ok(spec)
    }
}
