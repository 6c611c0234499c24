//! Attribute store seam.
//!
//! The compiler never constructs its own store connection. Callers build a
//! store client once at process start and inject it, so there is no lazy
//! global initialisation to get out of order.

use crate::spec::{EntityConstraints, GroupConstraints};
use lineup_core::{EntityId, GroupId};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Failures reported by an attribute store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store rejected or failed the query.
    #[error("Query failed: {0}")]
    Query(String),
}

/// Entity attributes as returned by a batch fetch.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityRecord {
    /// Entity identifier
    pub id: EntityId,
    /// Attributes for the entity
    pub constraints: EntityConstraints,
}

/// Group attributes as returned by a batch fetch.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupRecord {
    /// Group identifier
    pub id: GroupId,
    /// Attributes for the group
    pub constraints: GroupConstraints,
}

/// Batched "fetch by id set" access to entity and group attributes.
///
/// Implementations return whatever subset of the requested ids they hold;
/// the compiler decides what a missing id means.
pub trait AttributeStore {
    /// Fetch every requested entity in one query.
    fn fetch_entities(&self, ids: &[EntityId]) -> Result<Vec<EntityRecord>, StoreError>;

    /// Fetch every requested group in one query.
    fn fetch_groups(&self, ids: &[GroupId]) -> Result<Vec<GroupRecord>, StoreError>;
}

impl<S: AttributeStore + ?Sized> AttributeStore for &S {
    fn fetch_entities(&self, ids: &[EntityId]) -> Result<Vec<EntityRecord>, StoreError> {
        (**self).fetch_entities(ids)
    }

    fn fetch_groups(&self, ids: &[GroupId]) -> Result<Vec<GroupRecord>, StoreError> {
        (**self).fetch_groups(ids)
    }
}

impl<S: AttributeStore + ?Sized> AttributeStore for Arc<S> {
    fn fetch_entities(&self, ids: &[EntityId]) -> Result<Vec<EntityRecord>, StoreError> {
        (**self).fetch_entities(ids)
    }

    fn fetch_groups(&self, ids: &[GroupId]) -> Result<Vec<GroupRecord>, StoreError> {
        (**self).fetch_groups(ids)
    }
}

/// In-process attribute store.
///
/// Counts batch queries so callers can assert that a compilation issued
/// exactly one query per record type.
#[derive(Debug, Default)]
pub struct InMemoryAttributeStore {
    entities: BTreeMap<EntityId, EntityConstraints>,
    groups: BTreeMap<GroupId, GroupConstraints>,
    entity_batches: AtomicUsize,
    group_batches: AtomicUsize,
}

impl InMemoryAttributeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entity.
    pub fn insert_entity(&mut self, id: EntityId, constraints: EntityConstraints) {
        self.entities.insert(id, constraints);
    }

    /// Insert or replace a group.
    pub fn insert_group(&mut self, id: GroupId, constraints: GroupConstraints) {
        self.groups.insert(id, constraints);
    }

    /// Number of entity batch queries served.
    pub fn entity_batches(&self) -> usize {
        self.entity_batches.load(Ordering::Relaxed)
    }

    /// Number of group batch queries served.
    pub fn group_batches(&self) -> usize {
        self.group_batches.load(Ordering::Relaxed)
    }

    /// Number of stored entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }
}

impl AttributeStore for InMemoryAttributeStore {
    fn fetch_entities(&self, ids: &[EntityId]) -> Result<Vec<EntityRecord>, StoreError> {
        self.entity_batches.fetch_add(1, Ordering::Relaxed);
        Ok(ids
            .iter()
            .filter_map(|id| {
                self.entities.get(id).map(|c| EntityRecord {
                    id: id.clone(),
                    constraints: c.clone(),
                })
            })
            .collect())
    }

    fn fetch_groups(&self, ids: &[GroupId]) -> Result<Vec<GroupRecord>, StoreError> {
        self.group_batches.fetch_add(1, Ordering::Relaxed);
        Ok(ids
            .iter()
            .filter_map(|id| {
                self.groups.get(id).map(|c| GroupRecord {
                    id: id.clone(),
                    constraints: c.clone(),
                })
            })
            .collect())
    }
}
