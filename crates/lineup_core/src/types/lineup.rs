//! Emitted lineups.

use super::candidate::Candidate;
use super::ids::{EntityId, GroupId};
use crate::risk::TailMetrics;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A fixed-size selection of entities emitted by the generator.
///
/// Fields are private; a `Lineup` is assembled with the consuming
/// `with_*` methods before it is emitted and is read-only afterwards.
/// Entity order is the order the solver emitted them, which is the order
/// used for export.
///
/// # Examples
///
/// ```
/// use lineup_core::types::{Candidate, Lineup};
///
/// let pool = vec![
///     Candidate::new("E1", 10.0, "A"),
///     Candidate::new("E2", 12.0, "A"),
///     Candidate::new("E3", 8.0, "B"),
/// ];
/// let selected: Vec<&Candidate> = pool.iter().collect();
/// let lineup = Lineup::from_candidates(&selected);
///
/// assert_eq!(lineup.len(), 3);
/// assert_eq!(lineup.total_cost(), 30.0);
/// assert_eq!(lineup.group_ids().len(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lineup {
    entity_ids: Vec<EntityId>,
    group_ids: Vec<GroupId>,
    total_cost: f64,
    metrics: Option<TailMetrics>,
    exposure_snapshot: BTreeMap<EntityId, f64>,
}

impl Lineup {
    /// Create a lineup from raw parts.
    ///
    /// `group_ids` is de-duplicated and sorted.
    pub fn new(entity_ids: Vec<EntityId>, group_ids: Vec<GroupId>, total_cost: f64) -> Self {
        let group_ids: BTreeSet<GroupId> = group_ids.into_iter().collect();
        Self {
            entity_ids,
            group_ids: group_ids.into_iter().collect(),
            total_cost,
            metrics: None,
            exposure_snapshot: BTreeMap::new(),
        }
    }

    /// Create a lineup from selected candidate records, deriving the total
    /// cost and the set of groups represented.
    pub fn from_candidates(selected: &[&Candidate]) -> Self {
        let entity_ids = selected.iter().map(|c| c.id.clone()).collect();
        let group_ids = selected.iter().map(|c| c.group.clone()).collect();
        let total_cost = selected.iter().map(|c| c.cost).sum();
        Self::new(entity_ids, group_ids, total_cost)
    }

    /// Attach tail metrics computed over this lineup's scenario outcomes.
    pub fn with_metrics(mut self, metrics: TailMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Attach the per-entity exposure fractions observed when the lineup
    /// was accepted.
    pub fn with_exposure_snapshot(mut self, snapshot: BTreeMap<EntityId, f64>) -> Self {
        self.exposure_snapshot = snapshot;
        self
    }

    /// Selected entity ids in emission order.
    pub fn entity_ids(&self) -> &[EntityId] {
        &self.entity_ids
    }

    /// Distinct groups represented in the lineup, sorted.
    pub fn group_ids(&self) -> &[GroupId] {
        &self.group_ids
    }

    /// Sum of selected candidate costs.
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Tail metrics for the lineup's own scenario outcomes, if computed.
    pub fn metrics(&self) -> Option<&TailMetrics> {
        self.metrics.as_ref()
    }

    /// Exposure fractions at creation time.
    pub fn exposure_snapshot(&self) -> &BTreeMap<EntityId, f64> {
        &self.exposure_snapshot
    }

    /// Number of selected entities.
    pub fn len(&self) -> usize {
        self.entity_ids.len()
    }

    /// True when no entity is selected.
    pub fn is_empty(&self) -> bool {
        self.entity_ids.is_empty()
    }

    /// Whether the entity is part of the lineup.
    pub fn contains(&self, id: &EntityId) -> bool {
        self.entity_ids.contains(id)
    }

    /// Selected entities as a set.
    pub fn entity_set(&self) -> BTreeSet<&EntityId> {
        self.entity_ids.iter().collect()
    }
}
