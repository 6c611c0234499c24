//! Entity and group exposure across a portfolio.

use crate::model::{Model, VarId};
use crate::solver::SolverError;
use lineup_core::{Candidate, EntityId, GroupId, Lineup};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Tolerance when comparing exposure fractions with caps.
const EXPOSURE_TOL: f64 = 1e-9;

/// Per-entity and per-group exposure caps, as fractions of the portfolio.
///
/// `entity_caps` tightens the shared entity cap for individual entities; an
/// override above `max_entity_exposure` has no effect.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExposureLimits {
    /// Largest fraction of lineups any entity may appear in
    pub max_entity_exposure: f64,
    /// Largest fraction of lineups any group may appear in
    pub max_group_exposure: f64,
    /// Per-entity caps
    pub entity_caps: BTreeMap<EntityId, f64>,
}

impl Default for ExposureLimits {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

impl ExposureLimits {
    /// Create limits with no per-entity caps.
    pub fn new(max_entity_exposure: f64, max_group_exposure: f64) -> Self {
        Self {
            max_entity_exposure,
            max_group_exposure,
            entity_caps: BTreeMap::new(),
        }
    }

    /// Cap a single entity.
    pub fn with_entity_cap(mut self, id: impl Into<EntityId>, cap: f64) -> Self {
        self.entity_caps.insert(id.into(), cap);
        self
    }

    /// Effective cap for `id`.
    pub fn entity_cap(&self, id: &EntityId) -> f64 {
        self.entity_caps
            .get(id)
            .map_or(self.max_entity_exposure, |&cap| cap.min(self.max_entity_exposure))
    }
}

/// Summary of realized exposure.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ExposureMetrics {
    /// Fraction of lineups each tracked entity appears in
    pub fractions: BTreeMap<EntityId, f64>,
    /// Largest entity fraction
    pub max_exposure: f64,
    /// Entity holding the largest fraction (lowest id on ties)
    pub max_holder: Option<EntityId>,
    /// Mean fraction across tracked entities
    pub mean_exposure: f64,
}

/// A realized fraction above its cap.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum ExposureViolation {
    /// Entity over its cap.
    Entity {
        /// Entity id
        id: EntityId,
        /// Realized fraction
        fraction: f64,
        /// Configured cap
        cap: f64,
    },
    /// Group over its cap.
    Group {
        /// Group id
        id: GroupId,
        /// Realized fraction
        fraction: f64,
        /// Configured cap
        cap: f64,
    },
}

impl fmt::Display for ExposureViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity { id, fraction, cap } => {
                write!(f, "Entity {} exposure {:.3} exceeds cap {:.3}", id, fraction, cap)
            }
            Self::Group { id, fraction, cap } => {
                write!(f, "Group {} exposure {:.3} exceeds cap {:.3}", id, fraction, cap)
            }
        }
    }
}

/// Variables forced to zero by [`ExposureBook::add_exposure_constraints`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ExclusionSummary {
    /// Entities excluded on their own count
    pub entities: BTreeSet<EntityId>,
    /// Groups whose members were all excluded
    pub groups: BTreeSet<GroupId>,
}

impl ExclusionSummary {
    /// True if nothing was excluded.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.groups.is_empty()
    }
}

/// Usage counts for one portfolio run.
///
/// A book is a value: [`update`](Self::update) returns a new book and leaves
/// the receiver untouched. A group counts once per lineup that selects at
/// least one of its members.
///
/// # Examples
///
/// ```
/// use lineup_core::{EntityId, GroupId, Lineup};
/// use lineup_optimiser::exposure::ExposureBook;
///
/// let lineup = Lineup::new(
///     vec![EntityId::new("a"), EntityId::new("b")],
///     vec![GroupId::new("red")],
///     20.0,
/// );
/// let empty = ExposureBook::new();
/// let book = empty.update(&lineup);
///
/// assert_eq!(empty.entity_count(&EntityId::new("a")), 0);
/// assert_eq!(book.entity_count(&EntityId::new("a")), 1);
/// assert_eq!(book.group_count(&GroupId::new("red")), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ExposureBook {
    entity_counts: BTreeMap<EntityId, u32>,
    group_counts: BTreeMap<GroupId, u32>,
    n_lineups: usize,
}

impl ExposureBook {
    /// Empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Book with `lineup` added.
    pub fn update(&self, lineup: &Lineup) -> Self {
        let mut next = self.clone();
        let unique: BTreeSet<&EntityId> = lineup.entity_ids().iter().collect();
        for id in unique {
            *next.entity_counts.entry(id.clone()).or_default() += 1;
        }
        for group in lineup.group_ids() {
            *next.group_counts.entry(group.clone()).or_default() += 1;
        }
        next.n_lineups += 1;
        next
    }

    /// Lineups recorded so far.
    pub fn n_lineups(&self) -> usize {
        self.n_lineups
    }

    /// Appearances of `id`.
    pub fn entity_count(&self, id: &EntityId) -> u32 {
        self.entity_counts.get(id).copied().unwrap_or(0)
    }

    /// Lineups touching `group`.
    pub fn group_count(&self, group: &GroupId) -> u32 {
        self.group_counts.get(group).copied().unwrap_or(0)
    }

    /// Counts per tracked entity.
    pub fn entity_counts(&self) -> &BTreeMap<EntityId, u32> {
        &self.entity_counts
    }

    /// Counts per tracked group.
    pub fn group_counts(&self) -> &BTreeMap<GroupId, u32> {
        &self.group_counts
    }

    /// Fraction of `n_lineups` each tracked entity appears in.
    ///
    /// With `n_lineups == 0` every fraction is zero.
    pub fn fractions(&self, n_lineups: usize) -> BTreeMap<EntityId, f64> {
        self.entity_counts
            .iter()
            .map(|(id, &count)| (id.clone(), fraction(count, n_lineups)))
            .collect()
    }

    /// Fraction, maximum and mean exposure over tracked entities.
    pub fn compute_metrics(&self, n_lineups: usize) -> ExposureMetrics {
        let fractions = self.fractions(n_lineups);
        let mut max_exposure = 0.0;
        let mut max_holder = None;
        for (id, &f) in &fractions {
            if max_holder.is_none() || f > max_exposure {
                max_exposure = f;
                max_holder = Some(id.clone());
            }
        }
        let mean_exposure = if fractions.is_empty() {
            0.0
        } else {
            fractions.values().sum::<f64>() / fractions.len() as f64
        };

        ExposureMetrics {
            fractions,
            max_exposure,
            max_holder,
            mean_exposure,
        }
    }

    /// Every entity and group whose realized fraction exceeds its cap.
    pub fn check_limits(&self, n_lineups: usize, limits: &ExposureLimits) -> Vec<ExposureViolation> {
        let mut violations = Vec::new();
        for (id, &count) in &self.entity_counts {
            let f = fraction(count, n_lineups);
            let cap = limits.entity_cap(id);
            if f > cap + EXPOSURE_TOL {
                violations.push(ExposureViolation::Entity {
                    id: id.clone(),
                    fraction: f,
                    cap,
                });
            }
        }
        for (id, &count) in &self.group_counts {
            let f = fraction(count, n_lineups);
            if f > limits.max_group_exposure + EXPOSURE_TOL {
                violations.push(ExposureViolation::Group {
                    id: id.clone(),
                    fraction: f,
                    cap: limits.max_group_exposure,
                });
            }
        }
        violations
    }

    /// Force to zero every variable whose next selection would breach a cap.
    ///
    /// An entity (or group) is excluded when either
    ///
    /// - its fraction over the lineups recorded so far is already at or
    ///   above its cap (only for caps below one, which a fraction can reach
    ///   without breaching), or
    /// - `(count + 1) / planned_lineups` would exceed its cap, so a portfolio
    ///   of `planned_lineups` built under these exclusions never ends above
    ///   the cap.
    ///
    /// An excluded group has all of its members fixed to zero.
    pub fn add_exposure_constraints(
        &self,
        model: &mut Model,
        candidates: &[Candidate],
        vars: &[VarId],
        planned_lineups: usize,
        limits: &ExposureLimits,
    ) -> Result<ExclusionSummary, SolverError> {
        if candidates.len() != vars.len() {
            return Err(SolverError::invalid_model(format!(
                "{} candidates but {} selection variables",
                candidates.len(),
                vars.len()
            )));
        }
        if planned_lineups == 0 {
            return Err(SolverError::invalid_model(
                "planned portfolio size must be > 0",
            ));
        }

        let so_far = self.n_lineups as f64;
        let planned = planned_lineups as f64;
        let breaches = |count: u32, cap: f64| {
            let count = f64::from(count);
            let at_cap = cap < 1.0 && so_far > 0.0 && count >= cap * so_far - EXPOSURE_TOL;
            let over_plan = count + 1.0 > cap * planned + EXPOSURE_TOL;
            at_cap || over_plan
        };

        let mut summary = ExclusionSummary::default();
        for c in candidates {
            if breaches(self.group_count(&c.group), limits.max_group_exposure) {
                summary.groups.insert(c.group.clone());
            }
        }
        for (c, &var) in candidates.iter().zip(vars) {
            let group_blocked = summary.groups.contains(&c.group);
            let entity_blocked = breaches(self.entity_count(&c.id), limits.entity_cap(&c.id));
            if entity_blocked {
                summary.entities.insert(c.id.clone());
            }
            if entity_blocked || group_blocked {
                model.fix_to_zero(var)?;
            }
        }
        Ok(summary)
    }

    /// Entity fractions of the book, for attaching to an emitted lineup.
    pub fn snapshot(&self) -> BTreeMap<EntityId, f64> {
        self.fractions(self.n_lineups)
    }
}

fn fraction(count: u32, n_lineups: usize) -> f64 {
    if n_lineups == 0 {
        0.0
    } else {
        f64::from(count) / n_lineups as f64
    }
}
