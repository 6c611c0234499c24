//! Selectable candidate records.

use super::ids::{EntityId, GroupId};
use serde::{Deserialize, Serialize};

/// A candidate entity available for selection.
///
/// Carries the fields the optimiser needs (cost and group) plus the
/// human-readable name used when exporting lineups. The display name is
/// optional because attribute stores do not always supply one; export
/// refuses to proceed when a selected candidate lacks it.
///
/// # Examples
///
/// ```
/// use lineup_core::types::Candidate;
///
/// let c = Candidate::new("E1", 9_500.0, "team-a").with_display_name("Driver One");
/// assert_eq!(c.display_name(), Some("Driver One"));
/// assert_eq!(c.cost, 9_500.0);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Entity identifier
    pub id: EntityId,
    /// Salary / cost charged against the budget cap
    pub cost: f64,
    /// Group (team) membership used for stacking rules
    pub group: GroupId,
    /// Human-readable name for exports
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Candidate {
    /// Create a candidate without a display name.
    pub fn new(id: impl Into<EntityId>, cost: f64, group: impl Into<GroupId>) -> Self {
        Self {
            id: id.into(),
            cost,
            group: group.into(),
            display_name: None,
        }
    }

    /// Attach a display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Display name, if a non-blank one is present.
    pub fn display_name(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
    }
}
