//! Forbidden causal relationships.

use serde::{Deserialize, Serialize};

/// A forbidden edge between two causal-graph nodes.
///
/// Veto rules are consumed by structure-learning collaborators; the core only
/// validates them through the same rejection accounting used for scenario
/// conservation checks.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VetoRule {
    /// Node the forbidden edge starts at
    pub source: String,
    /// Node the forbidden edge points to
    pub target: String,
    /// Why the edge is forbidden
    pub reason: String,
}

impl VetoRule {
    /// Create a new veto rule.
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// True when the rule points a node at itself.
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}
