//! Outcome types for counted validations.

use std::fmt;

/// Reason a candidate state or rule was vetoed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VetoReason {
    /// Summed leading counts exceed the race length.
    LeadingExceedsRaceLength {
        /// Sum of per-entity leading counts
        total: u64,
        /// Declared race length
        race_length: u64,
    },
    /// Summed fastest counts exceed the green-flag total.
    FastestExceedsGreenFlag {
        /// Sum of per-entity fastest counts
        total: u64,
        /// Declared green-flag total
        green_flag_laps: u64,
    },
    /// Veto rule points a node at itself.
    SelfLoop {
        /// The node
        node: String,
    },
    /// Veto rule references a node that does not exist.
    UnknownNode {
        /// The missing node
        node: String,
    },
    /// Veto rule carries no justification.
    MissingReason,
}

impl VetoReason {
    /// Stable key used for histogram bucketing.
    pub fn code(&self) -> &'static str {
        match self {
            Self::LeadingExceedsRaceLength { .. } => "leading_exceeds_race_length",
            Self::FastestExceedsGreenFlag { .. } => "fastest_exceeds_green_flag",
            Self::SelfLoop { .. } => "self_loop",
            Self::UnknownNode { .. } => "unknown_node",
            Self::MissingReason => "missing_reason",
        }
    }
}

impl fmt::Display for VetoReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LeadingExceedsRaceLength { total, race_length } => write!(
                f,
                "laps led sum to {} but race length is {}",
                total, race_length
            ),
            Self::FastestExceedsGreenFlag {
                total,
                green_flag_laps,
            } => write!(
                f,
                "fastest laps sum to {} but only {} green-flag laps were run",
                total, green_flag_laps
            ),
            Self::SelfLoop { node } => write!(f, "veto rule points {} at itself", node),
            Self::UnknownNode { node } => write!(f, "veto rule references unknown node {}", node),
            Self::MissingReason => write!(f, "veto rule has no reason"),
        }
    }
}

/// Result of a counted validation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationResult {
    /// True when no veto reason was raised
    pub is_valid: bool,
    /// Every reason the input was vetoed
    pub veto_reasons: Vec<VetoReason>,
}

impl ValidationResult {
    /// Build a result from the collected reasons.
    pub fn from_reasons(veto_reasons: Vec<VetoReason>) -> Self {
        Self {
            is_valid: veto_reasons.is_empty(),
            veto_reasons,
        }
    }

    /// Human-readable messages, one per reason.
    pub fn messages(&self) -> Vec<String> {
        self.veto_reasons.iter().map(ToString::to_string).collect()
    }
}
