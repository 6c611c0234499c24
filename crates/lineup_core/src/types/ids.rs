//! Identifier types for candidate entities and their groups.
//!
//! Newtypes keep entity ids and group ids from being swapped by accident;
//! both order lexicographically so they can key sorted maps.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a selectable entity.
///
/// # Examples
///
/// ```
/// use lineup_core::types::EntityId;
///
/// let id = EntityId::new("driver-11");
/// assert_eq!(id.as_str(), "driver-11");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Creates a new entity ID.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Unique identifier for a group (team) of entities.
///
/// # Examples
///
/// ```
/// use lineup_core::types::GroupId;
///
/// let id = GroupId::new("team-a");
/// assert_eq!(id.to_string(), "team-a");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    /// Creates a new group ID.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for GroupId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_entity_id_roundtrip_str() {
        let id = EntityId::from("E1");
        assert_eq!(id.as_str(), "E1");
        assert_eq!(format!("{}", id), "E1");
    }

    #[test]
    fn test_ids_order_lexicographically() {
        let set: BTreeSet<GroupId> = ["b", "a", "c"].into_iter().map(GroupId::from).collect();
        let ordered: Vec<&str> = set.iter().map(GroupId::as_str).collect();
        assert_eq!(ordered, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_group_id_from_string() {
        let id = GroupId::from(String::from("team-9"));
        assert_eq!(id, GroupId::new("team-9"));
    }
}
