//! Immutable, content-hashed constraint specification.

use crate::digest::{canonical_json_pretty, content_digest, validate_digest};
use crate::error::SpecError;
use lineup_core::{EntityId, GroupId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// Schema version written into every compiled spec.
pub const CONSTRAINT_SPEC_VERSION: &str = "1.0";

/// Per-entity attributes frozen for one run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityConstraints {
    /// Skill rating
    pub skill: f64,
    /// Aggression rating
    pub aggression: f64,
    /// Risk (incident) rating
    pub risk: f64,
    /// Lower bound on derived usage
    #[serde(default)]
    pub min_usage: f64,
    /// Upper bound on derived usage
    #[serde(default = "default_max_usage")]
    pub max_usage: f64,
    /// Identifiers of veto rules that reference this entity
    #[serde(default)]
    pub veto_rule_ids: Vec<String>,
}

fn default_max_usage() -> f64 {
    1.0
}

impl EntityConstraints {
    /// Create constraints with the full usage band and no veto rules.
    pub fn new(skill: f64, aggression: f64, risk: f64) -> Self {
        Self {
            skill,
            aggression,
            risk,
            min_usage: 0.0,
            max_usage: default_max_usage(),
            veto_rule_ids: Vec::new(),
        }
    }

    /// Set the derived-usage band.
    pub fn with_usage_bounds(mut self, min_usage: f64, max_usage: f64) -> Self {
        self.min_usage = min_usage;
        self.max_usage = max_usage;
        self
    }

    /// Attach veto rule identifiers.
    pub fn with_veto_rules<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.veto_rule_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    fn validate(&self, id: &EntityId) -> Result<(), SpecError> {
        let fields = [
            ("skill", self.skill),
            ("aggression", self.aggression),
            ("risk", self.risk),
            ("min_usage", self.min_usage),
            ("max_usage", self.max_usage),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(SpecError::invalid_record(
                id,
                format!("{} must be finite, got {}", name, value),
            ));
        }
        if self.min_usage > self.max_usage {
            return Err(SpecError::invalid_record(
                id,
                format!(
                    "min_usage {} exceeds max_usage {}",
                    self.min_usage, self.max_usage
                ),
            ));
        }
        Ok(())
    }
}

/// Per-group attributes frozen for one run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupConstraints {
    /// Difficulty rating
    pub difficulty: f64,
    /// Group-level multiplier
    pub factor: f64,
    /// Rate of neutralising events (cautions)
    pub caution_rate: f64,
    /// Ordered checkpoint markers
    #[serde(default)]
    pub checkpoints: Vec<u32>,
}

impl GroupConstraints {
    /// Create constraints with no checkpoints.
    pub fn new(difficulty: f64, factor: f64, caution_rate: f64) -> Self {
        Self {
            difficulty,
            factor,
            caution_rate,
            checkpoints: Vec::new(),
        }
    }

    /// Attach checkpoint markers.
    pub fn with_checkpoints(mut self, checkpoints: Vec<u32>) -> Self {
        self.checkpoints = checkpoints;
        self
    }

    fn validate(&self, id: &GroupId) -> Result<(), SpecError> {
        let fields = [
            ("difficulty", self.difficulty),
            ("factor", self.factor),
            ("caution_rate", self.caution_rate),
        ];
        match fields.iter().find(|(_, v)| !v.is_finite()) {
            Some((name, value)) => Err(SpecError::invalid_record(
                id,
                format!("{} must be finite, got {}", name, value),
            )),
            None => Ok(()),
        }
    }
}

/// Hashed content of a spec.
#[derive(Serialize)]
struct SpecContent<'a> {
    slate_id: &'a str,
    version: &'a str,
    entities: &'a BTreeMap<EntityId, EntityConstraints>,
    groups: &'a BTreeMap<GroupId, GroupConstraints>,
}

/// On-disk form of a spec.
#[derive(Serialize, Deserialize)]
struct SpecDocument {
    slate_id: String,
    version: String,
    entities: BTreeMap<EntityId, EntityConstraints>,
    groups: BTreeMap<GroupId, GroupConstraints>,
    content_hash: String,
}

/// Immutable constraint specification for one slate.
///
/// Fields are private and there are no setters. The content hash is computed
/// once at construction from the canonical JSON of `slate_id`, `version` and
/// every entity and group record, so two specs built from the same content in
/// any order compare and hash identically.
///
/// # Examples
///
/// ```
/// use lineup_spec::{ConstraintSpec, EntityConstraints};
/// use lineup_core::EntityId;
/// use std::collections::BTreeMap;
///
/// let mut entities = BTreeMap::new();
/// entities.insert(EntityId::new("E1"), EntityConstraints::new(0.9, 0.3, 0.1));
///
/// let spec = ConstraintSpec::new("slate-7", entities, BTreeMap::new()).unwrap();
/// let restored = ConstraintSpec::from_json(&spec.to_json().unwrap()).unwrap();
/// assert_eq!(spec, restored);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ConstraintSpec {
    slate_id: String,
    version: String,
    entities: BTreeMap<EntityId, EntityConstraints>,
    groups: BTreeMap<GroupId, GroupConstraints>,
    content_hash: String,
}

impl ConstraintSpec {
    /// Build a spec at the current schema version.
    ///
    /// # Errors
    ///
    /// `SpecError::InvalidRecord` for non-finite values or inverted usage
    /// bounds, `SpecError::InvalidInput` for an empty slate id.
    pub fn new(
        slate_id: impl Into<String>,
        entities: BTreeMap<EntityId, EntityConstraints>,
        groups: BTreeMap<GroupId, GroupConstraints>,
    ) -> Result<Self, SpecError> {
        Self::build(
            slate_id.into(),
            CONSTRAINT_SPEC_VERSION.to_string(),
            entities,
            groups,
        )
    }

    fn build(
        slate_id: String,
        version: String,
        entities: BTreeMap<EntityId, EntityConstraints>,
        groups: BTreeMap<GroupId, GroupConstraints>,
    ) -> Result<Self, SpecError> {
        if slate_id.trim().is_empty() {
            return Err(SpecError::invalid_input("slate_id must not be empty"));
        }
        for (id, constraints) in &entities {
            constraints.validate(id)?;
        }
        for (id, constraints) in &groups {
            constraints.validate(id)?;
        }

        let content_hash = content_digest(&SpecContent {
            slate_id: &slate_id,
            version: &version,
            entities: &entities,
            groups: &groups,
        })?;

        Ok(Self {
            slate_id,
            version,
            entities,
            groups,
            content_hash,
        })
    }

    /// Slate identifier.
    pub fn slate_id(&self) -> &str {
        &self.slate_id
    }

    /// Schema version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// 64-character hex SHA-256 of the canonical content.
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// All entity records, ordered by id.
    pub fn entities(&self) -> &BTreeMap<EntityId, EntityConstraints> {
        &self.entities
    }

    /// All group records, ordered by id.
    pub fn groups(&self) -> &BTreeMap<GroupId, GroupConstraints> {
        &self.groups
    }

    /// Look up one entity.
    pub fn entity(&self, id: &EntityId) -> Option<&EntityConstraints> {
        self.entities.get(id)
    }

    /// Look up one group.
    pub fn group(&self, id: &GroupId) -> Option<&GroupConstraints> {
        self.groups.get(id)
    }

    /// Number of entity records.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Number of group records.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    fn to_document(&self) -> SpecDocument {
        SpecDocument {
            slate_id: self.slate_id.clone(),
            version: self.version.clone(),
            entities: self.entities.clone(),
            groups: self.groups.clone(),
            content_hash: self.content_hash.clone(),
        }
    }

    /// Serialise to pretty, sorted-key JSON including the content hash.
    pub fn to_json(&self) -> Result<String, SpecError> {
        canonical_json_pretty(&self.to_document())
    }

    /// Reconstruct a spec from JSON, verifying the stored hash.
    ///
    /// # Errors
    ///
    /// - `SpecError::MalformedHash` if the hash is not 64 lowercase hex characters
    /// - `SpecError::HashMismatch` if the content does not hash to the stored value
    pub fn from_json(json: &str) -> Result<Self, SpecError> {
        let doc: SpecDocument = serde_json::from_str(json)?;
        validate_digest(&doc.content_hash)?;

        let spec = Self::build(doc.slate_id, doc.version, doc.entities, doc.groups)?;
        if spec.content_hash != doc.content_hash {
            return Err(SpecError::HashMismatch {
                stored: doc.content_hash,
                computed: spec.content_hash,
            });
        }
        Ok(spec)
    }

    /// Write the spec to `path` as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SpecError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load and verify a spec from `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SpecError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

// Every field is finite (checked at construction), so equality is total.
impl Eq for ConstraintSpec {}

impl Hash for ConstraintSpec {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.content_hash.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn entities() -> BTreeMap<EntityId, EntityConstraints> {
        let mut map = BTreeMap::new();
        map.insert(EntityId::new("E1"), EntityConstraints::new(0.9, 0.4, 0.1));
        map.insert(
            EntityId::new("E2"),
            EntityConstraints::new(0.7, 0.6, 0.3)
                .with_usage_bounds(0.1, 0.5)
                .with_veto_rules(["V1"]),
        );
        map
    }

    fn groups() -> BTreeMap<GroupId, GroupConstraints> {
        let mut map = BTreeMap::new();
        map.insert(
            GroupId::new("G1"),
            GroupConstraints::new(1.1, 0.95, 0.04).with_checkpoints(vec![60, 120, 200]),
        );
        map
    }

    // ========================================
    // Construction Tests
    // ========================================

    #[test]
    fn test_new_sets_version_and_hash() {
        let spec = ConstraintSpec::new("slate", entities(), groups()).unwrap();
        assert_eq!(spec.version(), CONSTRAINT_SPEC_VERSION);
        assert_eq!(spec.content_hash().len(), 64);
        assert_eq!(spec.entity_count(), 2);
        assert_eq!(spec.group_count(), 1);
        assert!(spec.entity(&EntityId::new("E2")).is_some());
        assert!(spec.group(&GroupId::new("G9")).is_none());
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut bad = entities();
        bad.insert(EntityId::new("E3"), EntityConstraints::new(f64::NAN, 0.0, 0.0));
        let err = ConstraintSpec::new("slate", bad, groups()).unwrap_err();
        assert!(err.to_string().contains("E3"));
        assert!(err.to_string().contains("skill"));
    }

    #[test]
    fn test_inverted_usage_rejected() {
        let mut bad = entities();
        bad.insert(
            EntityId::new("E3"),
            EntityConstraints::new(0.5, 0.5, 0.5).with_usage_bounds(0.8, 0.2),
        );
        assert!(matches!(
            ConstraintSpec::new("slate", bad, groups()),
            Err(SpecError::InvalidRecord { .. })
        ));
    }

    #[test]
    fn test_empty_slate_rejected() {
        assert!(ConstraintSpec::new("  ", entities(), groups()).is_err());
    }

    // ========================================
    // Hashing Tests
    // ========================================

    #[test]
    fn test_hash_independent_of_insertion_order() {
        let mut reversed = BTreeMap::new();
        for (k, v) in entities().into_iter().rev() {
            reversed.insert(k, v);
        }
        let a = ConstraintSpec::new("slate", entities(), groups()).unwrap();
        let b = ConstraintSpec::new("slate", reversed, groups()).unwrap();
        assert_eq!(a.content_hash(), b.content_hash());
        assert_eq!(a, b);

        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_hash_sensitive_to_content() {
        let a = ConstraintSpec::new("slate", entities(), groups()).unwrap();
        let b = ConstraintSpec::new("other-slate", entities(), groups()).unwrap();
        let mut changed = entities();
        changed.insert(EntityId::new("E1"), EntityConstraints::new(0.91, 0.4, 0.1));
        let c = ConstraintSpec::new("slate", changed, groups()).unwrap();
        assert_ne!(a.content_hash(), b.content_hash());
        assert_ne!(a.content_hash(), c.content_hash());
    }

    // ========================================
    // Persistence Tests
    // ========================================

    #[test]
    fn test_json_contains_sorted_keys() {
        let spec = ConstraintSpec::new("slate", entities(), groups()).unwrap();
        let json = spec.to_json().unwrap();
        let content = json.find("\"content_hash\"").unwrap();
        let entities = json.find("\"entities\"").unwrap();
        let version = json.find("\"version\"").unwrap();
        assert!(content < entities && entities < version);
    }

    #[test]
    fn test_truncated_hash_fails_loudly() {
        let spec = ConstraintSpec::new("slate", entities(), groups()).unwrap();
        let json = spec.to_json().unwrap();
        let truncated = json.replace(spec.content_hash(), &spec.content_hash()[..40]);
        let err = ConstraintSpec::from_json(&truncated).unwrap_err();
        assert!(matches!(err, SpecError::MalformedHash { .. }));
    }

    #[test]
    fn test_tampered_content_detected() {
        let spec = ConstraintSpec::new("slate", entities(), groups()).unwrap();
        let json = spec.to_json().unwrap().replace("\"slate\"", "\"slate-x\"");
        let err = ConstraintSpec::from_json(&json).unwrap_err();
        assert!(matches!(err, SpecError::HashMismatch { .. }));
    }
}
