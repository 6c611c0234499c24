//! Constraint specification error types.

use crate::store::StoreError;
use lineup_core::{EntityId, GroupId};
use thiserror::Error;

/// Errors raised while compiling, hashing or loading a constraint spec.
///
/// Missing records always name every missing id; a partial spec is never
/// returned.
///
/// # Examples
///
/// ```
/// use lineup_spec::SpecError;
/// use lineup_core::EntityId;
///
/// let err = SpecError::MissingEntities(vec![EntityId::new("E4"), EntityId::new("E9")]);
/// assert_eq!(format!("{}", err), "Entities missing from attribute store: E4, E9");
/// ```
#[derive(Error, Debug)]
pub enum SpecError {
    /// Requested entities absent from the batch fetch.
    #[error("Entities missing from attribute store: {}", join_ids(.0))]
    MissingEntities(Vec<EntityId>),

    /// Requested groups absent from the batch fetch.
    #[error("Groups missing from attribute store: {}", join_ids(.0))]
    MissingGroups(Vec<GroupId>),

    /// Attribute store failure.
    #[error("Attribute store error: {0}")]
    Store(#[from] StoreError),

    /// Record carries values the spec cannot hold.
    #[error("Invalid record {id}: {reason}")]
    InvalidRecord {
        /// Offending entity or group id
        id: String,
        /// What is wrong with it
        reason: String,
    },

    /// Content hash is not a 64-character lowercase hex digest.
    #[error("Malformed content hash '{hash}': {reason}")]
    MalformedHash {
        /// The rejected hash
        hash: String,
        /// What is wrong with it
        reason: String,
    },

    /// Stored hash does not match the recomputed digest.
    #[error("Content hash mismatch: stored {stored}, computed {computed}")]
    HashMismatch {
        /// Hash found in the document
        stored: String,
        /// Hash recomputed from the document content
        computed: String,
    },

    /// JSON encoding or decoding failure.
    #[error("Serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),

    /// File system failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// General invalid input error.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SpecError {
    /// Create an invalid record error.
    pub fn invalid_record(id: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a malformed hash error.
    pub fn malformed_hash(hash: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedHash {
            hash: hash.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Check if this is a missing-records error.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::MissingEntities(_) | Self::MissingGroups(_))
    }

    /// Check if this is a hash format or integrity error.
    pub fn is_hash_error(&self) -> bool {
        matches!(self, Self::MalformedHash { .. } | Self::HashMismatch { .. })
    }
}

fn join_ids<T: std::fmt::Display>(ids: &[T]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
