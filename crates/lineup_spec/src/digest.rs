//! Canonical JSON and SHA-256 content digests.
//!
//! Canonical form is `serde_json::Value` rendered compactly. `Value` objects
//! are backed by a sorted map, so keys come out in lexicographic order no
//! matter how the source value was built.

use crate::error::SpecError;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Length of a hex-encoded SHA-256 digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// Serialise `value` as compact JSON with sorted keys.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, SpecError> {
    let value = serde_json::to_value(value)?;
    Ok(serde_json::to_string(&value)?)
}

/// Serialise `value` as indented JSON with sorted keys.
pub fn canonical_json_pretty<T: Serialize>(value: &T) -> Result<String, SpecError> {
    let value = serde_json::to_value(value)?;
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Hex-encoded SHA-256 of the canonical JSON form of `value`.
///
/// # Examples
///
/// ```
/// use lineup_spec::digest::content_digest;
/// use std::collections::HashMap;
///
/// let mut a = HashMap::new();
/// a.insert("x", 1);
/// a.insert("y", 2);
/// let mut b = HashMap::new();
/// b.insert("y", 2);
/// b.insert("x", 1);
///
/// assert_eq!(content_digest(&a).unwrap(), content_digest(&b).unwrap());
/// ```
pub fn content_digest<T: Serialize>(value: &T) -> Result<String, SpecError> {
    let canonical = canonical_json(value)?;
    Ok(hex::encode(Sha256::digest(canonical.as_bytes())))
}

/// Check that `hash` looks like a hex-encoded SHA-256 digest.
///
/// # Errors
///
/// `SpecError::MalformedHash` when the length is not 64 or a character is
/// not lowercase hex.
pub fn validate_digest(hash: &str) -> Result<(), SpecError> {
    if hash.len() != DIGEST_HEX_LEN {
        return Err(SpecError::malformed_hash(
            hash,
            format!("expected {} characters, got {}", DIGEST_HEX_LEN, hash.len()),
        ));
    }
    if let Some(bad) = hash
        .chars()
        .find(|c| !matches!(c, '0'..='9' | 'a'..='f'))
    {
        return Err(SpecError::malformed_hash(
            hash,
            format!("invalid character '{}'", bad),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_json_sorts_keys() {
        let value = json!({"b": 1, "a": {"d": 2, "c": 3}});
        assert_eq!(canonical_json(&value).unwrap(), r#"{"a":{"c":3,"d":2},"b":1}"#);
    }

    #[test]
    fn test_digest_is_64_hex() {
        let digest = content_digest(&json!({"k": "v"})).unwrap();
        assert_eq!(digest.len(), DIGEST_HEX_LEN);
        assert!(validate_digest(&digest).is_ok());
    }

    #[test]
    fn test_digest_changes_with_content() {
        let a = content_digest(&json!({"k": 1.0})).unwrap();
        let b = content_digest(&json!({"k": 1.5})).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_validate_rejects_truncated() {
        let digest = content_digest(&json!([1, 2, 3])).unwrap();
        let err = validate_digest(&digest[..63]).unwrap_err();
        assert!(err.is_hash_error());
        assert!(err.to_string().contains("got 63"));
    }

    #[test]
    fn test_validate_rejects_non_hex() {
        let bad = "g".repeat(DIGEST_HEX_LEN);
        assert!(validate_digest(&bad).is_err());
        let upper = "A".repeat(DIGEST_HEX_LEN);
        assert!(validate_digest(&upper).is_err());
    }
}
