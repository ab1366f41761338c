//! Content fingerprints for step hash functions.
//!
//! A step that wants its rendered instance recreated whenever some input
//! changes can return [`fingerprint`] of that input from its hash function.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// SHA256 hex digest of a value's JSON encoding.
///
/// Values that fail to serialize (maps with non-string keys, for instance)
/// hash as an empty document.
pub fn fingerprint<T: Serialize + ?Sized>(value: &T) -> String {
    let bytes = serde_json::to_vec(value).unwrap_or_default();
    hash_bytes(&bytes)
}

/// SHA256 hex digest of a step id and a value, so equal props on
/// different steps still produce different keys
pub fn step_fingerprint<T: Serialize + ?Sized>(step_id: &str, value: &T) -> String {
    let mut hasher = Sha256::new();
    hasher.update(step_id.as_bytes());
    hasher.update([0u8]);
    hasher.update(serde_json::to_vec(value).unwrap_or_default());
    format!("{:x}", hasher.finalize())
}

fn hash_bytes(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}
