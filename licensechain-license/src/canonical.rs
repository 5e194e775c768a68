//! Canonical encoding of signable license fields.
//!
//! The canonical form is RFC 8785 (JCS) JSON: object keys sorted by UTF-16
//! code units, compact separators, and deterministic number and string
//! escapes. On top of JCS this module enforces:
//!
//! - no floating-point numbers anywhere in the value tree;
//! - set-valued fields are serialized by the caller already sorted
//!   (client identities are kept in a `BTreeSet`, ordered by key bytes);
//! - optional fields are omitted when absent and always present when set, so
//!   an absent field never encodes like an empty one.
//!
//! [`CanonicalBytes`] can only be built through [`CanonicalBytes::new`], so
//! every signature and every digest goes through the same pipeline.

use crate::error::{LicenseError, LicenseResult};
use licensechain_crypto::ContentDigest;
use serde::Serialize;
use serde_json::Value;

/// Bytes produced by the canonical encoder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonically encodes any serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Encoding`] if the value contains a float or
    /// cannot be represented as JSON.
    pub fn new(obj: &impl Serialize) -> LicenseResult<Self> {
        let value = serde_json::to_value(obj)
            .map_err(|e| LicenseError::Encoding(format!("serialization failed: {e}")))?;
        reject_floats(&value, "$")?;
        let text = serde_jcs::to_string(&value)
            .map_err(|e| LicenseError::Encoding(format!("JCS serialization failed: {e}")))?;
        Ok(Self(text.into_bytes()))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// SHA-256 content digest of these bytes.
    #[must_use]
    pub fn digest(&self) -> ContentDigest {
        ContentDigest::of(&self.0)
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn reject_floats(value: &Value, path: &str) -> LicenseResult<()> {
    match value {
        Value::Number(n) if !n.is_i64() && !n.is_u64() => Err(LicenseError::Encoding(format!(
            "floating-point value {n} at {path} has no canonical form"
        ))),
        Value::Object(map) => map
            .iter()
            .try_for_each(|(k, v)| reject_floats(v, &format!("{path}.{k}"))),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .try_for_each(|(i, v)| reject_floats(v, &format!("{path}[{i}]"))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_keys_and_compacts() {
        let data = serde_json::json!({"b": 2, "a": 1, "c": {"z": true, "m": "*"}});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(
            std::str::from_utf8(cb.as_bytes()).unwrap(),
            r#"{"a":1,"b":2,"c":{"m":"*","z":true}}"#
        );
    }

    #[test]
    fn preserves_array_order() {
        let data = serde_json::json!({"clients": ["b", "a"]});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(cb.as_bytes(), br#"{"clients":["b","a"]}"#);
    }

    #[test]
    fn rejects_nested_float() {
        let data = serde_json::json!({"grant": {"rate": 1.5}});
        match CanonicalBytes::new(&data) {
            Err(LicenseError::Encoding(msg)) => assert!(msg.contains("$.grant.rate")),
            other => panic!("expected encoding error, got {other:?}"),
        }
    }

    #[test]
    fn digest_is_sha256_of_bytes() {
        let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        assert_eq!(cb.digest(), ContentDigest::of(b"{}"));
    }
}
