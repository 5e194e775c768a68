//! Content digests used to address license documents.

use crate::error::{CryptoError, CryptoResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use subtle::ConstantTimeEq;

/// Size of a digest in bytes.
pub const DIGEST_SIZE: usize = 32;

/// SHA-256 of a document's canonical encoding.
///
/// Equality is evaluated in constant time.
#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentDigest {
    bytes: [u8; DIGEST_SIZE],
}

impl ContentDigest {
    /// Hashes the given bytes.
    #[must_use]
    pub fn of(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        let mut bytes = [0u8; DIGEST_SIZE];
        bytes.copy_from_slice(&hash);
        Self { bytes }
    }

    /// Wraps raw digest bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self { bytes }
    }

    /// Parses the lowercase hex text form.
    pub fn from_hex(text: &str) -> CryptoResult<Self> {
        let raw = hex::decode(text.trim())
            .map_err(|e| CryptoError::InvalidEncoding(format!("digest hex: {e}")))?;
        let bytes: [u8; DIGEST_SIZE] = raw.as_slice().try_into().map_err(|_| {
            CryptoError::InvalidEncoding(format!(
                "digest must be {DIGEST_SIZE} bytes, got {}",
                raw.len()
            ))
        })?;
        Ok(Self { bytes })
    }

    /// Returns the raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.bytes
    }

    /// Returns the lowercase hex text form.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl PartialEq for ContentDigest {
    fn eq(&self, other: &Self) -> bool {
        self.bytes.ct_eq(&other.bytes).into()
    }
}

impl Eq for ContentDigest {}

impl Hash for ContentDigest {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContentDigest").field(&self.to_hex()).finish()
    }
}

impl FromStr for ContentDigest {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for ContentDigest {
    type Error = CryptoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<ContentDigest> for String {
    fn from(digest: ContentDigest) -> Self {
        digest.to_hex()
    }
}
