//! Author and client identities.
//!
//! An [`Identity`] is an Ed25519 public key. It is the only thing the
//! verification engine knows about a party: license authors, delegated
//! clients and trusted roots are all identities.

use crate::error::{CryptoError, CryptoResult};
use crate::signature::Signature;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Size of a public key in bytes.
pub const IDENTITY_SIZE: usize = 32;

/// Size of a private key seed in bytes.
pub const SEED_SIZE: usize = 32;

/// An Ed25519 public key identifying a license author or client.
///
/// Ordering is plain byte comparison of the encoded key, which is what the
/// canonical encoder uses to sort client sets.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity {
    bytes: [u8; IDENTITY_SIZE],
}

impl Identity {
    /// Creates an identity from exactly 32 key bytes.
    ///
    /// Fails with [`CryptoError::InvalidKey`] if the bytes do not decode to
    /// a curve point.
    pub fn from_bytes(bytes: &[u8; IDENTITY_SIZE]) -> CryptoResult<Self> {
        VerifyingKey::from_bytes(bytes).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(Self { bytes: *bytes })
    }

    /// Creates an identity from a slice, rejecting any width other than 32.
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let arr: [u8; IDENTITY_SIZE] =
            bytes.try_into().map_err(|_| CryptoError::MalformedKey {
                expected: IDENTITY_SIZE,
                actual: bytes.len(),
            })?;
        Self::from_bytes(&arr)
    }

    /// Parses the standard base64 text form.
    pub fn from_base64(text: &str) -> CryptoResult<Self> {
        let bytes = BASE64
            .decode(text.trim())
            .map_err(|e| CryptoError::InvalidEncoding(format!("identity base64: {e}")))?;
        Self::from_slice(&bytes)
    }

    /// Returns the raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; IDENTITY_SIZE] {
        &self.bytes
    }

    /// Returns the standard base64 text form.
    #[must_use]
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.bytes)
    }

    /// Short hex prefix for log lines.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        hex::encode(&self.bytes[..8])
    }

    pub(crate) fn verifying_key(&self) -> Option<VerifyingKey> {
        VerifyingKey::from_bytes(&self.bytes).ok()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Identity").field(&self.to_base64()).finish()
    }
}

impl FromStr for Identity {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base64(s)
    }
}

impl TryFrom<String> for Identity {
    type Error = CryptoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_base64(&value)
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.to_base64()
    }
}

/// An Ed25519 signing key together with its public [`Identity`].
///
/// The private half is zeroized on drop by `ed25519-dalek`.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
    identity: Identity,
}

impl Keypair {
    /// Generates a fresh random keypair.
    #[must_use]
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::generate(&mut OsRng))
    }

    /// Derives a keypair deterministically from a 32-byte seed.
    #[must_use]
    pub fn from_seed(seed: &[u8; SEED_SIZE]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(seed))
    }

    /// Derives a keypair from a seed slice, rejecting any width other than 32.
    pub fn from_seed_slice(seed: &[u8]) -> CryptoResult<Self> {
        let arr: [u8; SEED_SIZE] = seed.try_into().map_err(|_| CryptoError::MalformedKey {
            expected: SEED_SIZE,
            actual: seed.len(),
        })?;
        Ok(Self::from_seed(&arr))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let identity = Identity {
            bytes: signing_key.verifying_key().to_bytes(),
        };
        Self {
            signing_key,
            identity,
        }
    }

    /// Returns the public identity of this keypair.
    #[must_use]
    pub fn identity(&self) -> Identity {
        self.identity
    }

    /// Signs a message. See [`crate::sign`].
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> Signature {
        crate::signature::sign(self, message)
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("identity", &self.identity)
            .field("signing_key", &"[REDACTED]")
            .finish()
    }
}
