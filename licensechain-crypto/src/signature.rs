//! Ed25519 signing and verification.
//!
//! Every signed message is prefixed with [`SIGNATURE_CONTEXT`] so that a
//! license signature can never be replayed as a signature for some other
//! protocol that happens to use the same author key.

use crate::error::{CryptoError, CryptoResult};
use crate::identity::{Identity, Keypair};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use ed25519_dalek::{Signature as DalekSignature, Signer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Size of a signature in bytes.
pub const SIGNATURE_SIZE: usize = 64;

/// Domain-separation prefix for all license signatures.
pub const SIGNATURE_CONTEXT: &[u8] = b"licensechain-v1\0";

/// A detached Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Signature {
    bytes: [u8; SIGNATURE_SIZE],
}

impl Signature {
    /// Creates a signature from exactly 64 bytes.
    #[must_use]
    pub fn from_bytes(bytes: &[u8; SIGNATURE_SIZE]) -> Self {
        Self { bytes: *bytes }
    }

    /// Creates a signature from a slice, rejecting any width other than 64.
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let arr: [u8; SIGNATURE_SIZE] =
            bytes
                .try_into()
                .map_err(|_| CryptoError::MalformedSignature {
                    expected: SIGNATURE_SIZE,
                    actual: bytes.len(),
                })?;
        Ok(Self { bytes: arr })
    }

    /// Parses the standard base64 text form.
    pub fn from_base64(text: &str) -> CryptoResult<Self> {
        let bytes = BASE64
            .decode(text.trim())
            .map_err(|e| CryptoError::InvalidEncoding(format!("signature base64: {e}")))?;
        Self::from_slice(&bytes)
    }

    /// Returns the raw signature bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_SIZE] {
        &self.bytes
    }

    /// Returns the standard base64 text form.
    #[must_use]
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.bytes)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Signature").field(&self.to_base64()).finish()
    }
}

impl FromStr for Signature {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base64(s)
    }
}

impl TryFrom<String> for Signature {
    type Error = CryptoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_base64(&value)
    }
}

impl From<Signature> for String {
    fn from(signature: Signature) -> Self {
        signature.to_base64()
    }
}

fn with_context(message: &[u8]) -> Vec<u8> {
    let mut prefixed = Vec::with_capacity(SIGNATURE_CONTEXT.len() + message.len());
    prefixed.extend_from_slice(SIGNATURE_CONTEXT);
    prefixed.extend_from_slice(message);
    prefixed
}

/// Signs `SIGNATURE_CONTEXT || message` with the keypair's private key.
#[must_use]
pub fn sign(keypair: &Keypair, message: &[u8]) -> Signature {
    let sig = keypair.signing_key().sign(&with_context(message));
    Signature {
        bytes: sig.to_bytes(),
    }
}

/// Verifies a signature produced by [`sign`].
///
/// Uses strict verification, which rejects small-order keys and
/// non-canonical signature encodings.
#[must_use]
pub fn verify(identity: &Identity, message: &[u8], signature: &Signature) -> bool {
    let Some(verifying_key) = identity.verifying_key() else {
        return false;
    };
    let sig = DalekSignature::from_bytes(&signature.bytes);
    verifying_key
        .verify_strict(&with_context(message), &sig)
        .is_ok()
}
