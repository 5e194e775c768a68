//! Error types for the signature layer.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur when decoding keys, signatures and digests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Public key or seed of the wrong width.
    #[error("malformed key: expected {expected} bytes, got {actual}")]
    MalformedKey { expected: usize, actual: usize },

    /// Signature of the wrong width.
    #[error("malformed signature: expected {expected} bytes, got {actual}")]
    MalformedSignature { expected: usize, actual: usize },

    /// Key bytes have the right width but are not a valid Ed25519 point.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Text form (base64 or hex) could not be decoded.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),
}
