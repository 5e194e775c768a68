//! Error types for license parsing, chain resolution and verification.

use licensechain_crypto::{ContentDigest, CryptoError, Identity};
use thiserror::Error;

/// License-specific errors.
///
/// Each variant is a distinct, final verdict. Verification never maps one
/// kind onto another or retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LicenseError {
    /// Input is not a well-formed license document.
    #[error("invalid license document: {0}")]
    Parse(String),

    /// Signable fields could not be canonically encoded.
    #[error("canonical encoding failed: {0}")]
    Encoding(String),

    /// A key of the wrong width.
    #[error("malformed key: expected {expected} bytes, got {actual}")]
    MalformedKey { expected: usize, actual: usize },

    /// A signature of the wrong width.
    #[error("malformed signature: expected {expected} bytes, got {actual}")]
    MalformedSignature { expected: usize, actual: usize },

    /// Signature does not verify against the document's author.
    #[error("license signature invalid for author {author}")]
    Signature { author: Identity },

    /// Signing key does not belong to the document's author.
    #[error("signing key {signer} is not the license author {author}")]
    KeyMismatch { author: Identity, signer: Identity },

    /// The parent license does not list this author as a client.
    #[error("author {author} is not a client of parent license by {parent}")]
    Delegation { author: Identity, parent: Identity },

    /// A dependency reference leads back into the chain.
    #[error("dependency cycle at license {digest} by {author}")]
    Cycle {
        author: Identity,
        digest: ContentDigest,
    },

    /// The referenced parent license is not available.
    #[error("unresolved dependency on license {digest} by {author}")]
    UnresolvedDependency {
        author: Identity,
        digest: ContentDigest,
    },

    /// The chain ends at a root whose author is not trusted.
    #[error("root license author {author} is not trusted")]
    UntrustedRoot { author: Identity },

    /// The chain is deeper than the configured limit.
    #[error("license chain exceeds maximum depth of {max}")]
    ChainTooLong { max: usize },

    /// A child grant tries to widen what its parent granted.
    #[error("grant conflict at '{feature}': {reason}")]
    GrantConflict { feature: String, reason: String },

    /// A license's validity window does not overlap its parent's.
    #[error("validity of license by {author} does not overlap its parent by {parent}")]
    DisjointValidity { author: Identity, parent: Identity },

    /// A license in the chain has expired.
    #[error("license by {author} expired at {not_after}")]
    Expired { author: Identity, not_after: String },

    /// A license in the chain is not yet valid.
    #[error("license by {author} not valid before {not_before}")]
    NotYetValid { author: Identity, not_before: String },

    /// A license is bound to a different host.
    #[error("license bound to host '{expected}', running on {}", .actual.as_deref().unwrap_or("an unbound host"))]
    BindingMismatch {
        expected: String,
        actual: Option<String>,
    },

    /// A duration could not be parsed.
    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    /// The machine identifier could not be determined.
    #[error("machine id unavailable: {0}")]
    MachineId(String),

    /// Verifier configuration is invalid.
    #[error("invalid verifier config: {0}")]
    Config(String),
}

impl From<CryptoError> for LicenseError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::MalformedKey { expected, actual } => Self::MalformedKey { expected, actual },
            CryptoError::MalformedSignature { expected, actual } => {
                Self::MalformedSignature { expected, actual }
            }
            CryptoError::InvalidKey(msg) | CryptoError::InvalidEncoding(msg) => Self::Parse(msg),
        }
    }
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
