//! Signing identities, Ed25519 signatures and content digests for licensechain.
//!
//! Every license in a chain is signed by its author's [`Keypair`] and checked
//! against the author's [`Identity`]. Documents are addressed by the
//! [`ContentDigest`] of their canonical encoding.
//!
//! Widths are fixed: identities are 32 bytes, signatures 64 bytes, digests
//! 32 bytes. Inputs of any other width are rejected, never padded.

mod digest;
mod error;
mod identity;
mod signature;

pub use digest::{ContentDigest, DIGEST_SIZE};
pub use error::{CryptoError, CryptoResult};
pub use identity::{Identity, Keypair, IDENTITY_SIZE, SEED_SIZE};
pub use signature::{sign, verify, Signature, SIGNATURE_CONTEXT, SIGNATURE_SIZE};
