//! Offline verification of delegated license chains.
//!
//! A license is a signed statement by an author granting features to a set
//! of client identities. A client may in turn issue a narrower license that
//! depends on the one it holds, forming a chain that ends at a root license
//! signed by a trusted authority.
//!
//! Verification takes a serialized leaf license and:
//! - resolves its chain through embedded parents or a [`LicenseSource`];
//! - checks every signature and every delegation step;
//! - checks validity windows against a caller-supplied clock;
//! - checks host bindings against a caller-supplied [`MachineId`] string;
//! - folds the grants root to leaf, each license only narrowing its parent.
//!
//! Nothing here performs network I/O, and verification itself touches no
//! files.
//!
//! # Example
//!
//! ```
//! use licensechain_crypto::Keypair;
//! use licensechain_license::{verify, Grant, LicenseDocument, LicensePool};
//! use std::collections::BTreeSet;
//!
//! let vendor = Keypair::from_seed(&[1; 32]);
//! let customer = Keypair::from_seed(&[2; 32]);
//!
//! let root = LicenseDocument::new(vendor.identity(), Grant::new().with("seats", 10u64))
//!     .with_client(customer.identity())
//!     .sign(&vendor)?;
//! let leaf = LicenseDocument::new(customer.identity(), Grant::new().with("seats", 5u64))
//!     .embedding(root)
//!     .sign(&customer)?;
//!
//! let roots = BTreeSet::from([vendor.identity()]);
//! let effective = verify(&leaf.to_bytes()?, &LicensePool::new(), &roots, chrono::Utc::now(), None)?;
//! assert_eq!(effective.number("seats"), Some(5));
//! # Ok::<(), licensechain_license::LicenseError>(())
//! ```

mod canonical;
mod chain;
mod config;
mod device;
mod document;
mod error;
mod grant;
mod merge;
mod pool;
mod validity;
mod verify;

pub use canonical::CanonicalBytes;
pub use chain::{resolve, resolve_with_depth, Chain, ChainLink, DEFAULT_MAX_CHAIN_DEPTH};
pub use config::VerifierConfig;
pub use device::MachineId;
pub use document::{Dependency, DependencyRef, LicenseDocument, SignedLicense, CANONICAL_VERSION};
pub use error::{LicenseError, LicenseResult};
pub use grant::{Grant, GrantValue, UNBOUNDED};
pub use merge::{merge, merge_grants, narrow};
pub use pool::{LicensePool, LicenseSource};
pub use validity::{format_duration, format_timestamp, parse_duration, parse_timestamp, Validity};
pub use verify::{verify, EffectiveGrant, Verifier};
