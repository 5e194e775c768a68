//! Reconstruction of the delegation path from a leaf license to a trusted root.

use crate::document::{Dependency, DependencyRef, SignedLicense};
use crate::error::{LicenseError, LicenseResult};
use crate::pool::LicenseSource;
use licensechain_crypto::Identity;
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// Maximum number of licenses in a chain unless configured otherwise.
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 16;

/// One verified license in a chain.
#[derive(Debug, Clone, Copy)]
pub struct ChainLink<'a> {
    license: &'a SignedLicense,
    reference: DependencyRef,
}

impl<'a> ChainLink<'a> {
    #[must_use]
    pub fn license(&self) -> &'a SignedLicense {
        self.license
    }

    /// The computed reference of this license.
    #[must_use]
    pub fn reference(&self) -> DependencyRef {
        self.reference
    }

    #[must_use]
    pub fn author(&self) -> &'a Identity {
        self.license.author()
    }
}

/// A resolved delegation chain, ordered root to leaf.
///
/// Every link's signature has been checked, every non-root author is a client
/// of its parent, and the root's author is trusted.
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    links: Vec<ChainLink<'a>>,
}

impl<'a> Chain<'a> {
    #[must_use]
    pub fn links(&self) -> &[ChainLink<'a>] {
        &self.links
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Always false: a resolved chain holds at least its leaf.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    #[must_use]
    pub fn root(&self) -> Option<&ChainLink<'a>> {
        self.links.first()
    }

    #[must_use]
    pub fn leaf(&self) -> Option<&ChainLink<'a>> {
        self.links.last()
    }

    /// Licenses in root-to-leaf order.
    pub fn licenses(&self) -> impl DoubleEndedIterator<Item = &'a SignedLicense> + '_ {
        self.links.iter().map(|l| l.license)
    }

    /// References in root-to-leaf order.
    #[must_use]
    pub fn references(&self) -> Vec<DependencyRef> {
        self.links.iter().map(|l| l.reference).collect()
    }
}

/// Resolves `leaf` to a trusted root with the default depth limit.
pub fn resolve<'a, S>(
    leaf: &'a SignedLicense,
    source: &'a S,
    trusted_roots: &BTreeSet<Identity>,
) -> LicenseResult<Chain<'a>>
where
    S: LicenseSource + ?Sized,
{
    resolve_with_depth(leaf, source, trusted_roots, DEFAULT_MAX_CHAIN_DEPTH)
}

/// Resolves `leaf` to a trusted root, following at most `max_depth` licenses.
///
/// Per license, in order: depth limit, signature, revisit, then either the
/// parent's delegation or, for a license without a dependency, root trust.
/// Embedded parents are used as carried. Referenced parents come from
/// `source` and must hash to exactly the requested reference; a license
/// already on the path is a cycle, any other substitute is unresolved.
///
/// # Errors
///
/// [`LicenseError::ChainTooLong`], [`LicenseError::Signature`],
/// [`LicenseError::Cycle`], [`LicenseError::UnresolvedDependency`],
/// [`LicenseError::Delegation`] or [`LicenseError::UntrustedRoot`].
pub fn resolve_with_depth<'a, S>(
    leaf: &'a SignedLicense,
    source: &'a S,
    trusted_roots: &BTreeSet<Identity>,
    max_depth: usize,
) -> LicenseResult<Chain<'a>>
where
    S: LicenseSource + ?Sized,
{
    let mut links: Vec<ChainLink<'a>> = Vec::new();
    let mut visited: HashSet<DependencyRef> = HashSet::new();
    let mut current = leaf;

    loop {
        if links.len() >= max_depth {
            return Err(LicenseError::ChainTooLong { max: max_depth });
        }

        let canonical = current.canonical_bytes()?;
        let reference = DependencyRef {
            author: *current.author(),
            digest: canonical.digest(),
        };
        current.verify_canonical(&canonical)?;
        if !visited.insert(reference) {
            return Err(LicenseError::Cycle {
                author: reference.author,
                digest: reference.digest,
            });
        }
        debug!(
            author = %reference.author.fingerprint(),
            digest = %reference.digest,
            depth = links.len(),
            "verified chain link"
        );
        links.push(ChainLink {
            license: current,
            reference,
        });

        let parent = match current.license().dependency() {
            None => {
                if !trusted_roots.contains(current.author()) {
                    return Err(LicenseError::UntrustedRoot {
                        author: *current.author(),
                    });
                }
                break;
            }
            Some(Dependency::Embedded { embedded }) => &**embedded,
            Some(Dependency::Reference(wanted)) => {
                if visited.contains(wanted) {
                    return Err(LicenseError::Cycle {
                        author: wanted.author,
                        digest: wanted.digest,
                    });
                }
                let unresolved = || LicenseError::UnresolvedDependency {
                    author: wanted.author,
                    digest: wanted.digest,
                };
                let found = source.lookup(wanted).ok_or_else(unresolved)?;
                let found_ref = found.reference()?;
                if visited.contains(&found_ref) {
                    return Err(LicenseError::Cycle {
                        author: found_ref.author,
                        digest: found_ref.digest,
                    });
                }
                if found_ref != *wanted {
                    return Err(unresolved());
                }
                found
            }
        };

        if !parent.license().delegates_to(current.author()) {
            return Err(LicenseError::Delegation {
                author: *current.author(),
                parent: *parent.author(),
            });
        }
        current = parent;
    }

    links.reverse();
    Ok(Chain { links })
}
