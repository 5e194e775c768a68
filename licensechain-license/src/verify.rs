//! End-to-end license verification.
//!
//! A leaf license is accepted only if, in order:
//!
//! 1. it parses;
//! 2. its chain resolves to a trusted root (signatures, delegation, cycles);
//! 3. every license in the chain is valid at `now` and matches the host
//!    binding, if it carries one;
//! 4. the grants along the chain narrow without conflict.
//!
//! The first failure is returned unchanged.

use crate::chain::resolve_with_depth;
use crate::config::VerifierConfig;
use crate::document::{DependencyRef, SignedLicense};
use crate::error::{LicenseError, LicenseResult};
use crate::grant::{Grant, GrantValue};
use crate::merge::merge;
use crate::pool::LicenseSource;
use crate::validity::{format_timestamp, Validity};
use chrono::{DateTime, Duration, Utc};
use licensechain_crypto::Identity;
use std::collections::BTreeSet;
use tracing::{info, warn};

/// What a verified license chain actually grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveGrant {
    grant: Grant,
    validity: Validity,
    author: Identity,
    chain: Vec<DependencyRef>,
}

impl EffectiveGrant {
    #[must_use]
    pub fn grant(&self) -> &Grant {
        &self.grant
    }

    /// The intersection of every validity window in the chain.
    #[must_use]
    pub fn validity(&self) -> &Validity {
        &self.validity
    }

    /// Author of the leaf license.
    #[must_use]
    pub fn author(&self) -> &Identity {
        &self.author
    }

    /// References of the chain, root first.
    #[must_use]
    pub fn chain(&self) -> &[DependencyRef] {
        &self.chain
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.chain.len()
    }

    /// Looks up a feature by dotted path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&GrantValue> {
        self.grant.get(path)
    }

    #[must_use]
    pub fn number(&self, path: &str) -> Option<u64> {
        self.get(path).and_then(GrantValue::as_number)
    }

    #[must_use]
    pub fn flag(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(GrantValue::as_flag)
    }

    #[must_use]
    pub fn into_grant(self) -> Grant {
        self.grant
    }
}

/// Verifies license chains under a fixed configuration.
///
/// Holds no mutable state; one verifier can be shared across threads.
#[derive(Debug, Clone)]
pub struct Verifier {
    config: VerifierConfig,
    clock_skew: Duration,
}

impl Verifier {
    /// Creates a verifier after validating `config`.
    pub fn new(config: VerifierConfig) -> LicenseResult<Self> {
        config.validate()?;
        let clock_skew = config.clock_skew()?;
        Ok(Self { config, clock_skew })
    }

    #[must_use]
    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Parses and verifies a serialized leaf license.
    pub fn verify<S>(
        &self,
        leaf: &[u8],
        source: &S,
        trusted_roots: &BTreeSet<Identity>,
        now: DateTime<Utc>,
        host_binding: Option<&str>,
    ) -> LicenseResult<EffectiveGrant>
    where
        S: LicenseSource + ?Sized,
    {
        let license = SignedLicense::parse(leaf).inspect_err(|e| {
            warn!(error = %e, "rejected license: unparseable");
        })?;
        self.verify_license(&license, source, trusted_roots, now, host_binding)
    }

    /// Verifies an already parsed leaf license.
    pub fn verify_license<S>(
        &self,
        leaf: &SignedLicense,
        source: &S,
        trusted_roots: &BTreeSet<Identity>,
        now: DateTime<Utc>,
        host_binding: Option<&str>,
    ) -> LicenseResult<EffectiveGrant>
    where
        S: LicenseSource + ?Sized,
    {
        let result = self.check(leaf, source, trusted_roots, now, host_binding);
        match &result {
            Ok(effective) => info!(
                author = %effective.author.fingerprint(),
                depth = effective.depth(),
                "license verified"
            ),
            Err(e) => warn!(
                author = %leaf.author().fingerprint(),
                error = %e,
                "rejected license"
            ),
        }
        result
    }

    fn check<S>(
        &self,
        leaf: &SignedLicense,
        source: &S,
        trusted_roots: &BTreeSet<Identity>,
        now: DateTime<Utc>,
        host_binding: Option<&str>,
    ) -> LicenseResult<EffectiveGrant>
    where
        S: LicenseSource + ?Sized,
    {
        let chain = resolve_with_depth(leaf, source, trusted_roots, self.config.max_chain_depth)?;

        let mut validity = Validity::always();
        for license in chain.licenses() {
            if let Some(window) = license.license().validity() {
                self.check_validity(license.author(), window, now)?;
                validity = validity.intersect(window);
            }
            check_binding(license.license().binding(), host_binding)?;
        }

        let grant = merge(&chain)?;
        Ok(EffectiveGrant {
            grant,
            validity,
            author: *leaf.author(),
            chain: chain.references(),
        })
    }

    fn check_validity(
        &self,
        author: &Identity,
        window: &Validity,
        now: DateTime<Utc>,
    ) -> LicenseResult<()> {
        if let Some(not_before) = window.not_before() {
            let earliest = now
                .checked_add_signed(self.clock_skew)
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            if earliest < not_before {
                return Err(LicenseError::NotYetValid {
                    author: *author,
                    not_before: format_timestamp(&not_before),
                });
            }
        }
        if let Some(not_after) = window.not_after() {
            let deadline = not_after
                .checked_add_signed(self.clock_skew)
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            if now >= deadline {
                return Err(LicenseError::Expired {
                    author: *author,
                    not_after: format_timestamp(&not_after),
                });
            }
        }
        Ok(())
    }
}

impl Default for Verifier {
    fn default() -> Self {
        Self {
            config: VerifierConfig::default(),
            clock_skew: Duration::zero(),
        }
    }
}

fn check_binding(bound_to: Option<&str>, host: Option<&str>) -> LicenseResult<()> {
    match (bound_to, host) {
        (None, _) => Ok(()),
        (Some(expected), Some(actual)) if expected == actual => Ok(()),
        (Some(expected), actual) => Err(LicenseError::BindingMismatch {
            expected: expected.to_string(),
            actual: actual.map(String::from),
        }),
    }
}

/// Verifies a serialized leaf license with the default configuration.
pub fn verify<S>(
    leaf: &[u8],
    source: &S,
    trusted_roots: &BTreeSet<Identity>,
    now: DateTime<Utc>,
    host_binding: Option<&str>,
) -> LicenseResult<EffectiveGrant>
where
    S: LicenseSource + ?Sized,
{
    Verifier::default().verify(leaf, source, trusted_roots, now, host_binding)
}
