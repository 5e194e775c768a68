//! Lookup of parent licenses by content address.

use crate::document::{DependencyRef, SignedLicense};
use crate::error::LicenseResult;
use std::collections::HashMap;

/// Anything that can hand out licenses by reference.
///
/// Sources are not trusted: the resolver recomputes the reference of
/// whatever comes back and rejects anything that does not hash to the
/// requested author and digest.
pub trait LicenseSource {
    fn lookup(&self, reference: &DependencyRef) -> Option<&SignedLicense>;
}

/// An in-memory set of licenses indexed by their computed reference.
#[derive(Debug, Clone, Default)]
pub struct LicensePool {
    licenses: HashMap<DependencyRef, SignedLicense>,
}

impl LicensePool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a pool from a set of licenses.
    pub fn from_licenses(licenses: impl IntoIterator<Item = SignedLicense>) -> LicenseResult<Self> {
        let mut pool = Self::new();
        for license in licenses {
            pool.insert(license)?;
        }
        Ok(pool)
    }

    /// Adds a license and any parents it carries embedded.
    ///
    /// Returns the reference the license is stored under.
    pub fn insert(&mut self, license: SignedLicense) -> LicenseResult<DependencyRef> {
        if let Some(parent) = license.license().dependency().and_then(|d| d.embedded()) {
            self.insert(parent.clone())?;
        }
        let reference = license.reference()?;
        self.licenses.insert(reference, license);
        Ok(reference)
    }

    #[must_use]
    pub fn contains(&self, reference: &DependencyRef) -> bool {
        self.licenses.contains_key(reference)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.licenses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.licenses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DependencyRef, &SignedLicense)> {
        self.licenses.iter()
    }
}

impl LicenseSource for LicensePool {
    fn lookup(&self, reference: &DependencyRef) -> Option<&SignedLicense> {
        self.licenses.get(reference)
    }
}
