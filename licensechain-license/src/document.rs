//! License documents: parsing, canonical encoding and issuing.
//!
//! # Wire format
//!
//! A signed license is a JSON object:
//!
//! ```json
//! {
//!   "license": {
//!     "author": "<base64 Ed25519 public key>",
//!     "name": "Awesome, Inc.",
//!     "product": "EtherNet/IP Tool",
//!     "clients": ["<base64 public key>"],
//!     "grant": { "seats": 5, "export": true, "limits": { "hz": 1000 } },
//!     "validity": { "not_before": "2024-01-01T00:00:00Z", "not_after": "2025-01-01T00:00:00Z" },
//!     "binding": "00010203-0405-4607-8809-0a0b0c0d0e0f",
//!     "dependency": { "author": "<base64>", "digest": "<hex sha256>" }
//!   },
//!   "signature": "<base64 Ed25519 signature>"
//! }
//! ```
//!
//! `author`, `clients` and `grant` are required. A dependency is either a
//! reference as above or `{ "embedded": <signed license> }`.
//!
//! # Canonical form
//!
//! The signature covers the JCS encoding of
//! `{"v":1, author, name?, product?, clients, grant, validity?, binding?, dependency?}`
//! where `clients` is sorted by key bytes and `dependency` is always the
//! `{author, digest}` reference, even when the parent travels embedded.
//! Embedding a parent therefore never changes a license's signature or
//! digest.

use crate::canonical::CanonicalBytes;
use crate::error::{LicenseError, LicenseResult};
use crate::grant::Grant;
use crate::validity::Validity;
use licensechain_crypto::{verify, ContentDigest, Identity, Keypair, Signature};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Version tag included in every canonical encoding.
pub const CANONICAL_VERSION: u32 = 1;

/// Content address of a license: its author and the digest of its
/// canonical encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyRef {
    pub author: Identity,
    pub digest: ContentDigest,
}

/// How a license points at its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Dependency {
    /// The parent travels inside this document.
    Embedded { embedded: Box<SignedLicense> },
    /// The parent is looked up in a pool by content address.
    Reference(DependencyRef),
}

impl Dependency {
    /// The content address of the parent.
    pub fn reference(&self) -> LicenseResult<DependencyRef> {
        match self {
            Self::Embedded { embedded } => embedded.reference(),
            Self::Reference(r) => Ok(*r),
        }
    }

    /// The embedded parent, if any.
    #[must_use]
    pub fn embedded(&self) -> Option<&SignedLicense> {
        match self {
            Self::Embedded { embedded } => Some(embedded),
            Self::Reference(_) => None,
        }
    }
}

/// The unsigned content of a license.
///
/// Immutable once signed: the issuing setters consume `self` and are only
/// useful before [`LicenseDocument::sign`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LicenseDocument {
    author: Identity,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    product: Option<String>,
    clients: BTreeSet<Identity>,
    grant: Grant,
    #[serde(skip_serializing_if = "Option::is_none")]
    validity: Option<Validity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    binding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dependency: Option<Dependency>,
}

#[derive(Serialize)]
struct Signable<'a> {
    v: u32,
    author: &'a Identity,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    product: Option<&'a str>,
    clients: &'a BTreeSet<Identity>,
    grant: &'a Grant,
    #[serde(skip_serializing_if = "Option::is_none")]
    validity: Option<&'a Validity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    binding: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dependency: Option<DependencyRef>,
}

impl LicenseDocument {
    /// Starts a license by `author` conferring `grant`, with no clients.
    #[must_use]
    pub fn new(author: Identity, grant: Grant) -> Self {
        Self {
            author,
            name: None,
            product: None,
            clients: BTreeSet::new(),
            grant,
            validity: None,
            binding: None,
            dependency: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = Some(product.into());
        self
    }

    /// Delegates authority to `client`.
    #[must_use]
    pub fn with_client(mut self, client: Identity) -> Self {
        self.clients.insert(client);
        self
    }

    #[must_use]
    pub fn with_clients(mut self, clients: impl IntoIterator<Item = Identity>) -> Self {
        self.clients.extend(clients);
        self
    }

    #[must_use]
    pub fn with_validity(mut self, validity: Validity) -> Self {
        self.validity = Some(validity);
        self
    }

    /// Restricts the license to one host.
    #[must_use]
    pub fn with_binding(mut self, binding: impl Into<String>) -> Self {
        self.binding = Some(binding.into());
        self
    }

    /// Depends on a parent that will be looked up by reference.
    #[must_use]
    pub fn depends_on(mut self, parent: DependencyRef) -> Self {
        self.dependency = Some(Dependency::Reference(parent));
        self
    }

    /// Depends on a parent carried inside this license.
    #[must_use]
    pub fn embedding(mut self, parent: SignedLicense) -> Self {
        self.dependency = Some(Dependency::Embedded {
            embedded: Box::new(parent),
        });
        self
    }

    #[must_use]
    pub fn author(&self) -> &Identity {
        &self.author
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn product(&self) -> Option<&str> {
        self.product.as_deref()
    }

    #[must_use]
    pub fn clients(&self) -> &BTreeSet<Identity> {
        &self.clients
    }

    /// True if this license delegates authority to `identity`.
    #[must_use]
    pub fn delegates_to(&self, identity: &Identity) -> bool {
        self.clients.contains(identity)
    }

    #[must_use]
    pub fn grant(&self) -> &Grant {
        &self.grant
    }

    #[must_use]
    pub fn validity(&self) -> Option<&Validity> {
        self.validity.as_ref()
    }

    #[must_use]
    pub fn binding(&self) -> Option<&str> {
        self.binding.as_deref()
    }

    #[must_use]
    pub fn dependency(&self) -> Option<&Dependency> {
        self.dependency.as_ref()
    }

    /// Canonical encoding of the signable fields.
    pub fn canonical_bytes(&self) -> LicenseResult<CanonicalBytes> {
        let dependency = self.dependency.as_ref().map(Dependency::reference).transpose()?;
        CanonicalBytes::new(&Signable {
            v: CANONICAL_VERSION,
            author: &self.author,
            name: self.name.as_deref(),
            product: self.product.as_deref(),
            clients: &self.clients,
            grant: &self.grant,
            validity: self.validity.as_ref(),
            binding: self.binding.as_deref(),
            dependency,
        })
    }

    /// Signs the document with the author's keypair.
    ///
    /// # Errors
    ///
    /// - [`LicenseError::KeyMismatch`] if `keypair` is not the author's.
    /// - [`LicenseError::Delegation`] if an embedded parent does not list the
    ///   author as a client.
    /// - [`LicenseError::DisjointValidity`] if the validity window shares no
    ///   instant with an embedded parent's.
    pub fn sign(self, keypair: &Keypair) -> LicenseResult<SignedLicense> {
        if keypair.identity() != self.author {
            return Err(LicenseError::KeyMismatch {
                author: self.author,
                signer: keypair.identity(),
            });
        }
        if let Some(parent) = self.dependency.as_ref().and_then(Dependency::embedded) {
            if !parent.license().delegates_to(&self.author) {
                return Err(LicenseError::Delegation {
                    author: self.author,
                    parent: *parent.license().author(),
                });
            }
            if let (Some(own), Some(theirs)) = (self.validity.as_ref(), parent.license().validity()) {
                if own.intersect(theirs).is_empty() {
                    return Err(LicenseError::DisjointValidity {
                        author: self.author,
                        parent: *parent.license().author(),
                    });
                }
            }
        }
        let canonical = self.canonical_bytes()?;
        let signature = keypair.sign(canonical.as_bytes());
        Ok(SignedLicense {
            license: self,
            signature,
        })
    }
}

/// A license together with its author's signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedLicense {
    license: LicenseDocument,
    signature: Signature,
}

impl SignedLicense {
    /// Parses a serialized license.
    ///
    /// Checks structure only: the signature and chain are not verified.
    ///
    /// # Errors
    ///
    /// - [`LicenseError::Parse`] for malformed JSON, missing or unknown fields,
    ///   grant values outside the supported set, or bad timestamps.
    /// - [`LicenseError::MalformedKey`] / [`LicenseError::MalformedSignature`]
    ///   for keys or signatures of the wrong width.
    pub fn parse(bytes: &[u8]) -> LicenseResult<Self> {
        let raw: wire::RawSigned = serde_json::from_slice(bytes)
            .map_err(|e| LicenseError::Parse(e.to_string()))?;
        raw.try_into()
    }

    /// Parses a serialized license from text.
    pub fn parse_str(text: &str) -> LicenseResult<Self> {
        Self::parse(text.as_bytes())
    }

    /// Assembles a signed license from parts without checking the signature.
    #[must_use]
    pub fn from_parts(license: LicenseDocument, signature: Signature) -> Self {
        Self { license, signature }
    }

    #[must_use]
    pub fn license(&self) -> &LicenseDocument {
        &self.license
    }

    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    #[must_use]
    pub fn author(&self) -> &Identity {
        &self.license.author
    }

    /// Canonical encoding of the signed content.
    pub fn canonical_bytes(&self) -> LicenseResult<CanonicalBytes> {
        self.license.canonical_bytes()
    }

    pub fn digest(&self) -> LicenseResult<ContentDigest> {
        Ok(self.canonical_bytes()?.digest())
    }

    /// The content address other licenses use to depend on this one.
    pub fn reference(&self) -> LicenseResult<DependencyRef> {
        Ok(DependencyRef {
            author: self.license.author,
            digest: self.digest()?,
        })
    }

    /// Checks the signature against the author over the canonical encoding.
    ///
    /// # Errors
    ///
    /// [`LicenseError::Signature`] if it does not verify.
    pub fn verify_signature(&self) -> LicenseResult<()> {
        let canonical = self.canonical_bytes()?;
        self.verify_canonical(&canonical)
    }

    pub(crate) fn verify_canonical(&self, canonical: &CanonicalBytes) -> LicenseResult<()> {
        if verify(&self.license.author, canonical.as_bytes(), &self.signature) {
            Ok(())
        } else {
            Err(LicenseError::Signature {
                author: self.license.author,
            })
        }
    }

    /// Serializes to indented JSON.
    pub fn to_bytes(&self) -> LicenseResult<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| LicenseError::Encoding(e.to_string()))
    }

    /// Serializes to indented JSON text.
    pub fn to_json_string(&self) -> LicenseResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| LicenseError::Encoding(e.to_string()))
    }
}

impl<'de> Deserialize<'de> for SignedLicense {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = wire::RawSigned::deserialize(deserializer)?;
        raw.try_into().map_err(serde::de::Error::custom)
    }
}

/// Untyped wire structures. Parsing goes through these so that key and
/// signature width errors keep their own error kinds instead of surfacing
/// as generic JSON errors.
mod wire {
    use super::*;
    use crate::grant::GrantValue;
    use serde_json::Value;

    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    pub(super) struct RawSigned {
        license: RawLicense,
        signature: String,
    }

    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct RawLicense {
        author: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        product: Option<String>,
        clients: Vec<String>,
        grant: Value,
        #[serde(default)]
        validity: Option<RawValidity>,
        #[serde(default)]
        binding: Option<String>,
        #[serde(default)]
        dependency: Option<RawDependency>,
    }

    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct RawValidity {
        #[serde(default)]
        not_before: Option<String>,
        #[serde(default)]
        not_after: Option<String>,
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDependency {
        Embedded(RawEmbedded),
        Reference(RawReference),
    }

    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct RawEmbedded {
        embedded: Box<RawSigned>,
    }

    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct RawReference {
        author: String,
        digest: String,
    }

    impl TryFrom<RawSigned> for SignedLicense {
        type Error = LicenseError;

        fn try_from(raw: RawSigned) -> LicenseResult<Self> {
            Ok(SignedLicense {
                license: raw.license.try_into()?,
                signature: Signature::from_base64(&raw.signature)?,
            })
        }
    }

    impl TryFrom<RawLicense> for LicenseDocument {
        type Error = LicenseError;

        fn try_from(raw: RawLicense) -> LicenseResult<Self> {
            let clients = raw
                .clients
                .iter()
                .map(|c| Identity::from_base64(c).map_err(LicenseError::from))
                .collect::<LicenseResult<BTreeSet<_>>>()?;
            let grant = GrantValue::from_json(raw.grant)
                .and_then(Grant::try_from)
                .map_err(|e| match e {
                    LicenseError::Encoding(msg) => LicenseError::Parse(format!("grant: {msg}")),
                    other => other,
                })?;
            let validity = raw
                .validity
                .map(|v| Validity::from_wire(v.not_before.as_deref(), v.not_after.as_deref()))
                .transpose()?;
            let dependency = raw.dependency.map(Dependency::try_from).transpose()?;
            Ok(LicenseDocument {
                author: Identity::from_base64(&raw.author)?,
                name: raw.name,
                product: raw.product,
                clients,
                grant,
                validity,
                binding: raw.binding,
                dependency,
            })
        }
    }

    impl TryFrom<RawDependency> for Dependency {
        type Error = LicenseError;

        fn try_from(raw: RawDependency) -> LicenseResult<Self> {
            match raw {
                RawDependency::Embedded(e) => Ok(Dependency::Embedded {
                    embedded: Box::new((*e.embedded).try_into()?),
                }),
                RawDependency::Reference(r) => Ok(Dependency::Reference(DependencyRef {
                    author: Identity::from_base64(&r.author)?,
                    digest: ContentDigest::from_hex(&r.digest)?,
                })),
            }
        }
    }
}
