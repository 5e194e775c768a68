//! Shared test helpers for license tests.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use licensechain_crypto::{Identity, Keypair};
use licensechain_license::{Grant, LicenseDocument, SignedLicense, Validity};
use std::collections::BTreeSet;

/// Deterministic keypair for a named party.
pub fn keypair(seed: u8) -> Keypair {
    Keypair::from_seed(&[seed; 32])
}

pub fn vendor() -> Keypair {
    keypair(1)
}

pub fn reseller() -> Keypair {
    keypair(2)
}

pub fn customer() -> Keypair {
    keypair(3)
}

pub fn stranger() -> Keypair {
    keypair(99)
}

pub fn roots(keys: &[&Keypair]) -> BTreeSet<Identity> {
    keys.iter().map(|k| k.identity()).collect()
}

/// A fixed "now": 2024-06-01T00:00:00Z.
pub fn now() -> DateTime<Utc> {
    at(2024, 6, 1)
}

pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .expect("valid date")
}

/// The year 2024, which contains [`now`].
pub fn year_2024() -> Validity {
    Validity::new(Some(at(2024, 1, 1)), Some(at(2025, 1, 1))).unwrap()
}

pub fn grant(json: serde_json::Value) -> Grant {
    Grant::from_json(json).expect("valid grant")
}

/// A root license by `author` delegating to `client`.
pub fn root_license(author: &Keypair, client: &Keypair, grant: Grant) -> SignedLicense {
    LicenseDocument::new(author.identity(), grant)
        .with_client(client.identity())
        .sign(author)
        .expect("sign root")
}

/// A license by `author` that embeds `parent`.
pub fn child_license(author: &Keypair, parent: SignedLicense, grant: Grant) -> SignedLicense {
    LicenseDocument::new(author.identity(), grant)
        .embedding(parent)
        .sign(author)
        .expect("sign child")
}

/// vendor → reseller → customer, each with the given grant.
pub fn three_link_chain(grants: [Grant; 3]) -> SignedLicense {
    let [root_grant, mid_grant, leaf_grant] = grants;
    let root = root_license(&vendor(), &reseller(), root_grant);
    let mid = LicenseDocument::new(reseller().identity(), mid_grant)
        .with_client(customer().identity())
        .embedding(root)
        .sign(&reseller())
        .expect("sign mid");
    child_license(&customer(), mid, leaf_grant)
}

/// Installs a test-writer subscriber so `RUST_LOG` shows library logs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
