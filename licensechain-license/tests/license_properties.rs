//! Property tests for canonical encoding and grant narrowing.

mod common;

use common::*;
use licensechain_license::{
    merge_grants, verify, Grant, GrantValue, LicenseDocument, LicensePool,
};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn leaf_value() -> impl Strategy<Value = GrantValue> {
    prop_oneof![
        (0u64..10_000).prop_map(GrantValue::Number),
        any::<bool>().prop_map(GrantValue::Flag),
        Just(GrantValue::Unbounded),
    ]
}

fn feature_map() -> impl Strategy<Value = Vec<(String, GrantValue)>> {
    prop::collection::vec(("[a-z]{1,6}", leaf_value()), 0..8)
}

proptest! {
    #[test]
    fn digest_ignores_feature_insertion_order(features in feature_map()) {
        let forward = features
            .iter()
            .fold(Grant::new(), |g, (k, v)| g.with(k.clone(), v.clone()));
        let mut dedup: BTreeMap<String, GrantValue> = BTreeMap::new();
        for (k, v) in &features {
            dedup.insert(k.clone(), v.clone());
        }
        let backward = dedup
            .into_iter()
            .rev()
            .fold(Grant::new(), |g, (k, v)| g.with(k, v));

        let a = LicenseDocument::new(vendor().identity(), forward).sign(&vendor()).unwrap();
        let b = LicenseDocument::new(vendor().identity(), backward).sign(&vendor()).unwrap();
        prop_assert_eq!(a.digest().unwrap(), b.digest().unwrap());
    }

    #[test]
    fn digest_ignores_client_order(seeds in prop::collection::vec(10u8..60, 0..6)) {
        let clients: Vec<_> = seeds.iter().map(|s| keypair(*s).identity()).collect();
        let a = LicenseDocument::new(vendor().identity(), Grant::new())
            .with_clients(clients.clone())
            .sign(&vendor())
            .unwrap();
        let b = LicenseDocument::new(vendor().identity(), Grant::new())
            .with_clients(clients.into_iter().rev())
            .sign(&vendor())
            .unwrap();
        prop_assert_eq!(a.signature(), b.signature());
    }

    #[test]
    fn merged_number_is_chain_minimum(seats in prop::collection::vec(0u64..1_000, 1..6)) {
        let grants: Vec<Grant> = seats.iter().map(|n| Grant::new().with("seats", *n)).collect();
        let merged = merge_grants(&grants).unwrap();
        let min = seats.iter().copied().min();
        prop_assert_eq!(merged.get("seats").and_then(GrantValue::as_number), min);
    }

    #[test]
    fn merged_flag_is_conjunction(flags in prop::collection::vec(any::<bool>(), 1..6)) {
        let grants: Vec<Grant> = flags.iter().map(|b| Grant::new().with("export", *b)).collect();
        let merged = merge_grants(&grants).unwrap();
        prop_assert_eq!(
            merged.get("export").and_then(GrantValue::as_flag),
            Some(flags.iter().all(|b| *b))
        );
    }

    #[test]
    fn narrowing_by_self_is_identity(features in feature_map()) {
        let g = features
            .into_iter()
            .fold(Grant::new(), |g, (k, v)| g.with(k, v));
        prop_assert_eq!(merge_grants([&g, &g]).unwrap(), g);
    }

    #[test]
    fn two_link_seats_are_minimum(root_seats in 0u64..500, leaf_seats in 0u64..500) {
        let root = root_license(&vendor(), &customer(), Grant::new().with("seats", root_seats));
        let leaf = child_license(&customer(), root, Grant::new().with("seats", leaf_seats));
        let effective = verify(
            &leaf.to_bytes().unwrap(),
            &LicensePool::new(),
            &roots(&[&vendor()]),
            now(),
            None,
        )
        .unwrap();
        prop_assert_eq!(effective.number("seats"), Some(root_seats.min(leaf_seats)));
    }
}
