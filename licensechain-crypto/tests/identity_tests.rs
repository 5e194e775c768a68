use licensechain_crypto::{CryptoError, Identity, Keypair, IDENTITY_SIZE};

const ZERO_SEED_IDENTITY: &str = "O2onvM62pC1io6jQKm8Nc2UyFXcd4kOmOsBIoYtZ2ik=";

// ── Keypair ──────────────────────────────────────────────────────

#[test]
fn keypair_from_seed_is_deterministic() {
    let a = Keypair::from_seed(&[7u8; 32]);
    let b = Keypair::from_seed(&[7u8; 32]);
    assert_eq!(a.identity(), b.identity());
}

#[test]
fn keypair_from_zero_seed_matches_known_identity() {
    let kp = Keypair::from_seed(&[0u8; 32]);
    assert_eq!(kp.identity().to_base64(), ZERO_SEED_IDENTITY);
}

#[test]
fn generated_keypairs_differ() {
    let a = Keypair::generate();
    let b = Keypair::generate();
    assert_ne!(a.identity(), b.identity());
}

#[test]
fn seed_slice_of_wrong_width_rejected() {
    let err = Keypair::from_seed_slice(&[1u8; 31]).unwrap_err();
    assert_eq!(
        err,
        CryptoError::MalformedKey {
            expected: 32,
            actual: 31
        }
    );
}

#[test]
fn keypair_debug_redacts_private_key() {
    let kp = Keypair::from_seed(&[9u8; 32]);
    let debug = format!("{kp:?}");
    assert!(debug.contains("REDACTED"));
    assert!(debug.contains(&kp.identity().to_base64()));
}

// ── Identity ─────────────────────────────────────────────────────

#[test]
fn identity_base64_roundtrip() {
    let identity = Keypair::from_seed(&[3u8; 32]).identity();
    let parsed = Identity::from_base64(&identity.to_base64()).unwrap();
    assert_eq!(parsed, identity);
    assert_eq!(identity.to_string().parse::<Identity>().unwrap(), identity);
}

#[test]
fn identity_rejects_short_key() {
    let err = Identity::from_slice(&[0u8; 16]).unwrap_err();
    assert!(matches!(
        err,
        CryptoError::MalformedKey {
            expected: IDENTITY_SIZE,
            actual: 16
        }
    ));
}

#[test]
fn identity_rejects_long_key_without_truncating() {
    let mut bytes = Keypair::from_seed(&[3u8; 32]).identity().as_bytes().to_vec();
    bytes.push(0);
    assert!(matches!(
        Identity::from_slice(&bytes),
        Err(CryptoError::MalformedKey { actual: 33, .. })
    ));
}

#[test]
fn identity_rejects_bad_base64() {
    assert!(matches!(
        Identity::from_base64("not base64!!"),
        Err(CryptoError::InvalidEncoding(_))
    ));
}

#[test]
fn identity_serde_uses_base64_string() {
    let identity = Keypair::from_seed(&[0u8; 32]).identity();
    let json = serde_json::to_string(&identity).unwrap();
    assert_eq!(json, format!("\"{ZERO_SEED_IDENTITY}\""));
    let parsed: Identity = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, identity);
}

#[test]
fn identity_ordering_is_bytewise() {
    let a = Keypair::from_seed(&[1u8; 32]).identity();
    let b = Keypair::from_seed(&[2u8; 32]).identity();
    assert_eq!(a.cmp(&b), a.as_bytes().cmp(b.as_bytes()));
}

#[test]
fn fingerprint_is_short_hex() {
    let identity = Keypair::from_seed(&[0u8; 32]).identity();
    assert_eq!(identity.fingerprint(), "3b6a27bcceb6a42d");
}
