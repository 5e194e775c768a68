//! Property-based tests for the signature layer.
//!
//! - Signatures verify under the signing identity only
//! - Any single-bit change to message or signature is rejected
//! - Text forms of identities, signatures and digests are lossless

use licensechain_crypto::{sign, verify, ContentDigest, Identity, Keypair, Signature};
use proptest::prelude::*;

fn seed_strategy() -> impl Strategy<Value = [u8; 32]> {
    prop::array::uniform32(any::<u8>())
}

fn message_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..2048)
}

proptest! {
    #[test]
    fn signatures_verify(seed in seed_strategy(), message in message_strategy()) {
        let kp = Keypair::from_seed(&seed);
        let sig = sign(&kp, &message);
        prop_assert!(verify(&kp.identity(), &message, &sig));
    }

    #[test]
    fn tampered_message_rejected(
        seed in seed_strategy(),
        message in message_strategy(),
        bit in 0usize..8,
        index in any::<prop::sample::Index>(),
    ) {
        prop_assume!(!message.is_empty());
        let kp = Keypair::from_seed(&seed);
        let sig = sign(&kp, &message);

        let mut tampered = message.clone();
        let i = index.index(tampered.len());
        tampered[i] ^= 1 << bit;
        prop_assert!(!verify(&kp.identity(), &tampered, &sig));
    }

    #[test]
    fn tampered_signature_rejected(
        seed in seed_strategy(),
        message in message_strategy(),
        bit in 0usize..8,
        index in 0usize..64,
    ) {
        let kp = Keypair::from_seed(&seed);
        let mut bytes = *sign(&kp, &message).as_bytes();
        bytes[index] ^= 1 << bit;
        prop_assert!(!verify(&kp.identity(), &message, &Signature::from_bytes(&bytes)));
    }

    #[test]
    fn identity_text_form_is_lossless(seed in seed_strategy()) {
        let identity = Keypair::from_seed(&seed).identity();
        prop_assert_eq!(Identity::from_base64(&identity.to_base64()).unwrap(), identity);
    }

    #[test]
    fn digest_text_form_is_lossless(data in message_strategy()) {
        let digest = ContentDigest::of(&data);
        prop_assert_eq!(ContentDigest::from_hex(&digest.to_hex()).unwrap(), digest);
    }
}
