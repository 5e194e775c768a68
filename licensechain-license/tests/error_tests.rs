use licensechain_crypto::{ContentDigest, CryptoError, Keypair};
use licensechain_license::{LicenseError, LicenseResult};

#[test]
fn crypto_width_errors_map_one_to_one() {
    let err: LicenseError = CryptoError::MalformedKey {
        expected: 32,
        actual: 31,
    }
    .into();
    assert_eq!(
        err,
        LicenseError::MalformedKey {
            expected: 32,
            actual: 31
        }
    );

    let err: LicenseError = CryptoError::MalformedSignature {
        expected: 64,
        actual: 65,
    }
    .into();
    assert_eq!(
        err,
        LicenseError::MalformedSignature {
            expected: 64,
            actual: 65
        }
    );
}

#[test]
fn crypto_encoding_errors_are_parse_errors() {
    let err: LicenseError = CryptoError::InvalidEncoding("bad base64".into()).into();
    assert_eq!(err, LicenseError::Parse("bad base64".into()));
}

#[test]
fn error_display() {
    let author = Keypair::from_seed(&[0u8; 32]).identity();
    let digest = ContentDigest::of(b"");

    assert_eq!(
        LicenseError::Parse("missing field `grant`".into()).to_string(),
        "invalid license document: missing field `grant`"
    );
    assert_eq!(
        LicenseError::ChainTooLong { max: 16 }.to_string(),
        "license chain exceeds maximum depth of 16"
    );
    assert_eq!(
        LicenseError::GrantConflict {
            feature: "limits.hz".into(),
            reason: "flag cannot narrow a number grant".into(),
        }
        .to_string(),
        "grant conflict at 'limits.hz': flag cannot narrow a number grant"
    );
    assert_eq!(
        LicenseError::UntrustedRoot { author }.to_string(),
        format!("root license author {author} is not trusted")
    );
    assert_eq!(
        LicenseError::Cycle { author, digest }.to_string(),
        format!("dependency cycle at license {digest} by {author}")
    );
    assert_eq!(
        LicenseError::BindingMismatch {
            expected: "abc".into(),
            actual: None,
        }
        .to_string(),
        "license bound to host 'abc', running on an unbound host"
    );
    assert_eq!(
        LicenseError::BindingMismatch {
            expected: "abc".into(),
            actual: Some("def".into()),
        }
        .to_string(),
        "license bound to host 'abc', running on def"
    );
    assert_eq!(
        LicenseError::DisjointValidity {
            author,
            parent: author,
        }
        .to_string(),
        format!("validity of license by {author} does not overlap its parent by {author}")
    );
}

#[test]
fn license_result_alias() {
    let ok: LicenseResult<u8> = Ok(1);
    assert_eq!(ok.unwrap(), 1);
    let err: LicenseResult<u8> = Err(LicenseError::Config("x".into()));
    assert!(err.is_err());
}
