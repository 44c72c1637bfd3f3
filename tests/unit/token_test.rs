//! Unit tests for token issuance and verification.
//!
//! Expiry boundaries are exercised with crafted claim sets rather than
//! sleeps: a token with `exp = now + 1` stands in for one issued 1799 seconds
//! ago, and `exp = now` for one at exactly the 30 minute mark.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use tollgate::config::TokenConfig;
use tollgate::testing::setup;
use tollgate::token::{AccessClaims, TokenCodec, TokenError};

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn claims_expiring_at(exp: u64) -> AccessClaims {
    AccessClaims {
        authorized: true,
        sub: "user".to_string(),
        exp,
    }
}

#[test]
fn issued_token_verifies_with_claims() {
    let codec = setup::codec();
    let token = codec.issue().unwrap();

    let verification = codec.verify(&token).unwrap();
    assert!(verification.valid);

    let claims = verification.claims.expect("valid token surfaces claims");
    assert!(claims.authorized);
    assert_eq!(claims.sub, "user");
    assert!(claims.exp > unix_now(), "expiry lies in the future");
}

#[test]
fn token_valid_one_second_before_expiry() {
    let codec = setup::codec();
    let token = codec.sign(&claims_expiring_at(unix_now() + 1)).unwrap();

    assert!(codec.verify(&token).unwrap().valid);
}

#[test]
fn token_invalid_at_exact_expiry() {
    let codec = setup::codec();
    let token = codec.sign(&claims_expiring_at(unix_now())).unwrap();

    let verification = codec.verify(&token).unwrap();
    assert!(!verification.valid);
    assert!(verification.claims.is_none());
}

#[test]
fn token_invalid_after_expiry() {
    let codec = setup::codec();
    let token = codec.sign(&claims_expiring_at(unix_now() - 60)).unwrap();

    assert!(!codec.verify(&token).unwrap().valid);
}

#[test]
fn foreign_secret_never_verifies() {
    let token = setup::codec().issue().unwrap();

    let other = TokenCodec::new(&TokenConfig {
        secret: "a-different-secret".to_string(),
        ..setup::token_config()
    });

    let verification = other.verify(&token).unwrap();
    assert!(!verification.valid);
    assert!(verification.claims.is_none());
}

#[test]
fn non_hs256_algorithm_is_rejected_regardless_of_signature() {
    // Signed with the right secret but the wrong algorithm: the verifier must
    // refuse before the signature is considered.
    let config = setup::token_config();
    let claims = claims_expiring_at(unix_now() + 600);

    for algorithm in [Algorithm::HS384, Algorithm::HS512] {
        let forged = encode(
            &Header::new(algorithm),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        let verification = setup::codec().verify(&forged).unwrap();
        assert!(!verification.valid, "{algorithm:?} token must not verify");
        assert!(verification.claims.is_none());
    }
}

#[test]
fn tampered_payload_fails_signature_check() {
    let codec = setup::codec();
    let token = codec.issue().unwrap();

    // Flip one character inside the payload segment.
    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    assert_eq!(parts.len(), 3);
    let payload = &mut parts[1];
    let flipped = if payload.ends_with('A') { "B" } else { "A" };
    payload.replace_range(payload.len() - 1.., flipped);

    let tampered = parts.join(".");
    assert!(!codec.verify(&tampered).unwrap().valid);
}

#[test]
fn malformed_token_is_a_parse_error() {
    let codec = setup::codec();

    for garbage in ["", "not-a-token", "only.two", "a.b.c"] {
        assert!(
            matches!(codec.verify(garbage), Err(TokenError::Parse(_))),
            "{garbage:?} should fail to parse"
        );
    }
}

#[test]
fn codec_is_safe_for_concurrent_use() {
    use std::sync::Arc;

    let codec = Arc::new(setup::codec());
    let token = codec.issue().unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let codec = Arc::clone(&codec);
            let token = token.clone();
            std::thread::spawn(move || codec.verify(&token).unwrap().valid)
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
