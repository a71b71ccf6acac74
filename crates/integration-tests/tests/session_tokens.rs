//! Session token format contract.
//!
//! The cookie format (base64url JSON payload, dot, hex HMAC tag) is shared
//! with the admin frontend's expectations, so these tests pin it down.

#![allow(clippy::unwrap_used)]

use secrecy::SecretString;

use meridian_core::AdminUserId;
use meridian_integration_tests::TEST_SESSION_SECRET;
use meridian_site::services::{SessionCodec, SessionError};

fn codec() -> SessionCodec {
    SessionCodec::new(&SecretString::from(TEST_SESSION_SECRET)).unwrap()
}

#[test]
fn token_has_payload_dot_signature_shape() {
    let token = codec().issue(AdminUserId::generate());
    let (payload, signature) = token.split_once('.').unwrap();

    // Payload is unpadded base64url.
    assert!(!payload.contains('='));
    assert!(
        payload
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    );

    // Signature is a hex-encoded SHA-256 tag.
    assert_eq!(signature.len(), 64);
    assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn payload_is_inspectable_json() {
    use base64::Engine;

    let admin_id = AdminUserId::generate();
    let token = codec().issue(admin_id);
    let (payload, _) = token.split_once('.').unwrap();

    let json = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload)
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&json).unwrap();

    // The payload is readable by anyone holding the cookie; only the
    // signature is secret-derived.
    assert_eq!(value["authenticated"], true);
    assert_eq!(value["adminUserId"], admin_id.to_string());
    assert!(value["expiresAt"].is_i64());
}

#[test]
fn secret_rotation_invalidates_all_tokens() {
    let token = codec().issue(AdminUserId::generate());

    let rotated =
        SessionCodec::new(&SecretString::from("zQ8!xW6@vE4#rT2$yU0%iO9^pA7&sD5*")).unwrap();
    assert_eq!(
        rotated.decode(&token).unwrap_err(),
        SessionError::InvalidSignature
    );
}

#[test]
fn signature_is_checked_before_payload_parsing() {
    // A syntactically broken payload with a syntactically broken signature
    // fails on the signature, proving parse order.
    let err = codec().decode("!!!not-base64!!!.not-hex").unwrap_err();
    assert_eq!(err, SessionError::InvalidSignature);
}
