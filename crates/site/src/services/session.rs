//! Stateless signed session tokens.
//!
//! Admin sessions live entirely in the cookie: a base64url JSON payload
//! joined to a hex HMAC-SHA256 tag with a `.`. Nothing is stored server
//! side, so rotating `ADMIN_SESSION_SECRET` invalidates every session at
//! once.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;

use meridian_core::AdminUserId;

use crate::models::SessionRecord;

type HmacSha256 = Hmac<Sha256>;

/// Errors from decoding a session token.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Token does not have the `payload.signature` shape.
    #[error("malformed session token")]
    Malformed,
    /// Signature does not verify against the payload.
    #[error("invalid session signature")]
    InvalidSignature,
    /// Payload is not valid base64url JSON of the expected shape.
    #[error("invalid session payload")]
    InvalidPayload,
    /// Session is expired or not authenticated.
    #[error("session expired")]
    Expired,
}

/// Signs and verifies admin session tokens.
#[derive(Clone)]
pub struct SessionCodec {
    mac: HmacSha256,
}

impl SessionCodec {
    /// Create a codec keyed by the session secret.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Malformed` if the key is rejected by HMAC
    /// (cannot happen for SHA-256, which accepts any key length).
    pub fn new(secret: &SecretString) -> Result<Self, SessionError> {
        let mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
            .map_err(|_| SessionError::Malformed)?;
        Ok(Self { mac })
    }

    /// Issue a signed token for a fresh session.
    #[must_use]
    pub fn issue(&self, admin_user_id: AdminUserId) -> String {
        let record = SessionRecord::issue(admin_user_id, Utc::now().timestamp_millis());
        self.encode(&record)
    }

    /// Encode and sign a session record.
    #[must_use]
    pub fn encode(&self, record: &SessionRecord) -> String {
        // SessionRecord has no map keys or non-string fields that can fail
        // to serialize.
        let json = serde_json::to_string(record).unwrap_or_default();
        let payload = URL_SAFE_NO_PAD.encode(json.as_bytes());
        let signature = self.sign(&payload);
        format!("{payload}.{signature}")
    }

    /// Verify and decode a token into a session record.
    ///
    /// Signature verification happens before the payload is parsed, so a
    /// forged payload is never deserialized. Expiry is NOT checked here;
    /// callers decide what stale sessions mean for them.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Malformed` if the token shape is wrong,
    /// `SessionError::InvalidSignature` if the tag does not verify, and
    /// `SessionError::InvalidPayload` if the payload does not parse.
    pub fn decode(&self, token: &str) -> Result<SessionRecord, SessionError> {
        let (payload, signature) = token.split_once('.').ok_or(SessionError::Malformed)?;
        if payload.is_empty() || signature.is_empty() {
            return Err(SessionError::Malformed);
        }

        let tag = hex::decode(signature).map_err(|_| SessionError::InvalidSignature)?;
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        // verify_slice is constant-time
        mac.verify_slice(&tag)
            .map_err(|_| SessionError::InvalidSignature)?;

        let json = URL_SAFE_NO_PAD
            .decode(payload.as_bytes())
            .map_err(|_| SessionError::InvalidPayload)?;
        serde_json::from_slice(&json).map_err(|_| SessionError::InvalidPayload)
    }

    /// Verify, decode, and check that the session is live right now.
    ///
    /// # Errors
    ///
    /// Returns decode errors as in [`Self::decode`], plus
    /// `SessionError::Expired` for stale or unauthenticated records.
    pub fn decode_valid(&self, token: &str) -> Result<SessionRecord, SessionError> {
        let record = self.decode(token)?;
        if !record.is_valid(Utc::now().timestamp_millis()) {
            return Err(SessionError::Expired);
        }
        Ok(record)
    }

    fn sign(&self, payload: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}
