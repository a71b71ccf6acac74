//! Session-related types for admin authentication.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use meridian_core::AdminUserId;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "admin_session";

/// Session lifetime (7 days).
pub const SESSION_LIFETIME: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Payload of a signed admin session token.
///
/// Serialized as JSON inside the token, so field names are part of the
/// cookie format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Always true for issued sessions; checked on every decode.
    pub authenticated: bool,
    /// Expiry as Unix epoch milliseconds.
    pub expires_at: i64,
    /// ID of the admin the session was issued to.
    ///
    /// Optional so tokens issued before this field existed still decode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_user_id: Option<AdminUserId>,
}

impl SessionRecord {
    /// Create a session for an admin, expiring [`SESSION_LIFETIME`] from `now_ms`.
    #[must_use]
    pub fn issue(admin_user_id: AdminUserId, now_ms: i64) -> Self {
        #[allow(clippy::cast_possible_truncation)] // 7 days in ms fits i64
        let lifetime_ms = SESSION_LIFETIME.as_millis() as i64;
        Self {
            authenticated: true,
            expires_at: now_ms + lifetime_ms,
            admin_user_id: Some(admin_user_id),
        }
    }

    /// Whether the session is authenticated and unexpired at `now_ms`.
    #[must_use]
    pub const fn is_valid(&self, now_ms: i64) -> bool {
        self.authenticated && self.expires_at > now_ms
    }
}
