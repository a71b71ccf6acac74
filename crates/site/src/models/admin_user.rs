//! Admin user model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use meridian_core::{AdminUserId, Email};

/// An admin account with credentials.
///
/// Carries the password hash, so it is never serialized directly. API
/// responses use [`AdminUserSummary`].
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub id: AdminUserId,
    pub email: Email,
    /// Argon2 password hash in PHC string format.
    pub password_hash: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin user shape returned by the admin API (no credentials).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserSummary {
    pub id: AdminUserId,
    pub email: Email,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<AdminUser> for AdminUserSummary {
    fn from(user: AdminUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            created_at: user.created_at,
        }
    }
}
