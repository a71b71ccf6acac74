//! Admin admission gate.
//!
//! Runs ahead of every protected admin route. A request is admitted only
//! when it carries a session cookie whose signature verifies and whose
//! record is authenticated and unexpired. Rejections split by surface:
//! API paths get a JSON 401, page paths get a redirect to the login page.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::json;

use crate::models::{SESSION_COOKIE_NAME, SESSION_LIFETIME, SessionRecord};
use crate::state::AppState;

/// Where unauthenticated page requests are sent.
const LOGIN_PATH: &str = "/admin/login";

/// Admission gate for protected admin routes.
///
/// On success the verified [`SessionRecord`] is inserted into request
/// extensions so handlers can read the acting admin's identity.
pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    match session_from_jar(&state, &jar) {
        Some(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        None => reject(request.uri().path()),
    }
}

/// Extract and verify the session from the cookie jar.
///
/// Returns `None` for a missing cookie, a bad signature, a malformed
/// payload, or an expired session. All four cases are treated identically
/// so a probing client learns nothing from the response.
#[must_use]
pub fn session_from_jar(state: &AppState, jar: &CookieJar) -> Option<SessionRecord> {
    let cookie = jar.get(SESSION_COOKIE_NAME)?;
    match state.session_codec().decode_valid(cookie.value()) {
        Ok(session) => Some(session),
        Err(err) => {
            tracing::debug!(error = %err, "Rejected session cookie");
            None
        }
    }
}

/// Build the rejection response for an unauthenticated request.
fn reject(path: &str) -> Response {
    if path.starts_with("/api/") {
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" }))).into_response()
    } else {
        Redirect::to(LOGIN_PATH).into_response()
    }
}

/// Build the session cookie for a freshly issued token.
#[must_use]
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    #[allow(clippy::cast_possible_wrap)] // 7 days in seconds fits i64
    let max_age = time::Duration::seconds(SESSION_LIFETIME.as_secs() as i64);
    Cookie::build((SESSION_COOKIE_NAME, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .path("/")
        .max_age(max_age)
        .build()
}

/// Build an expired cookie that clears the session (logout).
#[must_use]
pub fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, ""))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_splits_api_and_page_paths() {
        let response = reject("/api/admin/submissions");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = reject("/admin/submissions");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            LOGIN_PATH
        );
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("token-value".to_string(), true);
        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.value(), "token-value");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(
            cookie.max_age(),
            Some(time::Duration::days(7))
        );
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie(false);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
        assert_eq!(cookie.secure(), Some(false));
    }
}
