//! Admin login, logout, and session status.
//!
//! These routes sit outside the admission gate; login has to be reachable
//! without a session.

use axum::{Json, extract::State};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::{clear_session_cookie, session_cookie, session_from_jar};
use crate::services::AuthService;
use crate::state::AppState;

/// Auth request body: `{email, password}` to log in, `{action:"logout"}`
/// to log out.
#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Log in with email and password, or log out with `{action:"logout"}`.
///
/// POST /api/admin/auth
///
/// On login success, sets the signed session cookie. Failures are
/// uniformly 401 "Invalid email or password".
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<AuthRequest>,
) -> Result<(CookieJar, Json<Value>)> {
    if body.action.as_deref() == Some("logout") {
        let jar = jar.add(clear_session_cookie(state.config().is_production()));
        return Ok((jar, Json(json!({ "success": true }))));
    }

    let (Some(email), Some(password)) = (body.email.as_deref(), body.password.as_deref()) else {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    };

    let user = AuthService::new(state.pool())
        .authenticate(email, password)
        .await?;

    tracing::info!(admin_user_id = %user.id, "Admin logged in");

    let token = state.session_codec().issue(user.id);
    let jar = jar.add(session_cookie(token, state.config().is_production()));

    Ok((jar, Json(json!({ "success": true }))))
}

/// Report whether the request carries a live session.
///
/// GET /api/admin/auth
pub async fn status(State(state): State<AppState>, jar: CookieJar) -> Json<Value> {
    let authenticated = session_from_jar(&state, &jar).is_some();
    Json(json!({ "authenticated": authenticated }))
}

/// Log out by clearing the session cookie.
///
/// DELETE /api/admin/auth
///
/// Tokens are stateless, so "logout" is purely client-side: the cookie is
/// expired. The token itself stays valid until its expiry.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<Value>) {
    let jar = jar.add(clear_session_cookie(state.config().is_production()));
    (jar, Json(json!({ "success": true })))
}
