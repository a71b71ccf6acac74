//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`, and every error body is `{"error": "..."}` JSON.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::middleware::RateLimitDecision;
use crate::services::auth::AuthError;

/// Application-level error type for the site.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Client input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request is not authenticated.
    #[error("Unauthorized")]
    Unauthorized,

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited {
        decision: RateLimitDecision,
        limit: u32,
    },

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error should be reported to Sentry.
    const fn is_server_error(&self) -> bool {
        match self {
            Self::Database(RepositoryError::NotFound) => false,
            Self::Database(_) | Self::Internal(_) => true,
            Self::Auth(err) => matches!(
                err,
                AuthError::PasswordHash(_) | AuthError::Repository(_)
            ),
            _ => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        if let Self::RateLimited { decision, limit } = &self {
            return rate_limited_response(decision, *limit);
        }

        let (status, message) = match &self {
            Self::Database(RepositoryError::NotFound) => {
                (StatusCode::NOT_FOUND, "Not found".to_string())
            }
            Self::Database(_) | Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            Self::Auth(err) => auth_response(err),
            Self::Validation(message) => (StatusCode::BAD_REQUEST, message.clone()),
            Self::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            Self::RateLimited { .. } => unreachable!("handled above"),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Status and client-facing message for an authentication error.
///
/// Internal details are never exposed; the strings here are the API
/// contract for the admin panel frontend.
fn auth_response(err: &AuthError) -> (StatusCode, String) {
    match err {
        AuthError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            "Invalid email or password".to_string(),
        ),
        AuthError::AlreadyBootstrapped => (
            StatusCode::BAD_REQUEST,
            "Admin users already exist. Use the login page instead.".to_string(),
        ),
        AuthError::EmailTaken => (
            StatusCode::CONFLICT,
            "An account with this email already exists".to_string(),
        ),
        AuthError::LastAdmin => (
            StatusCode::BAD_REQUEST,
            "Cannot delete the last admin user".to_string(),
        ),
        AuthError::UserNotFound => (StatusCode::NOT_FOUND, "Admin user not found".to_string()),
        AuthError::InvalidEmail(_) => {
            (StatusCode::BAD_REQUEST, "Invalid email address".to_string())
        }
        AuthError::WeakPassword(message) => (StatusCode::BAD_REQUEST, message.clone()),
        AuthError::PasswordHash(_) | AuthError::Repository(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        ),
    }
}

/// 429 response carrying the standard rate limit headers.
fn rate_limited_response(decision: &RateLimitDecision, limit: u32) -> Response {
    let retry_after = decision.retry_after_secs(Utc::now());

    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(json!({ "error": "Too many requests. Please try again later." })),
    )
        .into_response();

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
        headers.insert(RETRY_AFTER, value);
    }
    if let Ok(value) = HeaderValue::from_str(&limit.to_string()) {
        headers.insert("x-ratelimit-limit", value);
    }
    headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
    if let Ok(value) = HeaderValue::from_str(&decision.reset_time.to_rfc3339()) {
        headers.insert("x-ratelimit-reset", value);
    }

    response
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_status_codes() {
        fn status_of(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            status_of(AppError::NotFound("Submission".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status_of(AppError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(AppError::Validation("bad".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::Auth(AuthError::AlreadyBootstrapped)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Auth(AuthError::LastAdmin)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Internal("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_rate_limited_sets_headers() {
        let decision = RateLimitDecision {
            allowed: false,
            remaining: 0,
            reset_time: Utc::now() + TimeDelta::seconds(90),
        };
        let response = AppError::RateLimited {
            decision,
            limit: 5,
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let headers = response.headers();
        assert_eq!(headers.get("x-ratelimit-limit").unwrap(), "5");
        assert_eq!(headers.get("x-ratelimit-remaining").unwrap(), "0");
        assert!(headers.contains_key("x-ratelimit-reset"));

        let retry_after: i64 = headers
            .get(RETRY_AFTER)
            .unwrap()
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        assert!((1..=90).contains(&retry_after));
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let response = AppError::Internal("pool exhausted at 10.0.0.5".to_string());
        let body = format!("{response}");
        // Display keeps the detail for logs...
        assert!(body.contains("pool exhausted"));
        // ...but the HTTP body must not.
        let http = response.into_response();
        assert_eq!(http.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
