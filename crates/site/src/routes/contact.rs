//! Public contact form endpoint.
//!
//! The pipeline is rate limit, validate, CAPTCHA, persist, notify, in that
//! order, so an invalid payload never triggers an outbound verification
//! call. CAPTCHA only runs when a token was actually supplied, so a widget
//! that failed to render does not hard-break the form. Persist and notify
//! are independent best-effort steps: a failed notification downgrades to a
//! `warning` field in a success response, and a failed insert still lets
//! the notification go out before the request reports the error.

use axum::{Json, extract::State, http::HeaderMap};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use meridian_core::{Email, ServiceInterest};

use crate::error::{AppError, Result};
use crate::db::SubmissionRepository;
use crate::middleware::{client_ip, contact_key};
use crate::models::NewSubmission;
use crate::state::AppState;

/// Maximum accepted message length in characters.
const MAX_MESSAGE_LENGTH: usize = 5_000;

/// Contact form request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    pub name: String,
    #[serde(default)]
    pub company_name: Option<String>,
    pub email: String,
    pub phone: String,
    pub service_interest: String,
    pub message: String,
    #[serde(default)]
    pub turnstile_token: Option<String>,
}

/// Submit the contact form.
///
/// POST /api/contact
#[instrument(skip_all, fields(service = %form.service_interest))]
pub async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<ContactForm>,
) -> Result<Json<Value>> {
    // Rate limit before any other work.
    let ip = client_ip(&headers);
    let settings = &state.config().contact_rate_limit;
    let decision = state.rate_limiter().check(&contact_key(&ip), settings);
    if !decision.allowed {
        tracing::warn!(ip = %ip, "Contact form rate limited");
        return Err(AppError::RateLimited {
            decision,
            limit: settings.max_requests,
        });
    }

    let submission = validate(&form)?;

    // CAPTCHA runs only when the secret is configured and the client sent
    // a token. A missing token is skipped rather than rejected, so the form
    // keeps working when the widget fails to render. Provider outages are
    // downgraded to a warning instead of blocking the submission.
    let mut warnings: Vec<&str> = Vec::new();
    if let Some(turnstile) = state.turnstile() {
        match form.turnstile_token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => match turnstile.verify(token, Some(&ip)).await {
                Ok(true) => {}
                Ok(false) => {
                    return Err(AppError::Validation(
                        "Captcha verification failed".to_string(),
                    ));
                }
                Err(e) => {
                    tracing::error!(error = %e, "Turnstile verification request failed");
                    warnings.push("Captcha verification could not be completed");
                }
            },
            None => {
                tracing::warn!(ip = %ip, "Captcha token missing; skipping verification");
            }
        }
    }

    let inserted = SubmissionRepository::new(state.pool())
        .insert(&submission)
        .await;
    if let Err(e) = &inserted {
        tracing::error!(error = %e, "Failed to persist contact submission");
    }

    // The notification fires whether or not the insert succeeded, so a
    // storage outage never silently swallows an inquiry.
    match state.email() {
        Some(email) => {
            if let Err(e) = email.send_submission_notification(&submission).await {
                tracing::warn!(error = %e, "Notification email failed");
                warnings.push("Submission received but the notification email could not be sent");
            }
        }
        None => {
            tracing::warn!("Email delivery not configured; skipping notification");
        }
    }

    let stored = inserted?;
    tracing::info!(submission_id = %stored.id, "Contact submission stored");

    let mut body = json!({ "success": true, "submissionId": stored.id });
    if let (false, Some(object)) = (warnings.is_empty(), body.as_object_mut()) {
        object.insert("warning".to_string(), Value::String(warnings.join("; ")));
    }
    Ok(Json(body))
}

/// Validate and normalize the form into a new submission.
fn validate(form: &ContactForm) -> Result<NewSubmission> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }

    let email = Email::parse(&form.email).map_err(|_| {
        AppError::Validation("Please enter a valid email address".to_string())
    })?;

    let phone = form.phone.trim();
    if phone.is_empty() {
        return Err(AppError::Validation("Phone is required".to_string()));
    }

    let service_interest = form.service_interest.trim();
    if service_interest.is_empty() {
        return Err(AppError::Validation(
            "Service interest is required".to_string(),
        ));
    }

    let message = form.message.trim();
    if message.is_empty() {
        return Err(AppError::Validation("Message is required".to_string()));
    }
    if message.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(AppError::Validation(format!(
            "Message must be at most {MAX_MESSAGE_LENGTH} characters"
        )));
    }

    let company_name = form
        .company_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string);

    Ok(NewSubmission {
        name: name.to_string(),
        company_name,
        email,
        phone: phone.to_string(),
        service_interest: ServiceInterest::new(service_interest),
        message: message.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> ContactForm {
        ContactForm {
            name: "  Dana Reyes ".to_string(),
            company_name: Some("  ".to_string()),
            email: "Dana@Example.COM".to_string(),
            phone: "+1 555 0100".to_string(),
            service_interest: "cloudComputing".to_string(),
            message: "We need help with a migration.".to_string(),
            turnstile_token: None,
        }
    }

    #[test]
    fn test_validate_trims_and_normalizes() {
        let submission = validate(&form()).unwrap();
        assert_eq!(submission.name, "Dana Reyes");
        assert_eq!(submission.email.as_str(), "dana@example.com");
        // Whitespace-only company collapses to absent.
        assert_eq!(submission.company_name, None);
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        let mut bad = form();
        bad.name = " ".to_string();
        assert!(matches!(
            validate(&bad).unwrap_err(),
            AppError::Validation(msg) if msg == "Name is required"
        ));

        let mut bad = form();
        bad.email = "not-an-email".to_string();
        assert!(matches!(validate(&bad).unwrap_err(), AppError::Validation(_)));

        let mut bad = form();
        bad.message = String::new();
        assert!(matches!(
            validate(&bad).unwrap_err(),
            AppError::Validation(msg) if msg == "Message is required"
        ));
    }

    #[test]
    fn test_validate_caps_message_length() {
        let mut bad = form();
        bad.message = "x".repeat(MAX_MESSAGE_LENGTH + 1);
        assert!(validate(&bad).is_err());

        let mut ok = form();
        ok.message = "x".repeat(MAX_MESSAGE_LENGTH);
        assert!(validate(&ok).is_ok());
    }

    #[test]
    fn test_unknown_service_key_is_accepted() {
        let mut form = form();
        form.service_interest = "somethingNew".to_string();
        let submission = validate(&form).unwrap();
        assert_eq!(submission.service_interest.key(), "somethingNew");
    }
}
