//! Resend API client for transactional email.
//!
//! Sends the new-submission notification to the team inbox and reply emails
//! to the original submitter. Delivery is best-effort at the call sites: a
//! failed send never rolls back the database write it follows.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use thiserror::Error;

use crate::config::EmailConfig;
use crate::models::{ContactSubmission, NewSubmission};

/// Resend send endpoint.
const SEND_URL: &str = "https://api.resend.com/emails";

/// Timeout for outbound email requests.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Errors that can occur when sending email through Resend.
#[derive(Debug, Error)]
pub enum EmailError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Client could not be constructed.
    #[error("client error: {0}")]
    Client(String),
}

/// Outbound message body for the Resend send endpoint.
#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: String,
    html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

/// Resend API client.
#[derive(Clone)]
pub struct ResendClient {
    client: reqwest::Client,
    from_address: String,
    notify_address: String,
}

impl ResendClient {
    /// Create a new Resend API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", config.api_key.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| EmailError::Client(format!("invalid API key format: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            from_address: config.from_address.clone(),
            notify_address: config.notify_address.clone(),
        })
    }

    /// Notify the team inbox about a new contact submission.
    ///
    /// Takes the validated form data rather than the stored row so the
    /// notification can still go out when the insert failed.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the API rejects the message.
    pub async fn send_submission_notification(
        &self,
        submission: &NewSubmission,
    ) -> Result<(), EmailError> {
        let request = SendRequest {
            from: &self.from_address,
            to: [self.notify_address.as_str()],
            subject: format!("New contact form submission from {}", submission.name),
            html: notification_html(submission),
            reply_to: Some(submission.email.as_str()),
        };

        self.send(&request).await
    }

    /// Send an admin reply to the person who submitted the form.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the API rejects the message.
    pub async fn send_reply(
        &self,
        submission: &ContactSubmission,
        message: &str,
        admin_name: Option<&str>,
    ) -> Result<(), EmailError> {
        let request = SendRequest {
            from: &self.from_address,
            to: [submission.email.as_str()],
            subject: format!(
                "Re: Your {} inquiry",
                submission.service_interest.display_name()
            ),
            html: reply_html(submission, message, admin_name),
            reply_to: None,
        };

        self.send(&request).await
    }

    async fn send(&self, request: &SendRequest<'_>) -> Result<(), EmailError> {
        let response = self.client.post(SEND_URL).json(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EmailError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}

/// HTML body for the team notification email.
fn notification_html(submission: &NewSubmission) -> String {
    let company = submission
        .company_name
        .as_deref()
        .map_or_else(String::new, |company| {
            format!("<p><strong>Company:</strong> {}</p>", escape_html(company))
        });

    format!(
        "<h2>New contact form submission</h2>\
         <p><strong>Name:</strong> {name}</p>\
         {company}\
         <p><strong>Email:</strong> {email}</p>\
         <p><strong>Phone:</strong> {phone}</p>\
         <p><strong>Service:</strong> {service}</p>\
         <p><strong>Message:</strong></p>\
         <p>{message}</p>",
        name = escape_html(&submission.name),
        email = escape_html(submission.email.as_str()),
        phone = escape_html(&submission.phone),
        service = escape_html(submission.service_interest.display_name()),
        message = multiline_html(&submission.message),
    )
}

/// HTML body for a reply email.
fn reply_html(submission: &ContactSubmission, message: &str, admin_name: Option<&str>) -> String {
    let signature = admin_name.map_or_else(|| "The Meridian Team".to_string(), escape_html);

    format!(
        "<p>Hi {name},</p>\
         <p>{message}</p>\
         <p>Best regards,<br>{signature}</p>\
         <hr>\
         <p style=\"color:#666;font-size:12px\">In reply to your message:</p>\
         <blockquote style=\"color:#666;font-size:12px\">{original}</blockquote>",
        name = escape_html(&submission.name),
        message = multiline_html(message),
        original = multiline_html(&submission.message),
    )
}

/// Escape text for embedding in HTML.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escape text and turn newlines into `<br>`.
fn multiline_html(text: &str) -> String {
    escape_html(text).replace('\n', "<br>")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use meridian_core::{Email, ServiceInterest, SubmissionId, SubmissionStatus};

    fn new_submission() -> NewSubmission {
        NewSubmission {
            name: "Dana <script>".to_string(),
            company_name: Some("Acme & Sons".to_string()),
            email: Email::parse("dana@acme.example.com").unwrap(),
            phone: "+1 555 0100".to_string(),
            service_interest: ServiceInterest::new("cloudComputing"),
            message: "line one\nline two".to_string(),
        }
    }

    fn submission() -> ContactSubmission {
        let form = new_submission();
        ContactSubmission {
            id: SubmissionId::generate(),
            name: form.name,
            company_name: form.company_name,
            email: form.email,
            phone: form.phone,
            service_interest: form.service_interest,
            message: form.message,
            is_read: false,
            status: SubmissionStatus::New,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>\"x\" & 'y'</b>"),
            "&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_notification_html_escapes_user_input() {
        let html = notification_html(&new_submission());
        assert!(!html.contains("<script>"));
        assert!(html.contains("Dana &lt;script&gt;"));
        assert!(html.contains("Acme &amp; Sons"));
        assert!(html.contains("line one<br>line two"));
        assert!(html.contains("Cloud Computing"));
    }

    #[test]
    fn test_reply_html_includes_signature_and_quote() {
        let html = reply_html(&submission(), "We can help.", Some("Sam"));
        assert!(html.contains("Hi Dana &lt;script&gt;,"));
        assert!(html.contains("We can help."));
        assert!(html.contains("Best regards,<br>Sam"));
        assert!(html.contains("line one<br>line two"));

        let html = reply_html(&submission(), "We can help.", None);
        assert!(html.contains("The Meridian Team"));
    }
}
