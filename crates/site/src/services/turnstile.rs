//! Cloudflare Turnstile verification client.

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

use crate::config::TurnstileConfig;

/// Turnstile server-side verification endpoint.
const SITEVERIFY_URL: &str = "https://challenges.cloudflare.com/turnstile/v0/siteverify";

/// Timeout for verification requests.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Errors that can occur during Turnstile verification.
#[derive(Debug, Error)]
pub enum TurnstileError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Response from the siteverify endpoint.
#[derive(Debug, Deserialize)]
struct SiteverifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// Turnstile verification client.
#[derive(Clone)]
pub struct TurnstileClient {
    client: Client,
    secret_key: SecretString,
}

impl TurnstileClient {
    /// Create a new Turnstile client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &TurnstileConfig) -> Result<Self, TurnstileError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            secret_key: config.secret_key.clone(),
        })
    }

    /// Verify a client-supplied Turnstile token.
    ///
    /// Returns whether the challenge passed. Cloudflare's error codes are
    /// logged, not surfaced, since they describe the token rather than our
    /// request.
    ///
    /// # Errors
    ///
    /// Returns error if the verification request itself fails.
    pub async fn verify(
        &self,
        token: &str,
        remote_ip: Option<&str>,
    ) -> Result<bool, TurnstileError> {
        let mut form = vec![
            ("secret", self.secret_key.expose_secret().to_string()),
            ("response", token.to_string()),
        ];
        if let Some(ip) = remote_ip {
            form.push(("remoteip", ip.to_string()));
        }

        let response: SiteverifyResponse = self
            .client
            .post(SITEVERIFY_URL)
            .form(&form)
            .send()
            .await?
            .json()
            .await?;

        if !response.success {
            tracing::warn!(
                error_codes = ?response.error_codes,
                "Turnstile verification failed"
            );
        }

        Ok(response.success)
    }
}
