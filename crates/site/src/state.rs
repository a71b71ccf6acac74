//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::SiteConfig;
use crate::middleware::RateLimiter;
use crate::services::{ResendClient, SessionCodec, TurnstileClient};

/// Error building application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("session codec error: {0}")]
    Session(#[from] crate::services::SessionError),
    #[error("email client error: {0}")]
    Email(#[from] crate::services::EmailError),
    #[error("turnstile client error: {0}")]
    Turnstile(#[from] crate::services::TurnstileError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    pool: PgPool,
    session_codec: SessionCodec,
    rate_limiter: Arc<RateLimiter>,
    email: Option<ResendClient>,
    turnstile: Option<TurnstileClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The email and Turnstile clients are built only when configured;
    /// their absence degrades those features rather than failing startup.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured client cannot be constructed.
    pub fn new(config: SiteConfig, pool: PgPool) -> Result<Self, StateError> {
        let session_codec = SessionCodec::new(&config.session_secret)?;
        let email = config.email.as_ref().map(ResendClient::new).transpose()?;
        let turnstile = config
            .turnstile
            .as_ref()
            .map(TurnstileClient::new)
            .transpose()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                session_codec,
                rate_limiter: Arc::new(RateLimiter::new()),
                email,
                turnstile,
            }),
        })
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the session token codec.
    #[must_use]
    pub fn session_codec(&self) -> &SessionCodec {
        &self.inner.session_codec
    }

    /// Get the shared rate limiter.
    #[must_use]
    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.inner.rate_limiter
    }

    /// Get the email client, if email delivery is configured.
    #[must_use]
    pub fn email(&self) -> Option<&ResendClient> {
        self.inner.email.as_ref()
    }

    /// Get the Turnstile client, if CAPTCHA verification is configured.
    #[must_use]
    pub fn turnstile(&self) -> Option<&TurnstileClient> {
        self.inner.turnstile.as_ref()
    }
}
