//! HTTP middleware for the site.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, outermost)
//! 2. `TraceLayer` (request tracing)
//! 3. Admission gate (protected admin routes only)

pub mod auth;
pub mod rate_limit;

pub use auth::{clear_session_cookie, require_admin, session_cookie, session_from_jar};
pub use rate_limit::{RateLimitDecision, RateLimiter, client_ip, contact_key};
