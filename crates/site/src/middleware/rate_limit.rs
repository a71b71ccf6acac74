//! Fixed-window rate limiting.
//!
//! Counts requests per key inside a fixed window. The first request for a
//! key opens a window; requests past the cap are rejected until the window
//! expires, at which point the next request opens a fresh one. A background
//! sweep drops expired entries so abandoned keys do not accumulate.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use axum::http::HeaderMap;
use chrono::{DateTime, TimeDelta, Utc};

use crate::config::RateLimitSettings;

/// How often the background sweep runs.
const CLEANUP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Requests left in the current window (0 when rejected).
    pub remaining: u32,
    /// When the current window expires.
    pub reset_time: DateTime<Utc>,
}

impl RateLimitDecision {
    /// Seconds until the window resets, rounded up, never negative.
    #[must_use]
    pub fn retry_after_secs(&self, now: DateTime<Utc>) -> i64 {
        let millis = u64::try_from((self.reset_time - now).num_milliseconds()).unwrap_or(0);
        i64::try_from(millis.div_ceil(1_000)).unwrap_or(i64::MAX)
    }
}

#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: u32,
    reset_time: DateTime<Utc>,
}

/// In-memory fixed-window rate limiter.
///
/// State is per-process; a multi-instance deployment rate-limits per
/// instance.
#[derive(Debug, Default)]
pub struct RateLimiter {
    entries: Mutex<HashMap<String, WindowEntry>>,
}

impl RateLimiter {
    /// Create an empty rate limiter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check (and count) a request for `key` against `settings`.
    ///
    /// Allowed requests consume one slot. Rejected requests do not extend
    /// the window.
    pub fn check(&self, key: &str, settings: &RateLimitSettings) -> RateLimitDecision {
        self.check_at(key, settings, Utc::now())
    }

    /// [`Self::check`] with an explicit clock, for tests.
    pub fn check_at(
        &self,
        key: &str,
        settings: &RateLimitSettings,
        now: DateTime<Utc>,
    ) -> RateLimitDecision {
        let window = TimeDelta::from_std(settings.window).unwrap_or_else(|_| TimeDelta::zero());
        let mut entries = self.lock_entries();

        let entry = entries.entry(key.to_string()).or_insert(WindowEntry {
            count: 0,
            reset_time: now + window,
        });

        // Expired window: start over.
        if entry.reset_time <= now {
            entry.count = 0;
            entry.reset_time = now + window;
        }

        if entry.count >= settings.max_requests {
            return RateLimitDecision {
                allowed: false,
                remaining: 0,
                reset_time: entry.reset_time,
            };
        }

        entry.count += 1;
        RateLimitDecision {
            allowed: true,
            remaining: settings.max_requests - entry.count,
            reset_time: entry.reset_time,
        }
    }

    /// Drop entries whose windows have expired. Returns how many were removed.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.lock_entries();
        let before = entries.len();
        entries.retain(|_, entry| entry.reset_time > now);
        before - entries.len()
    }

    /// Number of live keys, for observability.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    /// Whether no keys are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Spawn the periodic cleanup sweep.
    pub fn spawn_cleanup(limiter: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let removed = limiter.sweep_expired(Utc::now());
                if removed > 0 {
                    tracing::debug!(removed, live = limiter.len(), "Rate limit sweep");
                }
            }
        })
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, WindowEntry>> {
        // A poisoned lock only means another thread panicked mid-check;
        // the map itself is still coherent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Best-effort client IP from proxy headers.
///
/// Checks `X-Forwarded-For` (first hop), then `X-Real-IP`, then
/// `CF-Connecting-IP`. Falls back to `"unknown"`, which collapses all
/// unidentifiable clients into one shared bucket.
#[must_use]
pub fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = header_str(headers, "x-forwarded-for") {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    if let Some(real_ip) = header_str(headers, "x-real-ip") {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }
    if let Some(cf_ip) = header_str(headers, "cf-connecting-ip") {
        let cf_ip = cf_ip.trim();
        if !cf_ip.is_empty() {
            return cf_ip.to_string();
        }
    }
    "unknown".to_string()
}

/// Rate limit key for the contact endpoint.
#[must_use]
pub fn contact_key(ip: &str) -> String {
    format!("contact:{ip}")
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn settings(window_secs: u64, max_requests: u32) -> RateLimitSettings {
        RateLimitSettings {
            window: Duration::from_secs(window_secs),
            max_requests,
        }
    }

    #[test]
    fn test_allows_up_to_max_then_rejects() {
        let limiter = RateLimiter::new();
        let settings = settings(3600, 3);
        let now = Utc::now();

        for expected_remaining in [2, 1, 0] {
            let decision = limiter.check_at("contact:1.2.3.4", &settings, now);
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let decision = limiter.check_at("contact:1.2.3.4", &settings, now);
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = RateLimiter::new();
        let settings = settings(3600, 1);
        let now = Utc::now();

        assert!(limiter.check_at("contact:1.1.1.1", &settings, now).allowed);
        assert!(!limiter.check_at("contact:1.1.1.1", &settings, now).allowed);
        assert!(limiter.check_at("contact:2.2.2.2", &settings, now).allowed);
    }

    #[test]
    fn test_window_expiry_resets_count() {
        let limiter = RateLimiter::new();
        let settings = settings(60, 1);
        let start = Utc::now();

        assert!(limiter.check_at("k", &settings, start).allowed);
        assert!(!limiter.check_at("k", &settings, start).allowed);

        // One second before expiry: still rejected.
        let almost = start + TimeDelta::seconds(59);
        assert!(!limiter.check_at("k", &settings, almost).allowed);

        // At expiry: fresh window.
        let expired = start + TimeDelta::seconds(60);
        let decision = limiter.check_at("k", &settings, expired);
        assert!(decision.allowed);
        assert_eq!(decision.reset_time, expired + TimeDelta::seconds(60));
    }

    #[test]
    fn test_rejections_do_not_extend_window() {
        let limiter = RateLimiter::new();
        let settings = settings(60, 1);
        let start = Utc::now();

        let first = limiter.check_at("k", &settings, start);
        let rejected = limiter.check_at("k", &settings, start + TimeDelta::seconds(30));
        assert!(!rejected.allowed);
        assert_eq!(rejected.reset_time, first.reset_time);
    }

    #[test]
    fn test_retry_after_rounds_up() {
        let now = Utc::now();
        let decision = RateLimitDecision {
            allowed: false,
            remaining: 0,
            reset_time: now + TimeDelta::milliseconds(1_500),
        };
        assert_eq!(decision.retry_after_secs(now), 2);

        let sub_second = RateLimitDecision {
            allowed: false,
            remaining: 0,
            reset_time: now + TimeDelta::milliseconds(1),
        };
        assert_eq!(sub_second.retry_after_secs(now), 1);

        let past = RateLimitDecision {
            allowed: false,
            remaining: 0,
            reset_time: now - TimeDelta::seconds(5),
        };
        assert_eq!(past.retry_after_secs(now), 0);
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let limiter = RateLimiter::new();
        let settings = settings(60, 5);
        let now = Utc::now();

        limiter.check_at("old", &settings, now - TimeDelta::seconds(120));
        limiter.check_at("fresh", &settings, now);
        assert_eq!(limiter.len(), 2);

        let removed = limiter.sweep_expired(now);
        assert_eq!(removed, 1);
        assert_eq!(limiter.len(), 1);

        // The surviving window still counts prior requests.
        let decision = limiter.check_at("fresh", &settings, now);
        assert_eq!(decision.remaining, 3);
    }

    #[test]
    fn test_client_ip_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
        headers.insert("x-real-ip", "198.51.100.2".parse().unwrap());
        assert_eq!(client_ip(&headers), "203.0.113.7");

        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "198.51.100.2".parse().unwrap());
        headers.insert("cf-connecting-ip", "192.0.2.9".parse().unwrap());
        assert_eq!(client_ip(&headers), "198.51.100.2");

        let mut headers = HeaderMap::new();
        headers.insert("cf-connecting-ip", "192.0.2.9".parse().unwrap());
        assert_eq!(client_ip(&headers), "192.0.2.9");

        assert_eq!(client_ip(&HeaderMap::new()), "unknown");
    }

    #[test]
    fn test_contact_key() {
        assert_eq!(contact_key("1.2.3.4"), "contact:1.2.3.4");
    }
}
