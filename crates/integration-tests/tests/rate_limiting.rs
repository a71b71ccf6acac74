//! Fixed-window rate limiter laws, including under concurrency.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};

use meridian_site::config::RateLimitSettings;
use meridian_site::middleware::RateLimiter;

fn settings(window_secs: u64, max_requests: u32) -> RateLimitSettings {
    RateLimitSettings {
        window: Duration::from_secs(window_secs),
        max_requests,
    }
}

#[test]
fn exactly_max_requests_pass_per_window() {
    let limiter = RateLimiter::new();
    let settings = settings(3600, 5);
    let now = Utc::now();

    let allowed = (0..20)
        .filter(|_| limiter.check_at("k", &settings, now).allowed)
        .count();

    assert_eq!(allowed, 5);
}

#[test]
fn window_rolls_over_cleanly() {
    let limiter = RateLimiter::new();
    let settings = settings(60, 2);
    let start = Utc::now();

    assert!(limiter.check_at("k", &settings, start).allowed);
    assert!(limiter.check_at("k", &settings, start).allowed);
    assert!(!limiter.check_at("k", &settings, start).allowed);

    // Next window: quota is fresh, and only the cap passes again.
    let next = start + TimeDelta::seconds(61);
    assert!(limiter.check_at("k", &settings, next).allowed);
    assert!(limiter.check_at("k", &settings, next).allowed);
    assert!(!limiter.check_at("k", &settings, next).allowed);
}

#[test]
fn remaining_counts_down_to_zero() {
    let limiter = RateLimiter::new();
    let settings = settings(3600, 3);
    let now = Utc::now();

    let remaining: Vec<u32> = (0..4)
        .map(|_| limiter.check_at("k", &settings, now).remaining)
        .collect();

    assert_eq!(remaining, vec![2, 1, 0, 0]);
}

#[test]
fn concurrent_checks_never_exceed_the_cap() {
    let limiter = Arc::new(RateLimiter::new());
    let settings = settings(3600, 50);
    let now = Utc::now();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let limiter = Arc::clone(&limiter);
            std::thread::spawn(move || {
                (0..100)
                    .filter(|_| limiter.check_at("shared", &settings, now).allowed)
                    .count()
            })
        })
        .collect();

    let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(total, 50);
}

#[test]
fn concurrent_keys_do_not_interfere() {
    let limiter = Arc::new(RateLimiter::new());
    let settings = settings(3600, 10);
    let now = Utc::now();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let limiter = Arc::clone(&limiter);
            std::thread::spawn(move || {
                let key = format!("key-{i}");
                (0..25)
                    .filter(|_| limiter.check_at(&key, &settings, now).allowed)
                    .count()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 10);
    }
}

#[test]
fn sweep_is_equivalent_to_expiry_for_callers() {
    let limiter = RateLimiter::new();
    let settings = settings(60, 1);
    let start = Utc::now();

    assert!(limiter.check_at("k", &settings, start).allowed);

    // Whether or not the sweep ran, an expired window admits the next
    // request identically.
    let later = start + TimeDelta::seconds(120);
    limiter.sweep_expired(later);
    assert!(limiter.check_at("k", &settings, later).allowed);
    assert!(!limiter.check_at("k", &settings, later).allowed);
}
