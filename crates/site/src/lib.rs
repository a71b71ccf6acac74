//! Meridian site server library.
//!
//! The public marketing-site API (contact form) and the admin panel API in
//! one binary. Exposed as a library so integration tests can exercise the
//! admission gate, rate limiter, and session codec directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
