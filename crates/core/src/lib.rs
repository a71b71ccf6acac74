//! Meridian Core - Shared types library.
//!
//! This crate provides common types used across all Meridian components:
//! - `site` - The public marketing site API and admin panel API
//! - `cli` - Command-line tools for migrations and admin management
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, statuses, and
//!   service-interest keys

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
