//! Database operations for the site `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `admin_users` - Admin panel accounts
//! - `contact_submissions` - Contact form submissions
//! - `replies` - Admin replies to submissions
//!
//! # Migrations
//!
//! Migrations are stored in `crates/site/migrations/` and run via:
//! ```bash
//! cargo run -p meridian-cli -- migrate
//! ```

pub mod admin_users;
pub mod submissions;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use admin_users::AdminUserRepository;
pub use submissions::SubmissionRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Verify the expected schema is present.
///
/// Run once at startup so a deploy against an unmigrated database fails
/// immediately instead of on the first admin request.
///
/// # Errors
///
/// Returns `RepositoryError::DataCorruption` if the `admin_users` table is
/// missing, or `RepositoryError::Database` if the probe query fails.
pub async fn schema_probe(pool: &PgPool) -> Result<(), RepositoryError> {
    let present: bool = sqlx::query_scalar(
        "SELECT EXISTS (
             SELECT 1 FROM information_schema.tables WHERE table_name = 'admin_users'
         )",
    )
    .fetch_one(pool)
    .await?;

    if present {
        Ok(())
    } else {
        Err(RepositoryError::DataCorruption(
            "admin_users table is missing; run `meridian-cli migrate`".to_string(),
        ))
    }
}

/// Map a sqlx error to `Conflict` when it is a unique constraint violation.
pub(crate) fn map_conflict(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(what.to_string());
        }
    }
    RepositoryError::Database(err)
}
