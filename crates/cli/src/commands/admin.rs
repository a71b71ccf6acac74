//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a new admin user
//! meridian-cli admin create -e admin@example.com -p 'a strong password' -n "Admin Name"
//!
//! # List admin users
//! meridian-cli admin list
//! ```
//!
//! # Environment Variables
//!
//! - `SITE_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)

use sqlx::PgPool;
use thiserror::Error;

use meridian_site::services::AuthService;
use meridian_site::services::auth::AuthError;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Auth service error (validation, conflicts).
    #[error("{0}")]
    Auth(#[from] AuthError),
}

/// Create a new admin user.
///
/// # Errors
///
/// Returns `AdminError` if the connection fails, the email or password is
/// invalid, or the email is already registered.
pub async fn create_user(
    email: &str,
    password: &str,
    name: Option<&str>,
) -> Result<(), AdminError> {
    let pool = connect().await?;
    let user = AuthService::new(&pool)
        .create_admin(email, password, name)
        .await?;

    tracing::info!(
        admin_user_id = %user.id,
        email = %user.email,
        "Admin user created"
    );
    Ok(())
}

/// List all admin users.
///
/// # Errors
///
/// Returns `AdminError` if the connection or query fails.
pub async fn list_users() -> Result<(), AdminError> {
    let pool = connect().await?;
    let users = AuthService::new(&pool).list_admins().await?;

    if users.is_empty() {
        tracing::info!("No admin users found. Create one with: meridian-cli admin create");
        return Ok(());
    }

    #[allow(clippy::print_stdout)]
    for user in users {
        println!(
            "{}  {}  {}  created {}",
            user.id,
            user.email,
            user.name.as_deref().unwrap_or("-"),
            user.created_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}

async fn connect() -> Result<PgPool, AdminError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("SITE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| AdminError::MissingEnvVar("SITE_DATABASE_URL"))?;

    Ok(PgPool::connect(&database_url).await?)
}
