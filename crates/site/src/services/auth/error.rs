//! Authentication error types.

use thiserror::Error;

use meridian_core::EmailError;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email/password combination is wrong.
    ///
    /// Deliberately covers both unknown email and wrong password so the
    /// login endpoint cannot be used to enumerate accounts.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Email address failed validation.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Password does not meet requirements.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// Setup was attempted after admin accounts already exist.
    #[error("admin users already exist")]
    AlreadyBootstrapped,

    /// An account with this email already exists.
    #[error("email already registered")]
    EmailTaken,

    /// Refusing to delete the only remaining admin account.
    #[error("cannot delete the last admin user")]
    LastAdmin,

    /// Admin account not found.
    #[error("admin user not found")]
    UserNotFound,

    /// Password hashing or verification failed unexpectedly.
    #[error("password hash error: {0}")]
    PasswordHash(String),

    /// Database operation failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}
