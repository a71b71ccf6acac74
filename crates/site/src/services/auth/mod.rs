//! Authentication service.
//!
//! Password login for admin accounts, first-admin bootstrap, and admin
//! account management.

mod error;

pub use error::AuthError;

use std::sync::OnceLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use meridian_core::{AdminUserId, Email};

use crate::db::{AdminUserRepository, RepositoryError};
use crate::models::AdminUser;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
pub struct AuthService<'a> {
    admins: AdminUserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            admins: AdminUserRepository::new(pool),
        }
    }

    /// Login with email and password.
    ///
    /// Unknown emails and wrong passwords both return `InvalidCredentials`,
    /// and a dummy verification runs on the unknown-email path so the two
    /// cases are not distinguishable by response time.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<AdminUser, AuthError> {
        let Ok(email) = Email::parse(email) else {
            verify_against_dummy(password);
            return Err(AuthError::InvalidCredentials);
        };

        let Some(user) = self.admins.get_by_email(&email).await? else {
            verify_against_dummy(password);
            return Err(AuthError::InvalidCredentials);
        };

        verify_password(password, &user.password_hash)?;

        Ok(user)
    }

    /// Create the first admin account.
    ///
    /// Only available while no admin accounts exist. Once one does, this
    /// path is closed permanently and accounts are created by existing
    /// admins.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AlreadyBootstrapped` if any admin exists.
    /// Returns `AuthError::InvalidEmail` or `AuthError::WeakPassword` on
    /// invalid input.
    pub async fn setup_first_admin(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<AdminUser, AuthError> {
        if self.admins.count().await? > 0 {
            return Err(AuthError::AlreadyBootstrapped);
        }

        self.create_admin(email, password, name).await
    }

    /// Create a new admin account.
    ///
    /// When no name is given, the local part of the email address is used.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` or `AuthError::WeakPassword` on
    /// invalid input, and `AuthError::EmailTaken` if the email is already
    /// registered.
    pub async fn create_admin(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<AdminUser, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;
        let name = name_or_local_part(name, &email);

        let user = self
            .admins
            .create(&email, &password_hash, Some(&name))
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::EmailTaken,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Delete an admin account.
    ///
    /// Refuses to remove the last remaining account, which would lock
    /// everyone out of the panel.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::LastAdmin` if only one account exists.
    /// Returns `AuthError::UserNotFound` if no such account exists.
    pub async fn delete_admin(&self, id: AdminUserId) -> Result<(), AuthError> {
        if self.admins.count().await? <= 1 {
            return Err(AuthError::LastAdmin);
        }

        self.admins.delete(id).await.map_err(|e| match e {
            RepositoryError::NotFound => AuthError::UserNotFound,
            other => AuthError::Repository(other),
        })
    }

    /// List all admin accounts.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the query fails.
    pub async fn list_admins(&self) -> Result<Vec<AdminUser>, AuthError> {
        Ok(self.admins.list_all().await?)
    }

    /// Whether any admin account exists (controls setup availability).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the query fails.
    pub async fn any_admin_exists(&self) -> Result<bool, AuthError> {
        Ok(self.admins.count().await? > 0)
    }
}

/// Display name for a new account, falling back to the email local part.
fn name_or_local_part(name: Option<&str>, email: &Email) -> String {
    name.map(str::trim)
        .filter(|n| !n.is_empty())
        .map_or_else(|| email.local_part().to_string(), ToString::to_string)
}

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password with Argon2 and a random salt.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, stored_hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| AuthError::PasswordHash(e.to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Run a verification against a throwaway hash.
///
/// Keeps the unknown-email login path as slow as the wrong-password path.
fn verify_against_dummy(password: &str) {
    static DUMMY_HASH: OnceLock<String> = OnceLock::new();
    let hash = DUMMY_HASH
        .get_or_init(|| hash_password("timing-equalizer-only").unwrap_or_default());
    if let Ok(parsed) = PasswordHash::new(hash) {
        let _ = Argon2::default().verify_password(password.as_bytes(), &parsed);
    }
}
