//! Credential verifiers.

use crate::session::UserRole;
use crate::session::password::{PasswordError, verify_password};

/// Decides whether a username/password pair is accepted, and with which role.
pub trait CredentialVerifier: Send + Sync {
    /// Returns the granted role, or `None` when the pair is rejected.
    fn verify(&self, username: &str, password: &str) -> Result<Option<UserRole>, PasswordError>;
}

/// A single plaintext username/password pair.
///
/// Development only: the default pair is `admin` / `admin123`.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    username: String,
    password: String,
    role: UserRole,
}

impl StaticCredentials {
    /// Accepts exactly `username` / `password` and grants `role`.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>, role: UserRole) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            role,
        }
    }
}

impl Default for StaticCredentials {
    fn default() -> Self {
        Self::new("admin", "admin123", UserRole::Admin)
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> Result<Option<UserRole>, PasswordError> {
        Ok((username == self.username && password == self.password).then_some(self.role))
    }
}

/// A username paired with an Argon2id password hash.
#[derive(Debug, Clone)]
pub struct HashedCredentials {
    username: String,
    password_hash: String,
    role: UserRole,
}

impl HashedCredentials {
    /// Accepts `username` with any password matching `password_hash`.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        role: UserRole,
    ) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            role,
        }
    }
}

impl CredentialVerifier for HashedCredentials {
    fn verify(&self, username: &str, password: &str) -> Result<Option<UserRole>, PasswordError> {
        if username != self.username {
            return Ok(None);
        }
        Ok(verify_password(password, &self.password_hash)?.then_some(self.role))
    }
}

impl<V: CredentialVerifier + ?Sized> CredentialVerifier for Box<V> {
    fn verify(&self, username: &str, password: &str) -> Result<Option<UserRole>, PasswordError> {
        (**self).verify(username, password)
    }
}
