//! Session error types.

use thiserror::Error;

use crate::session::password::PasswordError;
use crate::store::StoreError;

/// Errors that can occur in the session gate.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Username or password did not match.
    #[error("Authentication failed: invalid username or password")]
    AuthFailure,

    /// An operation needs a signed-in user and there is none.
    #[error("Not signed in")]
    NotSignedIn,

    /// The configured password hash could not be checked.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// The underlying store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionError {
    /// Returns the stable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AuthFailure => "AUTH_FAILURE",
            Self::NotSignedIn => "NOT_SIGNED_IN",
            Self::Password(_) => "PASSWORD_ERROR",
            Self::Store(_) => "STORAGE_ERROR",
        }
    }
}
