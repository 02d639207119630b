//! Session gate: credential check and the current-user marker.
//!
//! Credentials are a pluggable [`CredentialVerifier`]; the gate itself only
//! knows how to record and clear the session marker in the store and how to
//! tell listeners that it changed.
//!
//! # Modules
//!
//! - `credentials` - Credential verifiers (plaintext pair, Argon2 hash)
//! - `error` - Session error types
//! - `gate` - The session gate and change listeners
//! - `password` - Argon2id hashing helpers

mod credentials;
mod error;
mod gate;
mod password;

pub use credentials::{CredentialVerifier, HashedCredentials, StaticCredentials};
pub use error::SessionError;
pub use gate::{SessionGate, SessionListener};
pub use password::{PasswordError, hash_password, verify_password};

use serde::{Deserialize, Serialize};

/// Role recorded on a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full access.
    Admin,
    /// Day-to-day bookkeeping.
    Staff,
    /// A fund member viewing their own account.
    Member,
}

impl UserRole {
    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
            Self::Member => "member",
        }
    }

    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "staff" => Some(Self::Staff),
            "member" => Some(Self::Member),
            _ => None,
        }
    }

    /// Returns true if this role may change ledger state.
    #[must_use]
    pub const fn can_modify_ledger(&self) -> bool {
        matches!(self, Self::Admin | Self::Staff)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The signed-in user recorded in the session marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Username that authenticated.
    pub username: String,
    /// Granted role.
    pub role: UserRole,
}
