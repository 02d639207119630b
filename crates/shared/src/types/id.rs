//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `DepositId` where a `MemberId` is expected.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// An id argument that is not a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {entity} id '{input}'")]
pub struct IdParseError {
    /// Which kind of record the id was meant to name.
    pub entity: &'static str,
    /// The rejected text.
    pub input: String,
}

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $entity:literal, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| IdParseError {
                        entity: $entity,
                        input: s.to_string(),
                    })
            }
        }
    };
}

typed_id!(MemberId, "member", "Unique identifier for a fund member.");
typed_id!(DepositId, "deposit", "Unique identifier for a deposit record.");
typed_id!(WithdrawalId, "withdrawal", "Unique identifier for a withdrawal request.");
