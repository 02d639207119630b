//! Storage error types.

use thiserror::Error;

use super::CollectionKey;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage medium failed to read or write.
    #[error("storage backend failed on {key}: {message}")]
    Backend {
        /// Collection being accessed.
        key: CollectionKey,
        /// Backend-specific description.
        message: String,
    },

    /// Stored text could not be decoded into records.
    #[error("corrupt data under {key}: {source}")]
    Corrupt {
        /// Collection holding the bad text.
        key: CollectionKey,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },

    /// Records could not be encoded.
    #[error("failed to encode {key}: {source}")]
    Encode {
        /// Collection being written.
        key: CollectionKey,
        /// Encoder error.
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Create a backend error.
    #[must_use]
    pub fn backend(key: CollectionKey, message: impl Into<String>) -> Self {
        Self::Backend {
            key,
            message: message.into(),
        }
    }

    /// Returns the collection the error relates to.
    #[must_use]
    pub const fn key(&self) -> CollectionKey {
        match self {
            Self::Backend { key, .. } | Self::Corrupt { key, .. } | Self::Encode { key, .. } => *key,
        }
    }
}
