//! Error handling for ColletKit
//!
//! Provides error types for the layers the inventory core talks to:
//! - Store errors (remote data store reads and writes)
//! - Storage errors (local durable storage, quota)
//!
//! Parsing failures are not errors: malformed sizes resolve to "unavailable".
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Remote data store error type
///
/// Any variant is treated as "remote unavailable" by read paths, which
/// degrade to fallback data. Write paths surface it to the initiating action.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// The store answered with a failure status
    #[error("{context}: {message}")]
    Remote {
        /// The operation that failed (e.g. "UpdateBit").
        context: String,
        /// A human-readable message from the store.
        message: String,
    },

    /// The request never reached the store
    #[error("Transport error: {0}")]
    Transport(String),

    /// The store answered with data we could not decode
    #[error("Invalid store response: {0}")]
    Decode(String),

    /// The addressed record does not exist
    #[error("Record not found: {0}")]
    NotFound(String),
}

impl StoreError {
    /// Build a remote error for an operation context
    pub fn remote(context: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::Remote {
            context: context.into(),
            message: message.into(),
        }
    }
}

/// Local durable storage error type
#[derive(Error, Debug)]
pub enum StorageError {
    /// The write would exceed the storage quota
    #[error("Storage quota exceeded writing '{key}' ({bytes} bytes)")]
    QuotaExceeded {
        /// The key being written.
        key: String,
        /// Size of the rejected value in bytes.
        bytes: usize,
    },

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Storage backend cannot be used
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    /// Check if this is a quota failure
    pub fn is_quota(&self) -> bool {
        matches!(self, StorageError::QuotaExceeded { .. })
    }
}

/// Main error type for ColletKit
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Remote store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Local storage error
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The current identity may not perform this action
    #[error("Not authorized: {action} requires an administrator")]
    Unauthorized {
        /// The gated action.
        action: String,
    },

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Create an authorization error for an action
    pub fn unauthorized(action: impl Into<String>) -> Self {
        Error::Unauthorized {
            action: action.into(),
        }
    }

    /// Check if this is a remote store error
    pub fn is_store_error(&self) -> bool {
        matches!(self, Error::Store(_))
    }

    /// Check if this is an authorization error
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Unauthorized { .. })
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::remote("UpdateBit", "row level security");
        assert_eq!(err.to_string(), "UpdateBit: row level security");

        let err = StoreError::NotFound("bit-42".to_string());
        assert_eq!(err.to_string(), "Record not found: bit-42");
    }

    #[test]
    fn test_storage_quota() {
        let err = StorageError::QuotaExceeded {
            key: "cnc_bits_cache".to_string(),
            bytes: 4096,
        };
        assert!(err.is_quota());
        assert_eq!(
            err.to_string(),
            "Storage quota exceeded writing 'cnc_bits_cache' (4096 bytes)"
        );

        let io = StorageError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert!(!io.is_quota());
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = StoreError::Transport("connection reset".to_string()).into();
        assert!(err.is_store_error());

        let err = Error::unauthorized("seed");
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "Not authorized: seed requires an administrator");
    }
}
