//! Storage-related error types.
//!
//! Raised by key-value persistence backing the credential slot and the
//! cookie backup.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage error type covering I/O failures and serialization errors.
///
/// # Examples
///
/// ```
/// use bilirq_core::error::StorageError;
///
/// let error = StorageError::IoError {
///     operation: "write".to_string(),
///     path: "/tmp/session.json".to_string(),
///     reason: "Disk full".to_string(),
/// };
/// assert!(error.to_string().contains("write"));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageError {
    /// I/O operation failed.
    #[error("[Storage] I/O error during {operation} on '{path}': {reason}")]
    IoError {
        /// Operation that failed (read, write, delete, etc.).
        operation: String,
        /// Path to the file or resource.
        path: String,
        /// Reason for the I/O error.
        reason: String,
    },

    /// Serialization failed.
    #[error("[Storage] Serialization error: {reason}")]
    SerializationError {
        /// Reason for the serialization error.
        reason: String,
    },

    /// Deserialization failed.
    #[error("[Storage] Deserialization error: {reason}")]
    DeserializationError {
        /// Reason for the deserialization error.
        reason: String,
    },
}

impl StorageError {
    /// Creates a serialization error from any displayable cause.
    #[must_use]
    pub fn serialization(reason: impl std::fmt::Display) -> Self {
        Self::SerializationError {
            reason: reason.to_string(),
        }
    }

    /// Creates a deserialization error from any displayable cause.
    #[must_use]
    pub fn deserialization(reason: impl std::fmt::Display) -> Self {
        Self::DeserializationError {
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_error() {
        let error = StorageError::serialization("key must be a string");
        assert!(error.to_string().contains("key must be a string"));
    }

    #[test]
    fn test_deserialization_error() {
        let error = StorageError::deserialization("EOF while parsing");
        assert!(matches!(error, StorageError::DeserializationError { .. }));
    }
}
