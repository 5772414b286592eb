//! Configuration-related error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error type covering missing fields, invalid values,
/// and file access errors.
///
/// # Examples
///
/// ```
/// use bilirq_core::error::ConfigError;
///
/// let error = ConfigError::missing_field("app_key");
/// assert!(error.to_string().contains("app_key"));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigError {
    /// Required configuration field is missing.
    #[error("[Config] Missing field '{field}'")]
    MissingField {
        /// Name of the missing field.
        field: String,
    },

    /// Configuration value is invalid.
    #[error("[Config] Invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Field with the invalid value.
        field: String,
        /// Reason why the value is invalid.
        reason: String,
    },

    /// Configuration file could not be read.
    #[error("[Config] Failed to read file '{path}': {reason}")]
    FileReadError {
        /// Path to the configuration file.
        path: String,
        /// Reason for the read failure.
        reason: String,
    },

    /// Configuration file could not be written.
    #[error("[Config] Failed to write file '{path}': {reason}")]
    FileWriteError {
        /// Path to the configuration file.
        path: String,
        /// Reason for the write failure.
        reason: String,
    },

    /// Configuration file format is invalid.
    #[error("[Config] Invalid format in '{path}': {reason}")]
    InvalidFormat {
        /// Path to the configuration file.
        path: String,
        /// Reason for the format error.
        reason: String,
    },

    /// Configuration validation failed.
    #[error("[Config] Validation failed: {reason}")]
    ValidationFailed {
        /// Reason for the validation failure.
        reason: String,
    },
}

impl ConfigError {
    /// Creates a missing field error.
    #[must_use]
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
