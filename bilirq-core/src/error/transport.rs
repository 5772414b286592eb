//! Transport-level error types.
//!
//! These carry the detail of why a transport call failed so it can be
//! logged. Once handed to the request pipeline they collapse into
//! [`RequestError::Network`](super::RequestError::Network).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by a transport adapter.
///
/// # Examples
///
/// ```
/// use bilirq_core::error::{RequestError, TransportError};
///
/// let error = TransportError::Timeout { timeout_ms: 10_000 };
/// assert!(error.to_string().contains("10000ms"));
/// assert_eq!(RequestError::from(error), RequestError::Network);
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportError {
    /// Connection to remote host failed.
    #[error("[Network] Connection failed: {reason}")]
    ConnectionFailed {
        /// Reason for the connection failure.
        reason: String,
    },

    /// Request timed out.
    #[error("[Network] Request timeout after {timeout_ms}ms")]
    Timeout {
        /// Timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// The request could not be built (bad URL, header, or body).
    #[error("[Network] Invalid request: {reason}")]
    InvalidRequest {
        /// Reason the request is invalid.
        reason: String,
    },

    /// The response body could not be read.
    #[error("[Network] Failed to read body: {reason}")]
    Body {
        /// Reason for the read failure.
        reason: String,
    },

    /// The request was abandoned before completing.
    #[error("[Network] Request cancelled")]
    Cancelled,
}

impl From<TransportError> for super::RequestError {
    fn from(_: TransportError) -> Self {
        Self::Network
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RequestError;

    #[test]
    fn test_all_variants_collapse_to_network() {
        let errors = [
            TransportError::ConnectionFailed {
                reason: "refused".to_string(),
            },
            TransportError::Timeout { timeout_ms: 1 },
            TransportError::InvalidRequest {
                reason: "bad url".to_string(),
            },
            TransportError::Body {
                reason: "reset".to_string(),
            },
            TransportError::Cancelled,
        ];
        for error in errors {
            assert_eq!(RequestError::from(error), RequestError::Network);
        }
    }

    #[test]
    fn test_display() {
        let error = TransportError::ConnectionFailed {
            reason: "Connection refused".to_string(),
        };
        assert!(error.to_string().contains("Connection refused"));
    }
}
