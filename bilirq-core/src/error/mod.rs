//! Error types and handling framework.
//!
//! Every failed call produces exactly one [`RequestError`]:
//! - `Network` - the transport could not deliver a response (connectivity,
//!   timeout, cancellation). No further detail is retained.
//! - `Status` - the vendor envelope carried a non-zero `code`.
//! - `Decode` - the envelope or payload could not be parsed into the
//!   expected shape.
//!
//! Transport adapters report [`TransportError`], which is logged and then
//! collapsed into `Network`. Configuration and persistence have their own
//! error types ([`ConfigError`], [`StorageError`]) which never leak into the
//! request path.
//!
//! # Examples
//!
//! ```
//! use bilirq_core::error::RequestError;
//!
//! let error = RequestError::status(-101, "账号未登录");
//! assert_eq!(error.code(), Some(-101));
//! assert!(error.is_session_invalid());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod config;
mod storage;
mod transport;

pub use config::ConfigError;
pub use storage::StorageError;
pub use transport::TransportError;

/// Vendor status code signalling that the session credential is no longer valid.
pub const SESSION_INVALID_CODE: i64 = -101;

/// Classified failure of a single request.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestError {
    /// The transport failed before a response body was available.
    #[error("[Request] Network request failed")]
    Network,

    /// The vendor envelope reported a non-zero status code.
    #[error("{message}")]
    Status {
        /// Vendor status code.
        code: i64,
        /// Vendor message, verbatim.
        message: String,
    },

    /// The envelope or payload could not be decoded.
    #[error("Decoding failed: {message}")]
    Decode {
        /// Description of the underlying decode error.
        message: String,
    },
}

impl RequestError {
    /// Creates a status failure.
    #[must_use]
    pub fn status(code: i64, message: impl Into<String>) -> Self {
        Self::Status {
            code,
            message: message.into(),
        }
    }

    /// Creates a decode failure.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Returns the vendor status code, if this is a status failure.
    #[must_use]
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Returns true if the vendor invalidated the current session.
    #[must_use]
    pub fn is_session_invalid(&self) -> bool {
        self.code() == Some(SESSION_INVALID_CODE)
    }

    /// Returns true for transport-level failures.
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network)
    }
}

/// Result alias used throughout the request layer.
pub type RequestResult<T> = Result<T, RequestError>;
