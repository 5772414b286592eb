//! Client construction errors.
//!
//! Request failures are always [`RequestError`](bilirq_core::error::RequestError);
//! this type only covers setting a client up.

use bilirq_core::error::{ConfigError, StorageError, TransportError};
use thiserror::Error;

/// Failure to construct an [`ApiClient`](crate::ApiClient).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The configuration did not validate.
    #[error("[Gateway] Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP transport could not be created.
    #[error("[Gateway] Transport setup failed: {0}")]
    Transport(#[from] TransportError),

    /// Session persistence could not be opened.
    #[error("[Gateway] Session storage failed: {0}")]
    Storage(#[from] StorageError),
}
