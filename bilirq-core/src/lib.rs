//! # bilirq core
//!
//! Shared types for the bilirq request layer.
//!
//! This crate provides:
//! - The request error taxonomy ([`error::RequestError`])
//! - Lenient accessors over dynamic JSON values ([`value::ValueExt`])
//! - The session data model (credential, cookies, parameters)
//! - Collaborator traits for transports, credential and cookie storage
//! - Configuration loading and validation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]

/// Error types and handling
pub mod error;

/// Lenient JSON value access
pub mod value;

/// Data model
pub mod types;

/// Collaborator trait definitions
pub mod traits;

/// Configuration management
pub mod config;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{ConfigFormat, ConfigLoader, Validatable};
    pub use crate::error::{RequestError, RequestResult, TransportError};
    pub use crate::traits::*;
    pub use crate::types::*;
    pub use crate::value::ValueExt;
}
