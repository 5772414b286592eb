//! # bilirq telemetry
//!
//! Logging for the bilirq request layer.
//!
//! This crate provides:
//! - Structured logging with JSON and pretty formats
//! - Stdout and rolling file outputs
//! - Masking of session tokens, signatures and auth cookies before they
//!   reach a log line

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

/// Logging configuration and initialization
pub mod logging;

/// Sensitive data masking
pub mod masking;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::logging::{LogConfig, LogFormat, LogOutput, Rotation, init_logging};
    pub use crate::masking::{Sensitive, SensitiveDataMasker};
}
