//! Configuration validation trait.

use crate::error::ConfigError;

/// Trait for types that can be validated.
///
/// # Example
///
/// ```rust
/// use bilirq_core::config::Validatable;
/// use bilirq_core::error::ConfigError;
///
/// struct Timeouts {
///     request_ms: u64,
/// }
///
/// impl Validatable for Timeouts {
///     fn validate(&self) -> Result<(), ConfigError> {
///         if self.request_ms == 0 {
///             return Err(ConfigError::invalid_value("request_ms", "must be positive"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validatable {
    /// Validates the configuration.
    fn validate(&self) -> Result<(), ConfigError>;
}
