//! Configuration management module.
//!
//! - TOML, JSON and YAML configuration files
//! - Validation with descriptive error messages
//!
//! # Example
//!
//! ```rust,ignore
//! use bilirq_core::config::{ConfigFormat, ConfigLoader};
//!
//! let config: ClientConfig = ConfigLoader::new().load_file("client.toml")?;
//! let config: ClientConfig = ConfigLoader::new().load_str(content, ConfigFormat::Json)?;
//! ```

mod loader;
mod traits;

pub use loader::{ConfigFormat, ConfigLoader};
pub use traits::Validatable;
