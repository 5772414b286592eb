//! Configuration loader supporting TOML, JSON and YAML formats.

use serde::de::DeserializeOwned;
use std::path::Path;

use super::Validatable;
use crate::error::ConfigError;

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigFormat {
    /// TOML format (.toml)
    #[default]
    Toml,
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml)
    Yaml,
}

impl ConfigFormat {
    /// Detects the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "toml" => Some(Self::Toml),
                "json" => Some(Self::Json),
                "yaml" | "yml" => Some(Self::Yaml),
                _ => None,
            })
    }

    /// Returns the file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Toml => "toml",
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

/// Configuration loader.
///
/// Validation runs after parsing unless disabled with
/// [`with_validation`](Self::with_validation).
///
/// # Example
///
/// ```rust,ignore
/// use bilirq_core::config::ConfigLoader;
///
/// let config: ClientConfig = ConfigLoader::new().load_file("client.toml")?;
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    validate: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    #[must_use]
    pub fn new() -> Self {
        Self { validate: true }
    }

    /// Sets whether to validate the configuration after loading.
    #[must_use]
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Loads configuration from a file, detecting the format from its extension.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file format is not recognized
    /// - The file cannot be read
    /// - The content cannot be parsed or fails validation
    pub fn load_file<T, P>(&self, path: P) -> Result<T, ConfigError>
    where
        T: DeserializeOwned + Validatable,
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path).ok_or_else(|| ConfigError::InvalidFormat {
            path: path.display().to_string(),
            reason: "Unrecognized file extension. Supported: .toml, .json, .yaml, .yml".to_string(),
        })?;

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        self.load_str(&content, format)
    }

    /// Loads configuration from a string with the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be parsed or fails validation.
    pub fn load_str<T>(&self, content: &str, format: ConfigFormat) -> Result<T, ConfigError>
    where
        T: DeserializeOwned + Validatable,
    {
        let config: T = match format {
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| ConfigError::InvalidFormat {
                path: "<string>".to_string(),
                reason: format!("TOML parse error: {e}"),
            })?,
            ConfigFormat::Json => {
                serde_json::from_str(content).map_err(|e| ConfigError::InvalidFormat {
                    path: "<string>".to_string(),
                    reason: format!("JSON parse error: {e}"),
                })?
            }
            ConfigFormat::Yaml => {
                serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidFormat {
                    path: "<string>".to_string(),
                    reason: format!("YAML parse error: {e}"),
                })?
            }
        };

        if self.validate {
            config.validate()?;
        }

        Ok(config)
    }

    /// Serializes a configuration to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize<T>(config: &T, format: ConfigFormat) -> Result<String, ConfigError>
    where
        T: serde::Serialize,
    {
        match format {
            ConfigFormat::Toml => {
                toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidFormat {
                    path: "<serialize>".to_string(),
                    reason: format!("TOML serialization error: {e}"),
                })
            }
            ConfigFormat::Json => {
                serde_json::to_string_pretty(config).map_err(|e| ConfigError::InvalidFormat {
                    path: "<serialize>".to_string(),
                    reason: format!("JSON serialization error: {e}"),
                })
            }
            ConfigFormat::Yaml => {
                serde_yaml::to_string(config).map_err(|e| ConfigError::InvalidFormat {
                    path: "<serialize>".to_string(),
                    reason: format!("YAML serialization error: {e}"),
                })
            }
        }
    }

    /// Saves a configuration to a file, detecting the format from its extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the format is not recognized, serialization fails,
    /// or the file cannot be written.
    pub fn save_file<T, P>(config: &T, path: P) -> Result<(), ConfigError>
    where
        T: serde::Serialize,
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path).ok_or_else(|| ConfigError::InvalidFormat {
            path: path.display().to_string(),
            reason: "Unrecognized file extension. Supported: .toml, .json, .yaml, .yml".to_string(),
        })?;

        let content = Self::serialize(config, format)?;

        std::fs::write(path, content).map_err(|e| ConfigError::FileWriteError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}
