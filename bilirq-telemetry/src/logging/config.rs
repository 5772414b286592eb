//! Logging configuration types.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use super::LoggingError;

/// Filter applied when neither `RUST_LOG` nor the configuration sets one.
///
/// Request-layer crates log at `info`; everything else (reqwest, hyper,
/// rustls) only at `warn`.
pub const DEFAULT_FILTER: &str = "warn,bilirq_gateway=info,bilirq_core=info";

/// Filter used by [`LogConfig::verbose`]. Shows every request and
/// envelope decision the gateway makes.
pub const VERBOSE_FILTER: &str = "warn,bilirq_gateway=debug,bilirq_core=debug";

/// Configuration for the logging system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Filter directives, e.g. `"warn,bilirq_gateway=debug"`.
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Output targets.
    #[serde(default = "default_outputs")]
    pub outputs: Vec<LogOutput>,

    /// Include source file and line.
    #[serde(default)]
    pub include_file_info: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            format: LogFormat::default(),
            outputs: default_outputs(),
            include_file_info: false,
        }
    }
}

impl LogConfig {
    /// Pretty stdout logging with gateway debug output and source locations.
    #[must_use]
    pub fn verbose() -> Self {
        Self {
            filter: VERBOSE_FILTER.to_string(),
            format: LogFormat::Pretty,
            outputs: default_outputs(),
            include_file_info: true,
        }
    }

    /// Replaces the filter directives.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Adds a rolling file output.
    #[must_use]
    pub fn with_file(mut self, directory: impl Into<String>, rotation: Rotation) -> Self {
        self.outputs.push(LogOutput::File {
            directory: directory.into(),
            prefix: default_prefix(),
            rotation,
        });
        self
    }

    /// Builds the filter: `RUST_LOG` when set, otherwise the configured
    /// directives.
    pub fn env_filter(&self) -> Result<EnvFilter, LoggingError> {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.filter))
            .map_err(|e| LoggingError::InvalidConfig(format!("invalid filter {:?}: {e}", self.filter)))
    }
}

fn default_filter() -> String {
    DEFAULT_FILTER.to_string()
}

fn default_outputs() -> Vec<LogOutput> {
    vec![LogOutput::Stdout]
}

fn default_prefix() -> String {
    "bilirq.log".to_string()
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable; the usual choice for an embedded client library.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Log output target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LogOutput {
    /// Standard output.
    Stdout,
    /// Rolling JSON files under `directory`.
    File {
        /// Directory holding the log files.
        directory: String,
        /// File name prefix.
        #[serde(default = "default_prefix")]
        prefix: String,
        /// Rotation period.
        #[serde(default)]
        rotation: Rotation,
    },
}

/// Rotation period for file outputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    /// New file every hour.
    Hourly,
    /// New file every day.
    #[default]
    Daily,
    /// Single file.
    Never,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.filter, DEFAULT_FILTER);
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.outputs, vec![LogOutput::Stdout]);
    }

    #[test]
    fn test_verbose_enables_gateway_debug() {
        let config = LogConfig::verbose();
        assert!(config.filter.contains("bilirq_gateway=debug"));
        assert!(config.include_file_info);
    }

    #[test]
    fn test_with_file_uses_default_prefix() {
        let config = LogConfig::default().with_file("/var/log/bilirq", Rotation::Hourly);
        assert_eq!(
            config.outputs[1],
            LogOutput::File {
                directory: "/var/log/bilirq".to_string(),
                prefix: "bilirq.log".to_string(),
                rotation: Rotation::Hourly,
            }
        );
    }

    #[test]
    fn test_file_output_from_toml() {
        let parsed: LogConfig = toml::from_str(
            r#"
            filter = "bilirq_gateway=trace"
            format = "json"

            [[outputs]]
            type = "file"
            directory = "logs"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.format, LogFormat::Json);
        assert_eq!(
            parsed.outputs,
            vec![LogOutput::File {
                directory: "logs".to_string(),
                prefix: "bilirq.log".to_string(),
                rotation: Rotation::Daily,
            }]
        );
    }

    #[test]
    fn test_invalid_filter_rejected() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LogConfig::default().with_filter("bilirq_gateway=chatty");
        assert!(matches!(
            config.env_filter(),
            Err(LoggingError::InvalidConfig(_))
        ));
    }
}
