//! Structured logging system.
//!
//! The default filter keeps the gateway at `info` and its HTTP dependencies
//! at `warn`. `RUST_LOG` overrides the configured directives.

mod config;

pub use config::{DEFAULT_FILTER, LogConfig, LogFormat, LogOutput, Rotation, VERBOSE_FILTER};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync>;

/// Initialize the logging system with the given configuration.
///
/// Returns guards that must be kept alive for the duration of the program
/// to ensure file outputs are flushed.
///
/// # Example
///
/// ```no_run
/// use bilirq_telemetry::logging::{init_logging, LogConfig};
///
/// let config = LogConfig::default();
/// let _guards = init_logging(&config).expect("Failed to initialize logging");
/// ```
pub fn init_logging(config: &LogConfig) -> Result<Vec<WorkerGuard>, LoggingError> {
    if config.outputs.is_empty() {
        return Err(LoggingError::InvalidConfig(
            "at least one output is required".to_string(),
        ));
    }

    let env_filter: EnvFilter = config.env_filter()?;

    let mut guards = Vec::new();
    let mut layers: Vec<BoxedLayer<_>> = Vec::new();

    for output in &config.outputs {
        match output {
            LogOutput::Stdout => layers.push(stdout_layer(config)),
            LogOutput::File {
                directory,
                prefix,
                rotation,
            } => {
                std::fs::create_dir_all(directory)?;
                let (layer, guard) = file_layer(config, directory, prefix, *rotation);
                layers.push(layer);
                guards.push(guard);
            }
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    Ok(guards)
}

fn stdout_layer<S>(config: &LogConfig) -> BoxedLayer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    let base = fmt::layer()
        .with_target(true)
        .with_file(config.include_file_info)
        .with_line_number(config.include_file_info);

    match config.format {
        LogFormat::Json => Box::new(base.json().flatten_event(true)),
        LogFormat::Pretty => Box::new(base.pretty()),
    }
}

fn file_layer<S>(
    config: &LogConfig,
    directory: &str,
    prefix: &str,
    rotation: Rotation,
) -> (BoxedLayer<S>, WorkerGuard)
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    let file_appender = match rotation {
        Rotation::Hourly => tracing_appender::rolling::hourly(directory, prefix),
        Rotation::Daily => tracing_appender::rolling::daily(directory, prefix),
        Rotation::Never => tracing_appender::rolling::never(directory, prefix),
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_file(config.include_file_info)
        .with_line_number(config.include_file_info)
        .json()
        .flatten_event(true);

    (Box::new(layer), guard)
}

/// Errors that can occur during logging initialization.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// Failed to create log directory
    #[error("Failed to create log directory: {0}")]
    DirectoryCreation(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid logging configuration: {0}")]
    InvalidConfig(String),

    /// A global subscriber is already installed
    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_outputs() {
        let config = LogConfig {
            outputs: Vec::new(),
            ..LogConfig::default()
        };
        assert!(matches!(
            init_logging(&config),
            Err(LoggingError::InvalidConfig(_))
        ));
    }
}
