//! `tracing` subscriber setup for the card generator

use crate::config::{LogRotation, LoggingOptions};
use crate::error::{Error, Result};
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::OnceLock;
use tracing::Subscriber;
use tracing_appender::non_blocking::{NonBlocking, NonBlockingBuilder, WorkerGuard};
use tracing_appender::rolling;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

type FilteredRegistry = Layered<EnvFilter, Registry>;
type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Install the global subscriber: terminal output on stderr plus an optional
/// file sink.
///
/// Does nothing when a subscriber is already installed.
pub fn init(options: &LoggingOptions) -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let filter = env_filter(options)?;
    let file = match options.file.as_deref() {
        Some(path) => Some(file_layer::<FilteredRegistry>(path, options.rotation)?),
        None => None,
    };

    Registry::default()
        .with(filter)
        .with(file)
        .with(stderr_layer(options.color))
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to install tracing subscriber: {e}")))
}

fn env_filter(options: &LoggingOptions) -> Result<EnvFilter> {
    let level = std::env::var("WIFICARD_LOG_LEVEL").unwrap_or_else(|_| options.level.clone());
    EnvFilter::try_new(level.as_str())
        .map_err(|e| Error::Config(format!("Invalid log level '{level}': {e}")))
}

fn file_layer<S>(path: &Path, rotation: Option<LogRotation>) -> Result<BoxedLayer<S>>
where
    S: Subscriber + for<'span> LookupSpan<'span> + Send + Sync + 'static,
{
    let (writer, guard) = file_writer(path, rotation)?;
    // The guard flushes the background writer on drop, so it lives for the process.
    let _ = FILE_GUARD.set(guard);

    Ok(fmt::layer()
        .with_timer(UtcTime::rfc_3339())
        .with_ansi(false)
        .with_writer(writer)
        .with_target(true)
        .boxed())
}

fn file_writer(path: &Path, rotation: Option<LogRotation>) -> Result<(NonBlocking, WorkerGuard)> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|e| {
        Error::Config(format!(
            "Failed to create log directory {}: {e}",
            dir.display()
        ))
    })?;

    let builder = NonBlockingBuilder::default().lossy(false);
    let Some(rotation) = rotation else {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .map_err(|e| {
                Error::Config(format!("Failed to open log file {}: {e}", path.display()))
            })?;
        return Ok(builder.finish(file));
    };

    let file_name = path.file_name().ok_or_else(|| {
        Error::Config(format!(
            "Log file path '{}' must include a filename when rotation is enabled",
            path.display()
        ))
    })?;
    let appender = match rotation {
        LogRotation::Hourly => rolling::hourly(dir, file_name),
        LogRotation::Daily => rolling::daily(dir, file_name),
    };
    Ok(builder.finish(appender))
}

fn stderr_layer<S>(color: bool) -> BoxedLayer<S>
where
    S: Subscriber + for<'span> LookupSpan<'span> + Send + Sync + 'static,
{
    fmt::layer()
        .with_timer(UtcTime::rfc_3339())
        .with_writer(io::stderr)
        .with_ansi(color)
        .with_target(false)
        .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_is_config_error() {
        let options = LoggingOptions {
            level: "wificard=notalevel".to_string(),
            ..LoggingOptions::default()
        };
        if std::env::var("WIFICARD_LOG_LEVEL").is_err() {
            assert!(matches!(env_filter(&options), Err(Error::Config(_))));
        }
    }

    #[test]
    fn test_rotation_requires_file_name() {
        let err = file_writer(Path::new("/"), Some(LogRotation::Daily)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
