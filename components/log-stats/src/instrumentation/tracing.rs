// Local crates
use crate::helpers::load_config::LoggingConfig;

// External crates
use anyhow::{Context, Result};
use std::panic;
use tracing::error;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    filter::EnvFilter,
    fmt,
    prelude::*,
    registry::Registry,
};

/// File name prefix of the rolling diagnostics file
const LOG_FILE_NAME: &str = "log_stats.log";

/// Installs the global subscriber.
///
/// Standard output is reserved for snapshots, so the human readable layer
/// writes to stderr. When `cfg.directory` is set a JSON layer additionally
/// writes to a daily rolling file; keep the returned guard alive until exit
/// or buffered lines are lost.
pub fn init_tracing(cfg: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.level));

    let fmt_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339());

    let (json_layer, guard) = match &cfg.directory {
        Some(dir) => {
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(LOG_FILE_NAME)
                .build(dir)
                .with_context(|| {
                    format!("Failed to create rolling log file appender in {:?}", dir)
                })?;
            let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(non_blocking_writer)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true)
                .with_target(false)
                .with_timer(fmt::time::UtcTime::rfc_3339());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let error_layer = ErrorLayer::default();

    let subscriber = Registry::default()
        .with(filter)
        .with(fmt_layer)
        .with(json_layer)
        .with(error_layer);

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set global tracing subscriber")?;

    Ok(guard)
}

/// Routes panics through `tracing` before the default hook prints them.
pub fn init_panic_handler() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let msg = match panic_info.payload().downcast_ref::<&str>() {
            Some(s) => *s,
            None => match panic_info.payload().downcast_ref::<String>() {
                Some(s) => s.as_str(),
                None => "Unknown panic",
            },
        };

        let location = panic_info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown location".to_string());

        error!(
            message = %msg,
            location = %location,
            "Application panicked!"
        );
        default_hook(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unusable_log_directory_is_an_error() {
        // A directory can never be created underneath a regular file
        let file = tempfile::NamedTempFile::new().unwrap();
        let cfg = LoggingConfig {
            directory: Some(file.path().join("log-stats")),
            ..LoggingConfig::default()
        };

        let err = init_tracing(&cfg).unwrap_err();
        assert!(err.to_string().contains("rolling log file appender"));
    }
}
