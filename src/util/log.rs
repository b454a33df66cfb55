// src/util/log.rs

//! File-based logging for the TUI.
//!
//! The terminal belongs to ratatui, so nothing may be written to stdout.
//! Events go through `tracing` and land in one file per severity inside the
//! configured log directory (`error.log`, `warn.log`, `info.log`, `debug.log`).
//! Files are truncated at start-up.

use std::fs::{File, create_dir_all};
use std::path::Path;
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::{
    filter::filter_fn,
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Layer,
};

use crate::error::Result;

/// Log severity levels
#[derive(Debug, Clone, Copy)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    fn as_level(&self) -> Level {
        match self {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
        }
    }

    fn filename(&self) -> &str {
        match self {
            LogLevel::Error => "error.log",
            LogLevel::Warn => "warn.log",
            LogLevel::Info => "info.log",
            LogLevel::Debug => "debug.log",
        }
    }
}

fn file_layer<S>(log_dir: &Path, level: LogLevel) -> std::io::Result<impl Layer<S>>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    let file = File::create(log_dir.join(level.filename()))?;
    let wanted = level.as_level();

    Ok(fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .with_filter(filter_fn(move |meta| *meta.level() == wanted)))
}

/// Install the global subscriber. Debug output is only written when `debug` is set.
pub fn init(log_dir: &Path, debug: bool) -> Result<()> {
    create_dir_all(log_dir)?;

    let debug_layer = if debug {
        Some(file_layer(log_dir, LogLevel::Debug)?)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(file_layer(log_dir, LogLevel::Error)?)
        .with(file_layer(log_dir, LogLevel::Warn)?)
        .with(file_layer(log_dir, LogLevel::Info)?)
        .with(debug_layer)
        .try_init()
        .map_err(std::io::Error::other)?;

    Ok(())
}

/// Convenience macro for error logging with formatting
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        ::tracing::error!($($arg)*);
    }};
}

/// Convenience macro for warning logging with formatting
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        ::tracing::warn!($($arg)*);
    }};
}

/// Convenience macro for info logging with formatting
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        ::tracing::info!($($arg)*);
    }};
}

/// Convenience macro for debug logging with formatting
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        ::tracing::debug!($($arg)*);
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_logger_creation() {
        let temp_dir = TempDir::new().unwrap();
        init(temp_dir.path(), false).expect("Failed to create logger");

        crate::log_error!("Test error {}", 1);
        crate::log_warn!("Test warning");
        crate::log_info!("Test info");
        crate::log_debug!("Test debug");

        assert!(temp_dir.path().join("error.log").exists());
        assert!(temp_dir.path().join("warn.log").exists());
        assert!(temp_dir.path().join("info.log").exists());
        assert!(!temp_dir.path().join("debug.log").exists());

        let errors = fs::read_to_string(temp_dir.path().join("error.log")).unwrap();
        assert!(errors.contains("Test error 1"));
        assert!(!errors.contains("Test info"));
    }
}
