//! Structured logging for Sift.
//!
//! Built on `tracing`. The engine emits a `retrieve` span per call with
//! stage transitions at `debug` and degradations at `warn`; this module only
//! installs a subscriber for applications that do not bring their own.


use crate::config::{LogFormat, LogLevel, LoggingConfig};
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;

/// Error type for logging operations
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing log level
    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),

    /// Error in subscriber setup
    #[error("Subscriber error: {0}")]
    SubscriberError(String),
}

/// Result type for logging operations
pub type Result<T> = std::result::Result<T, LogError>;

/// Finish a fmt subscriber builder and install it, writing to `writer` when given.
macro_rules! install {
    ($builder:expr, $filter:expr, $writer:expr) => {{
        let builder = $builder
            .with_env_filter($filter)
            .with_target(true)
            .with_line_number(true)
            .with_thread_ids(true);
        match $writer {
            Some(writer) => builder.with_ansi(false).with_writer(writer).try_init(),
            None => builder.try_init(),
        }
    }};
}

/// Initialize the global subscriber from `config`.
///
/// When a log file is configured the returned guard must be kept alive for
/// as long as logs should be flushed to it. A subscriber that is already
/// installed is left in place and treated as success.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let (writer, guard) = match &config.file {
        Some(path) => {
            if config.stdout {
                tracing::debug!(path = %path.display(), "File logging takes precedence over stdout");
            }
            let (writer, guard) = create_non_blocking_file(path)?;
            (Some(writer), Some(guard))
        }
        None if config.stdout => (None, None),
        None => return Ok(None),
    };

    let filter = env_filter(config.level.into());
    let result = match config.format {
        LogFormat::Json => install!(tracing_subscriber::fmt().json(), filter, writer),
        LogFormat::Compact => install!(tracing_subscriber::fmt().compact(), filter, writer),
        LogFormat::Default | LogFormat::Pretty => {
            install!(tracing_subscriber::fmt().pretty(), filter, writer)
        }
    };

    match result {
        Ok(()) => Ok(guard),
        Err(e) if is_already_initialized(e.as_ref()) => Ok(None),
        Err(e) => Err(LogError::SubscriberError(e.to_string())),
    }
}

/// Both the global dispatcher and the `log` bridge report a second install this way.
fn is_already_initialized(err: &(dyn std::error::Error + Send + Sync)) -> bool {
    err.to_string().contains("already")
}

/// Honor `RUST_LOG` when set, otherwise filter at `level`.
fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// Create a non-blocking file writer.
fn create_non_blocking_file(path: impl AsRef<Path>) -> Result<(NonBlocking, WorkerGuard)> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| LogError::SubscriberError(format!("Not a file path: {}", path.display())))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let file_appender = tracing_appender::rolling::never(directory, file_name);
    Ok(tracing_appender::non_blocking(file_appender))
}

/// Parse a log level string into a LogLevel enum.
pub fn parse_log_level(level: &str) -> Result<LogLevel> {
    level.parse().map_err(|_| LogError::InvalidLogLevel(level.to_string()))
}

/// Convert a tracing::Level to a LogLevel enum.
pub fn level_to_log_level(level: Level) -> LogLevel {
    match level {
        Level::TRACE => LogLevel::Trace,
        Level::DEBUG => LogLevel::Debug,
        Level::INFO => LogLevel::Info,
        Level::WARN => LogLevel::Warn,
        _ => LogLevel::Error,
    }
}
