//! Structured logging setup with console and file output.
//!
//! Interactive terminals get console output only. Otherwise logs also go to a
//! daily rotating file in the data directory. Console output goes to stderr;
//! stdout belongs to the front end. The filter comes from
//! `ICONSWAP_LOG`, then `RUST_LOG`, then a build-type default.

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a custom log filter.
pub const LOG_ENV: &str = "ICONSWAP_LOG";

/// Logging configuration.
pub struct LogConfig {
    /// Directory for log files
    pub log_dir: PathBuf,
    /// Whether stderr is a terminal
    pub is_pty: bool,
    /// Optional custom log filter
    pub log_filter: Option<String>,
}

impl LogConfig {
    /// Create a new logging configuration.
    pub fn new(log_dir: PathBuf) -> Self {
        Self { log_dir, is_pty: atty::is(atty::Stream::Stderr), log_filter: None }
    }

    /// Set custom log filter.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = Some(filter.into());
        self
    }
}

/// Keeps the file writer alive; dropping it flushes pending entries.
pub struct LoggingGuard {
    _worker_guard: Option<WorkerGuard>,
}

/// Initialize logging. Falls back to console-only if the log file cannot be opened.
pub fn init_logging(config: LogConfig) -> LoggingGuard {
    if config.is_pty {
        return init_console_logging(config.log_filter.as_deref());
    }

    match init_file_logging(&config) {
        Ok(guard) => LoggingGuard { _worker_guard: Some(guard) },
        Err(e) => {
            eprintln!("Warning: Failed to initialize file logging: {e}. Using console only.");
            init_console_logging(config.log_filter.as_deref())
        }
    }
}

/// Writer for console output.
fn console_writer() -> fn() -> std::io::Stderr {
    std::io::stderr
}

fn init_console_logging(filter: Option<&str>) -> LoggingGuard {
    tracing_subscriber::fmt()
        .with_writer(console_writer())
        .with_env_filter(build_env_filter(filter))
        .with_target(false)
        .init();

    LoggingGuard { _worker_guard: None }
}

fn init_file_logging(config: &LogConfig) -> Result<WorkerGuard, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&config.log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("iconswap")
        .filename_suffix("log")
        .build(&config.log_dir)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console = console_writer().with_max_level(tracing::Level::INFO);

    tracing_subscriber::fmt()
        .with_writer(console.and(non_blocking))
        .with_env_filter(build_env_filter(config.log_filter.as_deref()))
        .with_ansi(false)
        .with_target(true)
        .init();

    Ok(guard)
}

/// Priority: custom filter > ICONSWAP_LOG > RUST_LOG > default.
fn build_env_filter(custom_filter: Option<&str>) -> EnvFilter {
    if let Some(filter) = custom_filter {
        return EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(default_log_filter()));
    }

    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new(default_log_filter()))
}

/// Default log filter for the build type.
pub fn default_log_filter() -> &'static str {
    #[cfg(debug_assertions)]
    {
        "debug,iconswap=trace,iconswap_core=trace"
    }
    #[cfg(not(debug_assertions))]
    {
        "info,iconswap=info,iconswap_core=info"
    }
}

/// Default log directory.
pub fn log_dir() -> PathBuf {
    crate::services::storage::default_data_dir().join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_custom_filter_falls_back() {
        // Must not panic on garbage directives.
        let _ = build_env_filter(Some("[[[not a filter"));
        let _ = build_env_filter(Some("iconswap_core=debug"));
    }

    #[test]
    fn test_log_config_builder() {
        let config = LogConfig::new(PathBuf::from("/tmp/logs")).with_filter("warn");
        assert_eq!(config.log_filter.as_deref(), Some("warn"));
        assert!(log_dir().ends_with("logs"));
    }

    #[test]
    fn test_console_output_goes_to_stderr() {
        use std::io::Write;
        use tracing_subscriber::fmt::MakeWriter;

        let make_writer = console_writer();
        let mut writer: std::io::Stderr = make_writer.make_writer();
        writer.flush().unwrap();
    }
}
