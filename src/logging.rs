//! Process-wide logging setup.
//!
//! The level is decided once in `main` and passed in here; nothing else in
//! the crate touches the global subscriber.

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::config::LogLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: Level,
}

impl LoggingConfig {
    /// `--verbose` wins; otherwise use the configured level.
    pub fn resolve(verbose: bool, configured: LogLevel) -> Self {
        let level = if verbose {
            Level::DEBUG
        } else {
            configured.into()
        };
        Self { level }
    }
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warning => Level::WARN,
            // tracing has nothing above ERROR
            LogLevel::Error | LogLevel::Critical => Level::ERROR,
        }
    }
}

/// Install the global subscriber. Logs go to stderr so stdout carries only
/// the report.
pub fn init(config: LoggingConfig) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.level)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    Ok(())
}
