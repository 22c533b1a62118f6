//! Logging infrastructure for the balancing engine
//!
//! This module provides structured logging for the fee adjuster and the
//! migration driver on top of the `log` facade:
//!
//! - Never logs UTxO keys or addresses; records carry counts and amounts
//!   only, taken from [`CoinSelection::summary`](crate::selection::CoinSelection::summary)
//! - Categorizes records by subsystem context
//! - Provides both human-readable and machine-parseable (JSON) output
//!
//! Hosts that already install their own `log` backend can ignore
//! [`init`] entirely; the library only emits through the facade.
//!
//! # Usage
//!
//! ```
//! use coinvault_core::logging::{self, LogConfig, LogLevel};
//!
//! let config = LogConfig {
//!     level: LogLevel::Debug,
//!     json_format: false,
//!     ..LogConfig::default()
//! };
//! let _ = logging::init(&config);
//! ```

use chrono::Local;
use log::{debug, error, info, trace, warn, LevelFilter};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Write as IoWrite;

/// Log severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    /// Error conditions
    Error,
    /// Warning conditions
    Warn,
    /// Informational messages
    Info,
    /// Debug-level messages
    Debug,
    /// Trace level (very verbose)
    Trace,
}

/// Subsystem categories for structured records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogContext {
    /// Fee adjustment iterations and residual decisions
    Fee,
    /// Selection construction and bookkeeping
    Selection,
    /// UTxO migration batches
    Migration,
}

/// Configuration for the logging system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default log level for all contexts
    pub level: LogLevel,
    /// Whether to include timestamps in log messages
    pub include_timestamps: bool,
    /// Whether to include source location in log messages
    pub include_source_location: bool,
    /// Whether to use JSON format for logs (machine-readable)
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            include_timestamps: true,
            include_source_location: false,
            json_format: false,
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Initialize the logging system with the given configuration.
///
/// Fails when another logger is already installed; library hosts that
/// configure their own backend should skip this call.
pub fn init(config: &LogConfig) -> Result<(), String> {
    let include_timestamps = config.include_timestamps;
    let include_source_location = config.include_source_location;
    let json_format = config.json_format;

    let mut builder = env_logger::Builder::new();
    builder.filter_level(config.level.into());

    builder.format(move |buf, record| {
        if json_format {
            let entry = json!({
                "timestamp": Local::now().to_rfc3339(),
                "level": record.level().to_string(),
                "target": record.target().to_string(),
                "message": record.args().to_string(),
            });
            writeln!(buf, "{}", entry)
        } else {
            if include_timestamps {
                let _ = write!(buf, "[{}] ", Local::now().format("%Y-%m-%d %H:%M:%S"));
            }
            let _ = write!(buf, "{:<5} ", record.level());
            if include_source_location {
                if let (Some(file), Some(line)) = (record.file(), record.line()) {
                    let _ = write!(buf, "[{}:{}] ", file, line);
                }
            }
            writeln!(buf, "{}", record.args())
        }
    });

    builder.target(env_logger::Target::Stdout);
    builder.try_init().map_err(|e| e.to_string())
}

/// Update the log level dynamically.
pub fn set_log_level(level: LogLevel) {
    log::set_max_level(level.into());
}

fn format_log_entry(
    context: LogContext,
    message: &str,
    params: Option<serde_json::Value>,
) -> String {
    match params {
        Some(params) => format!("[{:?}] {} {}", context, message, params),
        None => format!("[{:?}] {}", context, message),
    }
}

/// Log a fee-balancing event with structured context.
pub fn log_fee(level: LogLevel, message: &str, params: Option<serde_json::Value>) {
    emit(level, format_log_entry(LogContext::Fee, message, params));
}

/// Log a migration event with structured context.
pub fn log_migration(level: LogLevel, message: &str, params: Option<serde_json::Value>) {
    emit(level, format_log_entry(LogContext::Migration, message, params));
}

fn emit(level: LogLevel, formatted: String) {
    match level {
        LogLevel::Error => error!("{}", formatted),
        LogLevel::Warn => warn!("{}", formatted),
        LogLevel::Info => info!("{}", formatted),
        LogLevel::Debug => debug!("{}", formatted),
        LogLevel::Trace => trace!("{}", formatted),
    }
}
