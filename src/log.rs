//! File-backed diagnostics for the execution core.
//!
//! anvil is a library: stdout and stderr belong to the host process, so
//! diagnostics are appended to a log file instead (default
//! `~/.anvil/anvil.log`). The destination and verbosity come from the crate
//! [`Config`] when the host provides one; `ANVIL_DEBUG=1` in the environment
//! forces DEBUG verbosity either way.
//!
//! What lands where:
//! - ERROR: failed runs surfacing out of the driver
//! - WARN: teardown failures demoted to diagnostics
//! - INFO: run start and finish
//! - DEBUG: phase transitions, registration, config resolution
//! - TRACE: document-level dumps

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;

use crate::config::Config;
use crate::error::Result;

static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();
static LOG_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);

/// Severity of a log line, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => LogLevel::Error,
            1 => LogLevel::Warn,
            2 => LogLevel::Info,
            3 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

/// Initialize logging at the default location, `~/.anvil/anvil.log`.
pub fn init() {
    if let Some(dir) = dirs::home_dir().map(|h| h.join(".anvil")) {
        let _ = std::fs::create_dir_all(&dir);
        init_at(dir.join("anvil.log"), env_level());
    }
}

/// Initialize logging from the crate configuration.
///
/// The log file lands in the configured log directory (created if missing),
/// and `debug = true` raises verbosity to DEBUG.
pub fn init_with_config(config: &Config) -> Result<()> {
    config.ensure_dirs()?;
    let level = if config.debug {
        LogLevel::Debug
    } else {
        env_level()
    };
    init_at(config.log_path()?, level);
    Ok(())
}

/// Point the logger at `path` and set the minimum level.
///
/// The file is truncated so each process run starts with a fresh log. The
/// first initialization wins the path; later calls only adjust the level.
pub fn init_at(path: PathBuf, level: LogLevel) {
    LOG_LEVEL.store(level as u8, Ordering::SeqCst);
    let _ = std::fs::write(&path, "");
    let _ = LOG_PATH.set(path);
}

fn env_level() -> LogLevel {
    let debug = std::env::var("ANVIL_DEBUG")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false);
    if debug {
        LogLevel::Debug
    } else {
        LogLevel::Info
    }
}

/// Set the minimum level that reaches the log file.
pub fn set_level(level: LogLevel) {
    LOG_LEVEL.store(level as u8, Ordering::SeqCst);
}

/// Current minimum level.
pub fn get_level() -> LogLevel {
    LogLevel::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

/// Append a line at `level`.
///
/// Lines below the current level, or logged before initialization, are
/// dropped. Write failures are swallowed: diagnostics must never take down
/// a run.
pub fn log_at(level: LogLevel, msg: &str) {
    if level > get_level() {
        return;
    }
    if let Some(path) = LOG_PATH.get() {
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
            let timestamp = chrono::Local::now().format("%H:%M:%S%.3f");
            let _ = writeln!(file, "[{}] [{}] {}", timestamp, level.as_str(), msg);
        }
    }
}

/// Log a message at ERROR level.
pub fn error(msg: &str) {
    log_at(LogLevel::Error, msg);
}

/// Log a message at WARN level.
pub fn warn(msg: &str) {
    log_at(LogLevel::Warn, msg);
}

/// Log a message at INFO level.
pub fn info(msg: &str) {
    log_at(LogLevel::Info, msg);
}

/// Log a message at DEBUG level.
pub fn debug(msg: &str) {
    log_at(LogLevel::Debug, msg);
}

/// Log a message at TRACE level.
pub fn trace(msg: &str) {
    log_at(LogLevel::Trace, msg);
}

/// Log macro for INFO level.
#[macro_export]
macro_rules! alog {
    ($($arg:tt)*) => {
        $crate::log::info(&format!($($arg)*))
    };
}

/// Log macro for ERROR level.
#[macro_export]
macro_rules! alog_error {
    ($($arg:tt)*) => {
        $crate::log::error(&format!($($arg)*))
    };
}

/// Log macro for WARN level.
#[macro_export]
macro_rules! alog_warn {
    ($($arg:tt)*) => {
        $crate::log::warn(&format!($($arg)*))
    };
}

/// Log macro for DEBUG level.
#[macro_export]
macro_rules! alog_debug {
    ($($arg:tt)*) => {
        $crate::log::debug(&format!($($arg)*))
    };
}

/// Log macro for TRACE level.
#[macro_export]
macro_rules! alog_trace {
    ($($arg:tt)*) => {
        $crate::log::trace(&format!($($arg)*))
    };
}
