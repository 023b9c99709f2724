//! Logging setup shared by the efs-cloud crates
//!
//! Events are emitted with `emit` and written to stderr by `emit_term`.
//! The level comes from the EFS_CLOUD_LOG environment variable:
//! - `off` (default): nothing is written
//! - `error`, `warn`, `info`: increasingly chatty operational logs
//! - `debug`: request and response dumps for every remote call

use std::sync::Once;

// Re-export emit so macros can use it
pub use emit;

/// Environment variable holding the log level
pub const LOG_ENV: &str = "EFS_CLOUD_LOG";

static INIT: Once = Once::new();

/// Parsed value of EFS_CLOUD_LOG
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSetting {
    Off,
    Level(emit::Level),
    /// Unrecognized value; logging falls back to info
    Unknown,
}

pub fn parse_level(value: &str) -> LogSetting {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "off" => LogSetting::Off,
        "error" => LogSetting::Level(emit::Level::Error),
        "warn" => LogSetting::Level(emit::Level::Warn),
        "info" => LogSetting::Level(emit::Level::Info),
        "debug" => LogSetting::Level(emit::Level::Debug),
        _ => LogSetting::Unknown,
    }
}

/// Initialize logging from EFS_CLOUD_LOG.
///
/// Call once at startup; later calls are ignored.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let value = std::env::var(LOG_ENV).unwrap_or_default();

        let level = match parse_level(&value) {
            LogSetting::Off => return,
            LogSetting::Level(level) => level,
            LogSetting::Unknown => emit::Level::Info,
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(level))
            .init();

        if parse_level(&value) == LogSetting::Unknown {
            emit::warn!("Unknown {env} value {value}, using info", env: LOG_ENV, value: value);
        }

        // The runtime lives for the rest of the process
        std::mem::forget(rt);
    });
}

/// Operational events: reuse hits, mount target picks, created resources
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Request and response details of remote calls
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

pub use init_diagnostics as init;
