//! Logging backend
//!
//! The library only talks to the `log` facade. Binaries pick a verbosity with
//! [`LogLevel`] and install `env_logger` with [`init`].

use std::fmt;
use std::str::FromStr;

use log::{Level, LevelFilter};

/// Verbosity levels, from silent to everything.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Nothing = 0,
    User = 1,
    Error = 2,
    Warning = 3,
    #[default]
    Info = 4,
    Debug = 5,
    All = 6,
}

impl LogLevel {
    /// Create a LogLevel from an integer; unknown values map to `Info`.
    pub fn from_i32(level: i32) -> Self {
        match level {
            0 => LogLevel::Nothing,
            1 => LogLevel::User,
            2 => LogLevel::Error,
            3 => LogLevel::Warning,
            4 => LogLevel::Info,
            5 => LogLevel::Debug,
            6 => LogLevel::All,
            _ => LogLevel::Info,
        }
    }

    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Nothing => LevelFilter::Off,
            LogLevel::User | LogLevel::Error => LevelFilter::Error,
            LogLevel::Warning => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::All => LevelFilter::Trace,
        }
    }

    /// `log` level used by the convenience macros.
    pub fn as_log_level(self) -> Level {
        match self {
            LogLevel::Nothing | LogLevel::User | LogLevel::Error => Level::Error,
            LogLevel::Warning => Level::Warn,
            LogLevel::Info => Level::Info,
            LogLevel::Debug => Level::Debug,
            LogLevel::All => Level::Trace,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            LogLevel::Nothing => "nothing",
            LogLevel::User => "user",
            LogLevel::Error => "error",
            LogLevel::Warning => "warning",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::All => "all",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown log level: {0}")]
pub struct ParseLogLevelError(pub String);

impl FromStr for LogLevel {
    type Err = ParseLogLevelError;

    /// Accepts level names (`warn` as an alias for `warning`) or the numeric
    /// value `0..=6`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "nothing" | "off" | "none" => Ok(LogLevel::Nothing),
            "user" => Ok(LogLevel::User),
            "error" => Ok(LogLevel::Error),
            "warning" | "warn" => Ok(LogLevel::Warning),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "all" | "trace" => Ok(LogLevel::All),
            _ => match lower.parse::<i32>() {
                Ok(n) if (0..=6).contains(&n) => Ok(LogLevel::from_i32(n)),
                _ => Err(ParseLogLevelError(s.to_string())),
            },
        }
    }
}

/// Install `env_logger` with `level` as the default filter and set the
/// global verbosity. `RUST_LOG` directives take precedence over `level`.
///
/// A second call only adjusts the global verbosity; it cannot raise it past
/// the filter the first call installed.
pub fn init(level: LogLevel) {
    let installed = env_logger::Builder::new()
        .filter_level(level.to_level_filter())
        .parse_env(env_logger::Env::default())
        .format_timestamp_micros()
        .try_init();
    if installed.is_err() {
        log::set_max_level(level.to_level_filter());
        log::debug!("Logger already installed; updating level to {}", level);
    }
}

/// Convenience macro for fatal errors
#[macro_export]
macro_rules! log_fatal {
    ($($arg:tt)*) => {
        log::log!($crate::logging::LogLevel::User.as_log_level(), $($arg)*)
    };
}

/// Convenience macro for errors
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        log::log!($crate::logging::LogLevel::Error.as_log_level(), $($arg)*)
    };
}

/// Convenience macro for warnings
#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)*) => {
        log::log!($crate::logging::LogLevel::Warning.as_log_level(), $($arg)*)
    };
}

/// Convenience macro for info messages
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        log::log!($crate::logging::LogLevel::Info.as_log_level(), $($arg)*)
    };
}

/// Convenience macro for debug messages
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        log::log!($crate::logging::LogLevel::Debug.as_log_level(), $($arg)*)
    };
}
