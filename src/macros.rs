//! Formatting macros
//!
//! Shorthands for the formatted entry points of [`Logger`](crate::Logger):
//! `info!(logger, "x = {}", x)` is `logger.infof(format_args!("x = {}", x))`.
//! For structured fields use the fluent form (`logger.info().str(..).msg(..)`).
//!
//! ```
//! use nlog::{debug, error, info, Logger};
//!
//! let logger = Logger::new();
//! info!(logger, "server started");
//! debug!(logger, "{} workers", 4);
//! error!(logger, "bind failed: {}", "address in use");
//! ```

/// Log a formatted message at the given level.
///
/// ```
/// # use nlog::{Level, Logger};
/// # let logger = Logger::new();
/// use nlog::log;
/// log!(logger, Level::Notice, "config reloaded");
/// log!(logger, Level::Error, "status {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.logf($level, ::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! notice {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Notice, $($arg)+)
    };
}

#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Warning, $($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Error, $($arg)+)
    };
}

/// Log at `Fatal`. The process is not terminated.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Fatal, $($arg)+)
    };
}
