//! # nlog
//!
//! Leveled, structured logging with pooled buffers.
//!
//! A [`Logger`] renders every statement through one or more formatters
//! (human-readable console text, JSON lines), each feeding its own set of
//! leveled writers (stdout, stderr, syslog, rotating files), either inline or
//! through a bounded queue drained by a worker thread.
//!
//! ```
//! use nlog::formatters::{ConsoleFormatter, FormatterConfig, TimeResolution};
//! use nlog::writers::IoSink;
//! use nlog::{info, Level, Logger};
//!
//! let console = ConsoleFormatter::new(
//!     FormatterConfig::builder()
//!         .level(Level::Debug)
//!         .date()
//!         .time(TimeResolution::Millisecond)
//!         .writer(IoSink::new(std::io::sink()), Level::Debug)
//!         .build(),
//! );
//! let logger = Logger::builder().prefix("app").formatter(console).build();
//!
//! logger.info().str("user", "alice").int("attempt", 2).msg("login");
//! info!(logger, "listening on {}", 8080);
//! logger.flush().unwrap();
//! ```
//!
//! Statements below the logger's level cost a level comparison: the fluent
//! form returns a shared no-op item and the formatted form returns at once.
//! Writer failures never reach the caller.

pub mod core;
pub mod formatters;
pub mod macros;
pub mod writers;

pub mod prelude {
    pub use crate::core::{
        Buffer, BufferPool, ConfigSource, FieldValue, Item, Level, Loader, Logger, LoggerBuilder,
        LoggerError, Result,
    };
    pub use crate::formatters::{
        ConsoleFormatter, Formatter, FormatterConfig, Hook, HookFields, JsonFormatter,
        TimeResolution,
    };
    pub use crate::writers::{
        LeveledWriter, MultiWriter, ParallelWriter, RotatingFile, RotationPolicy, Sink, Writer,
    };
}

pub use crate::core::{
    Buffer, BufferPool, FieldValue, Item, Level, Loader, Logger, LoggerBuilder, LoggerError,
    PoolMetrics, Result, WriterMetrics,
};
