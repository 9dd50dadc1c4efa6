//! Logger instances and sub-loggers
//!
//! A [`Logger`] owns its formatters and item pool behind an `Arc`, so clones
//! and sub-loggers are cheap handles onto the same output. Nothing here is
//! global: build as many independent instances as needed.
//!
//! # Source locations
//!
//! Every public entry point is `#[track_caller]`, so `file:line` always
//! names the statement in application code no matter how deeply loggers are
//! nested. The numeric depth carried alongside ([`Caller::depth`]) is the
//! formatter's base depth plus one per sub-logger level.

use super::error::{LoggerError, Result};
use super::item::{Item, NULL_ITEM};
use super::level::Level;
use super::metrics::PoolMetrics;
use super::pool::{BufferPool, ItemPool};
use crate::formatters::{
    Caller, ConsoleFormatter, Formatter, FormatterConfig, Record, TimeResolution,
    DEFAULT_CALLER_DEPTH,
};
use std::fmt;
use std::sync::Arc;

struct LoggerCore {
    formatters: Vec<Box<dyn Formatter>>,
    items: ItemPool,
    depth: usize,
}

impl LoggerCore {
    fn flush(&self) -> Result<()> {
        let failures = self
            .formatters
            .iter()
            .enumerate()
            .filter_map(|(idx, formatter)| formatter.flush().err().map(|e| (idx, e)))
            .collect();
        match LoggerError::write_failures(failures) {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for LoggerCore {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            eprintln!("[nlog WARN] flush on drop failed: {}", e);
        }
    }
}

/// Leveled, structured logger
///
/// # Example
///
/// ```
/// use nlog::formatters::{FormatterConfig, JsonFormatter};
/// use nlog::writers::IoSink;
/// use nlog::{Level, Logger};
///
/// let json = JsonFormatter::new(
///     FormatterConfig::builder()
///         .level(Level::Debug)
///         .writer(IoSink::new(std::io::sink()), Level::Debug)
///         .build(),
/// );
/// let logger = Logger::builder()
///     .prefix("api")
///     .min_level(Level::Info)
///     .formatter(json)
///     .build();
///
/// logger.info().str("path", "/health").int("status", 200).msg("request");
/// logger.warnf(format_args!("slow request: {}ms", 1200));
///
/// let db = logger.sub("db");
/// db.error().err(&std::io::Error::other("timeout")).msg("query failed");
///
/// logger.flush().unwrap();
/// ```
#[derive(Clone)]
pub struct Logger {
    core: Arc<LoggerCore>,
    prefix: Arc<str>,
    min_level: Level,
    sub_depth: usize,
}

impl Logger {
    /// Logger at `Debug` writing console lines with date and time to stderr
    #[must_use]
    pub fn new() -> Self {
        LoggerBuilder::new().build()
    }

    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Least severe level this logger emits
    pub fn level(&self) -> Level {
        self.min_level
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Formatters in registration order; use [`Formatter::writer`] to
    /// attach or detach writers at runtime
    pub fn formatters(&self) -> &[Box<dyn Formatter>] {
        &self.core.formatters
    }

    /// Field set reuse counters
    pub fn item_metrics(&self) -> &PoolMetrics {
        self.core.items.metrics()
    }

    /// Line buffer reuse counters
    pub fn buffer_metrics(&self) -> &PoolMetrics {
        self.core.items.buffers().metrics()
    }

    /// Derive a logger sharing this one's formatters and pools under a new prefix
    #[must_use]
    pub fn sub(&self, prefix: &str) -> Logger {
        self.sub_with_level(prefix, self.min_level)
    }

    /// Like [`sub`](Self::sub) with its own minimum level
    #[must_use]
    pub fn sub_with_level(&self, prefix: &str, min_level: Level) -> Logger {
        Logger {
            core: Arc::clone(&self.core),
            prefix: Arc::from(prefix),
            min_level,
            sub_depth: self.sub_depth + 1,
        }
    }

    /// Flush and close every writer of every formatter.
    ///
    /// Queued writers are drained first. Safe to call more than once; the
    /// last handle to go out of scope flushes as well.
    pub fn flush(&self) -> Result<()> {
        self.core.flush()
    }

    #[track_caller]
    fn caller(&self) -> Caller {
        Caller::here(self.core.depth + self.sub_depth)
    }

    /// Start a statement at `level`; a no-op item if the level is filtered
    #[track_caller]
    pub fn log(&self, level: Level) -> Item<'_> {
        if !level.enabled(self.min_level) {
            return NULL_ITEM;
        }
        self.core
            .items
            .get(level, &self.prefix, self.caller(), &self.core.formatters)
    }

    /// Log a formatted message at `level` with no fields
    #[track_caller]
    pub fn logf(&self, level: Level, args: fmt::Arguments<'_>) {
        if !level.enabled(self.min_level) {
            return;
        }
        let record = Record {
            level,
            prefix: &self.prefix,
            fields: None,
            message: args,
            caller: self.caller(),
        };
        let buffers = self.core.items.buffers();
        for formatter in &self.core.formatters {
            if level.enabled(formatter.level()) {
                formatter.log(buffers, &record);
            }
        }
    }

    /// Fatal is a severity only; the process keeps running
    #[track_caller]
    pub fn fatal(&self) -> Item<'_> {
        self.log(Level::Fatal)
    }

    #[track_caller]
    pub fn error(&self) -> Item<'_> {
        self.log(Level::Error)
    }

    #[track_caller]
    pub fn warn(&self) -> Item<'_> {
        self.log(Level::Warning)
    }

    #[track_caller]
    pub fn notice(&self) -> Item<'_> {
        self.log(Level::Notice)
    }

    #[track_caller]
    pub fn info(&self) -> Item<'_> {
        self.log(Level::Info)
    }

    #[track_caller]
    pub fn debug(&self) -> Item<'_> {
        self.log(Level::Debug)
    }

    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Fatal, args)
    }

    #[track_caller]
    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Error, args)
    }

    #[track_caller]
    pub fn warnf(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Warning, args)
    }

    #[track_caller]
    pub fn noticef(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Notice, args)
    }

    #[track_caller]
    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Info, args)
    }

    #[track_caller]
    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Debug, args)
    }

    /// Space-joined values at `Debug`
    #[track_caller]
    pub fn print(&self, values: &[&dyn fmt::Display]) {
        self.logf(Level::Debug, format_args!("{}", Joined(values)))
    }

    #[track_caller]
    pub fn printf(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Debug, args)
    }

    /// Same as [`print`](Self::print); lines are always newline-terminated
    #[track_caller]
    pub fn println(&self, values: &[&dyn fmt::Display]) {
        self.logf(Level::Debug, format_args!("{}", Joined(values)))
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("prefix", &self.prefix)
            .field("min_level", &self.min_level)
            .field("sub_depth", &self.sub_depth)
            .field(
                "formatters",
                &self
                    .core
                    .formatters
                    .iter()
                    .map(|f| f.name())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

struct Joined<'a>(&'a [&'a dyn fmt::Display]);

impl fmt::Display for Joined<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, value) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", value)?;
        }
        Ok(())
    }
}

/// Builder for [`Logger`]
///
/// With no formatter added, the logger gets a console formatter printing
/// date and time to stderr at the logger's level.
pub struct LoggerBuilder {
    prefix: String,
    min_level: Level,
    formatters: Vec<Box<dyn Formatter>>,
    buffers: Option<Arc<BufferPool>>,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            prefix: String::new(),
            min_level: Level::Debug,
            formatters: Vec::new(),
            buffers: None,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn formatter<F: Formatter + 'static>(self, formatter: F) -> Self {
        self.boxed_formatter(Box::new(formatter))
    }

    #[must_use = "builder methods return a new value"]
    pub fn boxed_formatter(mut self, formatter: Box<dyn Formatter>) -> Self {
        self.formatters.push(formatter);
        self
    }

    /// Share line buffers with other loggers
    #[must_use = "builder methods return a new value"]
    pub fn buffer_pool(mut self, pool: Arc<BufferPool>) -> Self {
        self.buffers = Some(pool);
        self
    }

    pub fn build(mut self) -> Logger {
        if self.formatters.is_empty() {
            self.formatters.push(Box::new(ConsoleFormatter::new(
                FormatterConfig::builder()
                    .level(self.min_level)
                    .date()
                    .time(TimeResolution::Second)
                    .build(),
            )));
        }
        let depth = self
            .formatters
            .first()
            .map_or(DEFAULT_CALLER_DEPTH, |f| f.call_depth(0));
        let buffers = self.buffers.unwrap_or_default();

        Logger {
            core: Arc::new(LoggerCore {
                formatters: self.formatters,
                items: ItemPool::new(buffers),
                depth,
            }),
            prefix: Arc::from(self.prefix),
            min_level: self.min_level,
            sub_depth: 0,
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
