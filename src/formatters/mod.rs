//! Line formatters
//!
//! A [`Formatter`] turns one log statement into one output line and hands it
//! to its [`MultiWriter`]. Field fragments are rendered ahead of time, one
//! buffer per formatter, through [`Formatter::write_field`]; the final line
//! is assembled by [`Formatter::log`].
//!
//! Both bundled formatters share [`FormatterConfig`], built with
//! [`FormatterConfig::builder`].

pub mod console;
pub mod hook;
pub mod json;
pub mod timestamp;

use crate::core::buffer::Buffer;
use crate::core::{default_marshal, BufferPool, FieldValue, Level, MarshalFn, Result};
use crate::writers::{LeveledWriter, MultiWriter, ParallelWriter, Sink, Writer};
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

pub use console::ConsoleFormatter;
pub use hook::{Hook, HookFields};
pub use json::JsonFormatter;
pub use timestamp::{TimeFormat, TimeResolution};

/// Caller depth used when none (or an implausibly small one) is configured
pub const DEFAULT_CALLER_DEPTH: usize = 4;

/// Source location of a log statement plus the frame depth it was taken at.
///
/// Locations are captured with `#[track_caller]` at every public logging
/// entry point, so `location` is always the user's call site. `depth` is the
/// number of wrapper frames between the user and the formatter (base depth
/// plus one per sub-logger level), kept for formatters that want to report
/// it.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub location: &'static Location<'static>,
    pub depth: usize,
}

impl Caller {
    #[track_caller]
    pub fn here(depth: usize) -> Self {
        Self {
            location: Location::caller(),
            depth,
        }
    }

    pub fn file(&self) -> &'static str {
        self.location.file()
    }

    pub fn line(&self) -> u32 {
        self.location.line()
    }
}

/// Everything a formatter needs to render one line
pub struct Record<'a> {
    pub level: Level,
    pub prefix: &'a str,
    /// Fields accumulated for this formatter, already in its syntax
    pub fields: Option<&'a Buffer>,
    pub message: fmt::Arguments<'a>,
    pub caller: Caller,
}

/// Renders log lines in one output syntax
pub trait Formatter: Send + Sync {
    /// Prepare derived state (level tokens, colors). Safe to call again.
    fn init(&mut self) {}

    fn name(&self) -> &str;

    /// Least severe level this formatter renders
    fn level(&self) -> Level;

    /// Configured caller depth adjusted by `sub` extra frames
    fn call_depth(&self, sub: usize) -> usize;

    /// Write the separator and key that open a field
    fn begin_field(&self, buf: &mut Buffer, key: &str);

    /// Close a field opened with [`begin_field`](Self::begin_field)
    fn end_field(&self, _buf: &mut Buffer) {}

    /// Whether string values are quoted in this syntax
    fn quotes_values(&self) -> bool;

    fn marshal_fn(&self) -> &MarshalFn;

    /// Render `record` and write it out. Writer errors are dropped.
    fn log(&self, pool: &BufferPool, record: &Record<'_>);

    /// Flush and close every writer
    fn flush(&self) -> Result<()>;

    /// Writers this formatter outputs to; writers can be attached or
    /// detached at runtime
    fn writer(&self) -> &MultiWriter;

    /// Render one key/value pair, unless `level` is filtered by this formatter
    fn write_field(
        &self,
        buf: &mut Buffer,
        level: Level,
        key: &str,
        value: &mut dyn FnMut(&mut Buffer, bool),
    ) {
        if !level.enabled(self.level()) {
            return;
        }
        self.begin_field(buf, key);
        value(buf, self.quotes_values());
        self.end_field(buf);
    }

    fn append_kv(&self, buf: &mut Buffer, level: Level, key: &str, value: &FieldValue) {
        let marshal = self.marshal_fn();
        self.write_field(buf, level, key, &mut |buf, quoted| {
            buf.append_any(value, quoted, marshal);
        });
    }
}

/// Settings shared by the console and JSON formatters
#[derive(Clone)]
pub struct FormatterConfig {
    pub level: Level,
    pub no_print_level: bool,
    pub time: TimeFormat,
    pub file_loc: bool,
    /// Prefix removed from reported source paths
    pub file_loc_strip: String,
    pub file_loc_caller_depth: usize,
    /// Console only
    pub colored: bool,
    pub marshal: MarshalFn,
    pub hooks: Vec<Arc<dyn Hook>>,
    /// Defaults to stderr at `level` when left empty
    pub writer: Option<Arc<MultiWriter>>,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            level: Level::Info,
            no_print_level: false,
            time: TimeFormat::default(),
            file_loc: false,
            file_loc_strip: String::new(),
            file_loc_caller_depth: DEFAULT_CALLER_DEPTH,
            colored: false,
            marshal: default_marshal(),
            hooks: Vec::new(),
            writer: None,
        }
    }
}

impl fmt::Debug for FormatterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatterConfig")
            .field("level", &self.level)
            .field("no_print_level", &self.no_print_level)
            .field("time", &self.time)
            .field("file_loc", &self.file_loc)
            .field("file_loc_strip", &self.file_loc_strip)
            .field("file_loc_caller_depth", &self.file_loc_caller_depth)
            .field("colored", &self.colored)
            .field("hooks", &self.hooks.len())
            .field("writers", &self.writer.as_ref().map(|w| w.len()))
            .finish()
    }
}

impl FormatterConfig {
    pub fn builder() -> FormatterConfigBuilder {
        FormatterConfigBuilder::default()
    }

    /// Fill in defaults and hand out the writer the formatter will own
    pub(crate) fn finish(&mut self) -> Arc<MultiWriter> {
        if self.file_loc_caller_depth < 3 {
            self.file_loc_caller_depth = DEFAULT_CALLER_DEPTH;
        }
        let level = self.level;
        Arc::clone(self.writer.get_or_insert_with(|| {
            Arc::new(MultiWriter::new(vec![Arc::new(Writer::stderr(level))]))
        }))
    }

    pub(crate) fn call_depth(&self, sub: usize) -> usize {
        self.file_loc_caller_depth.saturating_sub(sub)
    }
}

/// Builder for [`FormatterConfig`]
///
/// # Example
///
/// ```
/// use nlog::formatters::{FormatterConfig, JsonFormatter, TimeResolution};
/// use nlog::writers::IoSink;
/// use nlog::Level;
///
/// let config = FormatterConfig::builder()
///     .level(Level::Debug)
///     .time(TimeResolution::Millisecond)
///     .utc()
///     .file_loc("")
///     .writer(IoSink::new(std::io::sink()), Level::Debug)
///     .build();
/// let formatter = JsonFormatter::new(config);
/// ```
#[derive(Default)]
pub struct FormatterConfigBuilder {
    config: FormatterConfig,
    writers: Vec<Arc<dyn LeveledWriter>>,
}

impl FormatterConfigBuilder {
    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: Level) -> Self {
        self.config.level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn no_print_level(mut self) -> Self {
        self.config.no_print_level = true;
        self
    }

    /// Print the date as `YYYY/MM/DD`; turns unix time off
    #[must_use = "builder methods return a new value"]
    pub fn date(mut self) -> Self {
        self.config.time.date = true;
        self.config.time.unix = false;
        self
    }

    /// Print the clock time at `resolution`; turns unix time off
    #[must_use = "builder methods return a new value"]
    pub fn time(mut self, resolution: TimeResolution) -> Self {
        self.config.time.time = true;
        self.config.time.unix = false;
        self.config.time.resolution = resolution;
        self
    }

    /// Print unix time counted in `resolution` units.
    ///
    /// A unix stamp replaces the calendar one, so this turns both the date
    /// and the clock time off.
    #[must_use = "builder methods return a new value"]
    pub fn unix_time(mut self, resolution: TimeResolution) -> Self {
        self.config.time.unix = true;
        self.config.time.date = false;
        self.config.time.time = false;
        self.config.time.resolution = resolution;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn utc(mut self) -> Self {
        self.config.time.utc = true;
        self
    }

    /// Report `file:line`, with `strip` removed from the front of the path
    #[must_use = "builder methods return a new value"]
    pub fn file_loc(mut self, strip: impl Into<String>) -> Self {
        self.config.file_loc = true;
        self.config.file_loc_strip = normalize_strip(strip.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn caller_depth(mut self, depth: usize) -> Self {
        self.config.file_loc_caller_depth = depth;
        self
    }

    /// ANSI colors (console formatter only)
    #[must_use = "builder methods return a new value"]
    pub fn colored(mut self) -> Self {
        self.config.colored = true;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn marshal_fn(mut self, marshal: MarshalFn) -> Self {
        self.config.marshal = marshal;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn hook(mut self, hook: impl Hook + 'static) -> Self {
        self.config.hooks.push(Arc::new(hook));
        self
    }

    /// Closure form of [`hook`](Self::hook)
    #[must_use = "builder methods return a new value"]
    pub fn hook_fn<F>(self, hook: F) -> Self
    where
        F: Fn(Level, &mut HookFields<'_>, &str) + Send + Sync + 'static,
    {
        self.hook(hook)
    }

    /// Attach a synchronous writer
    #[must_use = "builder methods return a new value"]
    pub fn writer<S: Sink + 'static>(mut self, sink: S, level: Level) -> Self {
        self.writers.push(Arc::new(Writer::new(sink, level)));
        self
    }

    /// Attach a queued writer with room for `queue_len` lines
    #[must_use = "builder methods return a new value"]
    pub fn parallel_writer<S: Sink + 'static>(mut self, sink: S, queue_len: usize, level: Level) -> Self {
        self.writers
            .push(Arc::new(ParallelWriter::new(sink, queue_len, level)));
        self
    }

    /// Attach an already built writer; keep a clone to remove it later
    #[must_use = "builder methods return a new value"]
    pub fn leveled_writer(mut self, writer: Arc<dyn LeveledWriter>) -> Self {
        self.writers.push(writer);
        self
    }

    pub fn build(mut self) -> FormatterConfig {
        if !self.writers.is_empty() {
            self.config.writer = Some(Arc::new(MultiWriter::new(self.writers)));
        }
        self.config
    }
}

fn normalize_strip(strip: String) -> String {
    if strip.is_empty() || strip.ends_with('/') || strip.ends_with(std::path::MAIN_SEPARATOR) {
        strip
    } else {
        format!("{}{}", strip, std::path::MAIN_SEPARATOR)
    }
}

/// Append `file:line`, optionally quoted. Unknown locations render as `???:0`.
pub(crate) fn append_file_loc(buf: &mut Buffer, strip: &str, caller: &Caller, quoted: bool) {
    let (file, line) = match caller.file() {
        "" => ("???", 0),
        file => (file.strip_prefix(strip).unwrap_or(file), caller.line()),
    };
    if quoted {
        buf.append_byte(b'"');
    }
    buf.append_str(file, false)
        .append_byte(b':')
        .append_u64(u64::from(line));
    if quoted {
        buf.append_byte(b'"');
    }
}
