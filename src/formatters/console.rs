//! Human-readable console formatter
//!
//! Lines look like
//!
//! ```text
//! 2024/05/01 13:45:10 INF [db] connected host=10.0.0.2 retries=3 src/db.rs:42
//! ```
//!
//! With colors on, level tokens, the prefix, keys, values and the location
//! are wrapped in ANSI escapes. Colors are written whenever they are
//! enabled, whether or not the destination is a terminal.

use super::hook::run_hooks;
use super::{append_file_loc, Formatter, FormatterConfig, Record};
use crate::core::buffer::Buffer;
use crate::core::{BufferPool, Level, MarshalFn, Result};
use crate::writers::{LeveledWriter, MultiWriter};
use std::fmt::Write as _;
use std::sync::Arc;

const RESET: &str = "\x1b[0m";

/// Escape sequences in use; all empty when colors are off
#[derive(Debug, Clone, Default)]
struct Palette {
    levels: [String; 6],
    name: String,
    key: String,
    value: String,
    loc: String,
    reset: &'static str,
}

impl Palette {
    fn plain() -> Self {
        Self {
            levels: Level::ALL.map(|l| format!("{} ", l.code())),
            ..Self::default()
        }
    }

    #[cfg(feature = "console")]
    fn ansi() -> Self {
        use colored::Color;

        fn paint(color: Color) -> String {
            format!("\x1b[1;{}m", color.to_fg_str())
        }

        Self {
            levels: Level::ALL.map(|l| format!("{}{}{} ", paint(l.color_code()), l.code(), RESET)),
            name: paint(Color::Green),
            key: paint(Color::Magenta),
            value: paint(Color::Cyan),
            loc: paint(Color::Black),
            reset: RESET,
        }
    }

    #[cfg(not(feature = "console"))]
    fn ansi() -> Self {
        Self::plain()
    }
}

/// Console formatter
///
/// # Example
///
/// ```
/// use nlog::formatters::{ConsoleFormatter, FormatterConfig, TimeResolution};
/// use nlog::{Level, Logger};
///
/// let console = ConsoleFormatter::new(
///     FormatterConfig::builder()
///         .level(Level::Debug)
///         .date()
///         .time(TimeResolution::Millisecond)
///         .build(),
/// );
/// let logger = Logger::builder().formatter(console).build();
/// logger.info().str("user", "alice").msg("logged in");
/// ```
pub struct ConsoleFormatter {
    config: FormatterConfig,
    writer: Arc<MultiWriter>,
    palette: Palette,
}

impl ConsoleFormatter {
    pub fn new(mut config: FormatterConfig) -> Self {
        let writer = config.finish();
        let mut formatter = Self {
            config,
            writer,
            palette: Palette::plain(),
        };
        formatter.init();
        formatter
    }

    pub fn config(&self) -> &FormatterConfig {
        &self.config
    }
}

impl Default for ConsoleFormatter {
    fn default() -> Self {
        Self::new(FormatterConfig::default())
    }
}

impl Formatter for ConsoleFormatter {
    fn init(&mut self) {
        self.palette = if self.config.colored {
            Palette::ansi()
        } else {
            Palette::plain()
        };
    }

    fn name(&self) -> &str {
        "console"
    }

    fn level(&self) -> Level {
        self.config.level
    }

    fn call_depth(&self, sub: usize) -> usize {
        self.config.call_depth(sub)
    }

    fn begin_field(&self, buf: &mut Buffer, key: &str) {
        let p = &self.palette;
        buf.append_byte(b' ')
            .append_str(&p.key, false)
            .append_str(key, false)
            .append_str(p.reset, false)
            .append_byte(b'=')
            .append_str(&p.value, false);
    }

    fn end_field(&self, buf: &mut Buffer) {
        buf.append_str(self.palette.reset, false);
    }

    fn quotes_values(&self) -> bool {
        false
    }

    fn marshal_fn(&self) -> &MarshalFn {
        &self.config.marshal
    }

    fn log(&self, pool: &BufferPool, record: &Record<'_>) {
        let p = &self.palette;
        let mut line = pool.get();

        if self.config.time.append_now(&mut line, false) {
            line.append_byte(b' ');
        }
        if !self.config.no_print_level {
            line.append_str(&p.levels[record.level as usize], false);
        }
        if !record.prefix.is_empty() {
            line.append_str(&p.name, false)
                .append_byte(b'[')
                .append_str(record.prefix, false)
                .append_byte(b']')
                .append_str(p.reset, false)
                .append_byte(b' ');
        }

        let mut message = pool.get();
        let _ = message.write_fmt(record.message);
        line.append_bytes(message.as_bytes());

        if !self.config.hooks.is_empty() {
            let mut hook_fields = pool.get();
            run_hooks(
                self,
                &self.config.hooks,
                record.level,
                &mut hook_fields,
                &message.as_str_lossy(),
            );
            line.append_bytes(hook_fields.as_bytes());
            pool.put(hook_fields);
        }
        pool.put(message);

        if let Some(fields) = record.fields {
            line.append_bytes(fields.as_bytes());
        }
        if self.config.file_loc {
            line.append_byte(b' ').append_str(&p.loc, false);
            append_file_loc(&mut line, &self.config.file_loc_strip, &record.caller, false);
            line.append_str(p.reset, false);
        }
        line.append_byte(b'\n');

        let _ = self.writer.write_if_level(record.level, line.as_bytes());
        pool.put(line);
    }

    fn flush(&self) -> Result<()> {
        self.writer.close()
    }

    fn writer(&self) -> &MultiWriter {
        &self.writer
    }
}
