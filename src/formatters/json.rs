//! One JSON object per line
//!
//! ```text
//! {"time":"2024/05/01 13:45:10","level":"INF","logger":"db","msg":"connected","host":"10.0.0.2","loc":"src/db.rs:42"}
//! ```
//!
//! Structural keys come first in a fixed order (time, level, logger, msg),
//! then hook fields, then caller fields in call order, then `loc`. Unix
//! timestamps are emitted as numbers.

use super::hook::run_hooks;
use super::{append_file_loc, Formatter, FormatterConfig, Record};
use crate::core::buffer::Buffer;
use crate::core::{BufferPool, Level, MarshalFn, Result};
use crate::writers::{LeveledWriter, MultiWriter};
use std::fmt::Write as _;
use std::sync::Arc;

pub const TIME_KEY: &str = "time";
pub const LEVEL_KEY: &str = "level";
pub const NAME_KEY: &str = "logger";
pub const MSG_KEY: &str = "msg";
pub const LOC_KEY: &str = "loc";

pub struct JsonFormatter {
    config: FormatterConfig,
    writer: Arc<MultiWriter>,
}

impl JsonFormatter {
    pub fn new(mut config: FormatterConfig) -> Self {
        let writer = config.finish();
        let mut formatter = Self { config, writer };
        formatter.init();
        formatter
    }

    pub fn config(&self) -> &FormatterConfig {
        &self.config
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new(FormatterConfig::default())
    }
}

/// Write `"key":`, preceded by a comma unless it is the first member
fn member(line: &mut Buffer, first: &mut bool, key: &str) {
    if !*first {
        line.append_byte(b',');
    }
    *first = false;
    line.append_str(key, true).append_byte(b':');
}

impl Formatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn level(&self) -> Level {
        self.config.level
    }

    fn call_depth(&self, sub: usize) -> usize {
        self.config.call_depth(sub)
    }

    fn begin_field(&self, buf: &mut Buffer, key: &str) {
        buf.append_byte(b',').append_str(key, true).append_byte(b':');
    }

    fn quotes_values(&self) -> bool {
        true
    }

    fn marshal_fn(&self) -> &MarshalFn {
        &self.config.marshal
    }

    fn log(&self, pool: &BufferPool, record: &Record<'_>) {
        let mut line = pool.get();
        let mut first = true;
        line.append_byte(b'{');

        if self.config.time.is_enabled() {
            member(&mut line, &mut first, TIME_KEY);
            self.config.time.append_now(&mut line, true);
        }
        if !self.config.no_print_level {
            member(&mut line, &mut first, LEVEL_KEY);
            line.append_str(record.level.code(), true);
        }
        if !record.prefix.is_empty() {
            member(&mut line, &mut first, NAME_KEY);
            line.append_str(record.prefix, true);
        }

        let mut message = pool.get();
        let _ = message.write_fmt(record.message);
        member(&mut line, &mut first, MSG_KEY);
        line.append_str(&message.as_str_lossy(), true);

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
            member(&mut line, &mut first, LOC_KEY);
            append_file_loc(&mut line, &self.config.file_loc_strip, &record.caller, true);
        }
        line.append_bytes(b"}\n");

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
