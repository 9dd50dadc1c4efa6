//! Pending log statements
//!
//! An [`Item`] collects fields for one statement and emits a line per
//! formatter when [`msg`](Item::msg) or [`msgf`](Item::msgf) is called.
//! Items for filtered levels carry nothing and cost nothing: every method is
//! a no-op on them.
//!
//! Field buffers are taken from the [`ItemPool`] on the first field call and
//! handed back when the item goes away, whether that is after `msg`, after
//! a formatter panicked, or because the item was dropped without a message
//! (in which case nothing is logged).

use super::buffer::Buffer;
use super::field::FieldValue;
use super::level::Level;
use super::pool::ItemPool;
use crate::formatters::{Caller, Formatter, Record};
use serde::Serialize;
use std::fmt;

/// Item for a filtered level
pub(crate) const NULL_ITEM: Item<'static> = Item { inner: None };

/// One log statement under construction
///
/// # Example
///
/// ```
/// use nlog::Logger;
///
/// let logger = Logger::new();
/// logger
///     .info()
///     .str("user", "alice")
///     .int("attempt", 3)
///     .bool("admin", false)
///     .msg("login");
/// ```
#[must_use = "an item logs nothing until `msg` or `msgf` is called"]
pub struct Item<'a> {
    inner: Option<Pending<'a>>,
}

struct Pending<'a> {
    pool: &'a ItemPool,
    formatters: &'a [Box<dyn Formatter>],
    level: Level,
    prefix: &'a str,
    caller: Caller,
    fields: Option<Vec<Buffer>>,
}

impl<'a> Item<'a> {
    pub(crate) fn enabled(
        pool: &'a ItemPool,
        formatters: &'a [Box<dyn Formatter>],
        level: Level,
        prefix: &'a str,
        caller: Caller,
    ) -> Self {
        Item {
            inner: Some(Pending {
                pool,
                formatters,
                level,
                prefix,
                caller,
                fields: None,
            }),
        }
    }

    /// Whether this item will produce output
    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    pub fn level(&self) -> Option<Level> {
        self.inner.as_ref().map(|p| p.level)
    }

    fn field(mut self, key: &str, value: impl FnMut(&mut Buffer, bool)) -> Self {
        if let Some(pending) = self.inner.as_mut() {
            pending.field(key, value);
        }
        self
    }

    pub fn str(self, key: &str, val: &str) -> Self {
        self.field(key, |buf, quoted| {
            buf.append_str(val, quoted);
        })
    }

    pub fn strs<S: AsRef<str>>(self, key: &str, vals: &[S]) -> Self {
        self.field(key, |buf, quoted| {
            buf.append_strs(vals, quoted);
        })
    }

    pub fn int<I: Into<i64>>(self, key: &str, val: I) -> Self {
        let val = val.into();
        self.field(key, |buf, _| {
            buf.append_i64(val);
        })
    }

    pub fn ints<I: Copy + Into<i64>>(self, key: &str, vals: &[I]) -> Self {
        self.field(key, |buf, _| {
            buf.append_ints(vals);
        })
    }

    pub fn uint<U: Into<u64>>(self, key: &str, val: U) -> Self {
        let val = val.into();
        self.field(key, |buf, _| {
            buf.append_u64(val);
        })
    }

    pub fn uints<U: Copy + Into<u64>>(self, key: &str, vals: &[U]) -> Self {
        self.field(key, |buf, _| {
            buf.append_uints(vals);
        })
    }

    pub fn float32(self, key: &str, val: f32) -> Self {
        self.field(key, |buf, quoted| {
            buf.append_f32(val, quoted);
        })
    }

    pub fn floats32(self, key: &str, vals: &[f32]) -> Self {
        self.field(key, |buf, quoted| {
            buf.append_f32s(vals, quoted);
        })
    }

    pub fn float64(self, key: &str, val: f64) -> Self {
        self.field(key, |buf, quoted| {
            buf.append_f64(val, quoted);
        })
    }

    pub fn floats64(self, key: &str, vals: &[f64]) -> Self {
        self.field(key, |buf, quoted| {
            buf.append_f64s(vals, quoted);
        })
    }

    pub fn bool(self, key: &str, val: bool) -> Self {
        self.field(key, |buf, _| {
            buf.append_bool(val);
        })
    }

    pub fn bools(self, key: &str, vals: &[bool]) -> Self {
        self.field(key, |buf, _| {
            buf.append_bools(vals);
        })
    }

    /// Add an error under the key `err`
    pub fn err<E: fmt::Display + ?Sized>(self, err: &E) -> Self {
        self.field("err", |buf, quoted| {
            buf.append_error(err, quoted);
        })
    }

    /// Like [`err`](Self::err), but `None` adds nothing
    pub fn err_opt<E: fmt::Display>(self, err: Option<&E>) -> Self {
        match err {
            Some(err) => self.err(err),
            None => self,
        }
    }

    pub fn errs<E: fmt::Display>(self, key: &str, errs: &[E]) -> Self {
        self.field(key, |buf, quoted| {
            buf.append_errors(errs, quoted);
        })
    }

    /// Add a dynamically typed value; integers of any width, `Option`s and
    /// `serde_json::Value`s all convert
    pub fn with(self, key: &str, val: impl Into<FieldValue>) -> Self {
        if self.inner.is_none() {
            return self;
        }
        let val = val.into();
        self.kv(key, &val)
    }

    /// Add any serializable value, rendered through the formatter's marshal function
    pub fn with_object<T: Serialize + ?Sized>(self, key: &str, val: &T) -> Self {
        if self.inner.is_none() {
            return self;
        }
        let val = FieldValue::serialize(val);
        self.kv(key, &val)
    }

    fn kv(mut self, key: &str, val: &FieldValue) -> Self {
        if let Some(pending) = self.inner.as_mut() {
            pending.kv(key, val);
        }
        self
    }

    /// Emit the statement with a plain message
    pub fn msg(mut self, msg: &str) {
        if let Some(pending) = self.inner.take() {
            pending.emit(format_args!("{}", msg));
        }
    }

    /// Emit the statement with a formatted message
    pub fn msgf(mut self, args: fmt::Arguments<'_>) {
        if let Some(pending) = self.inner.take() {
            pending.emit(args);
        }
    }
}

impl<'a> Pending<'a> {
    fn buffers(&mut self) -> &mut Vec<Buffer> {
        let pool = self.pool;
        let count = self.formatters.len();
        self.fields.get_or_insert_with(|| pool.acquire_fields(count))
    }

    fn field(&mut self, key: &str, mut value: impl FnMut(&mut Buffer, bool)) {
        let formatters = self.formatters;
        let level = self.level;
        for (formatter, buf) in formatters.iter().zip(self.buffers().iter_mut()) {
            formatter.write_field(buf, level, key, &mut value);
        }
    }

    fn kv(&mut self, key: &str, val: &FieldValue) {
        let formatters = self.formatters;
        let level = self.level;
        for (formatter, buf) in formatters.iter().zip(self.buffers().iter_mut()) {
            formatter.append_kv(buf, level, key, val);
        }
    }

    fn emit(self, message: fmt::Arguments<'_>) {
        let buffers = self.pool.buffers();
        for (idx, formatter) in self.formatters.iter().enumerate() {
            if !self.level.enabled(formatter.level()) {
                continue;
            }
            let fields = self
                .fields
                .as_ref()
                .and_then(|set| set.get(idx))
                .filter(|buf| !buf.is_empty());
            formatter.log(
                buffers,
                &Record {
                    level: self.level,
                    prefix: self.prefix,
                    fields,
                    message,
                    caller: self.caller,
                },
            );
        }
    }
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        if let Some(set) = self.fields.take() {
            self.pool.release_fields(set);
        }
    }
}
