//! Growable byte buffer with typed appends
//!
//! A [`Buffer`] is where both finished log lines and per-formatter field
//! fragments are built. Every append writes straight into the backing
//! `Vec<u8>`; nothing is concatenated through intermediate `String`s.
//!
//! The `quoted` flag on string-like appends selects JSON syntax: the value is
//! wrapped in double quotes and escaped. Unquoted appends write the text as-is,
//! which is what the console formatter wants.

use super::error::LoggerError;
use super::field::{FieldValue, MarshalFn};
use std::borrow::Cow;
use std::fmt;
use std::io::{self, Write};

/// Capacity given to freshly allocated buffers
pub const DEFAULT_BUFFER_CAPACITY: usize = 512;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Buffer {
    bytes: Vec<u8>,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// Truncate to zero length, keeping the allocation
    #[inline]
    pub fn reset(&mut self) {
        self.bytes.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Contents as text, replacing invalid UTF-8
    pub fn as_str_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    /// Replace the contents with `bytes`
    pub fn set(&mut self, bytes: &[u8]) {
        self.bytes.clear();
        self.bytes.extend_from_slice(bytes);
    }

    /// Copy the accumulated bytes into `dest`
    pub fn write_to<W: Write + ?Sized>(&self, dest: &mut W) -> io::Result<usize> {
        dest.write_all(&self.bytes)?;
        Ok(self.bytes.len())
    }

    #[inline]
    pub fn append_byte(&mut self, b: u8) -> &mut Self {
        self.bytes.push(b);
        self
    }

    #[inline]
    pub fn append_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn append_str(&mut self, s: &str, quoted: bool) -> &mut Self {
        if quoted {
            // Writing a &str into a Vec cannot fail
            let _ = serde_json::to_writer(&mut self.bytes, s);
        } else {
            self.bytes.extend_from_slice(s.as_bytes());
        }
        self
    }

    /// Append `[a,b,c]`, quoting each element when `quoted`
    pub fn append_strs<S: AsRef<str>>(&mut self, vals: &[S], quoted: bool) -> &mut Self {
        self.append_list(vals, |buf, s| {
            buf.append_str(s.as_ref(), quoted);
        })
    }

    pub fn append_i64(&mut self, i: i64) -> &mut Self {
        self.append_display(i)
    }

    pub fn append_u64(&mut self, u: u64) -> &mut Self {
        self.append_display(u)
    }

    /// Append any signed integer slice as `[1,2,3]`
    pub fn append_ints<I: Copy + Into<i64>>(&mut self, vals: &[I]) -> &mut Self {
        self.append_list(vals, |buf, i| {
            buf.append_i64((*i).into());
        })
    }

    /// Append any unsigned integer slice as `[1,2,3]`
    pub fn append_uints<U: Copy + Into<u64>>(&mut self, vals: &[U]) -> &mut Self {
        self.append_list(vals, |buf, u| {
            buf.append_u64((*u).into());
        })
    }

    /// Append an integer left-padded with zeros to `width` digits
    pub fn append_padded(&mut self, i: i64, width: usize) -> &mut Self {
        let _ = write!(self.bytes, "{:0width$}", i, width = width);
        self
    }

    /// Shortest representation that round-trips as `f32`.
    ///
    /// Non-finite values render as `NaN`, `+Inf` and `-Inf`, wrapped in
    /// quotes when `quoted` so JSON lines stay valid.
    pub fn append_f32(&mut self, f: f32, quoted: bool) -> &mut Self {
        if f.is_finite() {
            return self.append_display(f);
        }
        self.append_non_finite(f.is_nan(), f.is_sign_positive(), quoted)
    }

    /// Shortest representation that round-trips as `f64`
    pub fn append_f64(&mut self, f: f64, quoted: bool) -> &mut Self {
        if f.is_finite() {
            return self.append_display(f);
        }
        self.append_non_finite(f.is_nan(), f.is_sign_positive(), quoted)
    }

    pub fn append_f32s(&mut self, vals: &[f32], quoted: bool) -> &mut Self {
        self.append_list(vals, |buf, f| {
            buf.append_f32(*f, quoted);
        })
    }

    pub fn append_f64s(&mut self, vals: &[f64], quoted: bool) -> &mut Self {
        self.append_list(vals, |buf, f| {
            buf.append_f64(*f, quoted);
        })
    }

    fn append_non_finite(&mut self, nan: bool, positive: bool, quoted: bool) -> &mut Self {
        let text = match (nan, positive) {
            (true, _) => "NaN",
            (false, true) => "+Inf",
            (false, false) => "-Inf",
        };
        self.append_str(text, quoted)
    }

    pub fn append_bool(&mut self, b: bool) -> &mut Self {
        self.append_str(if b { "true" } else { "false" }, false)
    }

    pub fn append_bools(&mut self, vals: &[bool]) -> &mut Self {
        self.append_list(vals, |buf, b| {
            buf.append_bool(*b);
        })
    }

    /// Append an error's display text
    pub fn append_error<E: fmt::Display + ?Sized>(&mut self, err: &E, quoted: bool) -> &mut Self {
        if quoted {
            let text = err.to_string();
            self.append_str(&text, true)
        } else {
            self.append_display(err)
        }
    }

    pub fn append_errors<E: fmt::Display>(&mut self, errs: &[E], quoted: bool) -> &mut Self {
        self.append_list(errs, |buf, e| {
            buf.append_error(e, quoted);
        })
    }

    /// Append a dynamically typed value.
    ///
    /// Scalars and flat lists are written directly, `Null` as `null`.
    /// [`FieldValue::Object`] goes through `marshal` and its output is
    /// embedded verbatim. A failing marshal never propagates: the line gets
    /// `marshaling error: ...` in place of the value.
    pub fn append_any(&mut self, value: &FieldValue, quoted: bool, marshal: &MarshalFn) -> &mut Self {
        match value {
            FieldValue::Null => self.append_str("null", false),
            FieldValue::Bool(b) => self.append_bool(*b),
            FieldValue::Int(i) => self.append_i64(*i),
            FieldValue::UInt(u) => self.append_u64(*u),
            FieldValue::Float(f) => self.append_f64(*f, quoted),
            FieldValue::Str(s) | FieldValue::Error(s) => self.append_str(s, quoted),
            FieldValue::Bools(v) => self.append_bools(v),
            FieldValue::Ints(v) => self.append_ints(v),
            FieldValue::UInts(v) => self.append_uints(v),
            FieldValue::Floats(v) => self.append_f64s(v, quoted),
            FieldValue::Strs(v) => self.append_strs(v, quoted),
            FieldValue::Object(v) => match marshal(v) {
                Ok(bytes) => self.append_bytes(&bytes),
                Err(LoggerError::MarshalError(msg)) => self.append_marshal_error(&msg, quoted),
                Err(e) => self.append_marshal_error(&e.to_string(), quoted),
            },
            FieldValue::Invalid(msg) => self.append_marshal_error(msg, quoted),
        }
    }

    fn append_marshal_error(&mut self, msg: &str, quoted: bool) -> &mut Self {
        let text = format!("marshaling error: {}", msg);
        self.append_str(&text, quoted)
    }

    fn append_display<T: fmt::Display>(&mut self, v: T) -> &mut Self {
        let _ = write!(self.bytes, "{}", v);
        self
    }

    fn append_list<T>(&mut self, vals: &[T], mut each: impl FnMut(&mut Self, &T)) -> &mut Self {
        self.bytes.push(b'[');
        for (i, v) in vals.iter().enumerate() {
            if i > 0 {
                self.bytes.push(b',');
            }
            each(self, v);
        }
        self.bytes.push(b']');
        self
    }
}

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Write for Buffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.bytes.extend_from_slice(s.as_bytes());
        Ok(())
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
