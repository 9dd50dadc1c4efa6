//! Dynamically typed field values
//!
//! [`FieldValue`] is what `Item::with` and hooks accept when the caller does
//! not use one of the typed field methods. Scalars, their `Option` forms and
//! flat lists are rendered directly by [`Buffer::append_any`](crate::Buffer::append_any);
//! anything else is carried as a `serde_json::Value` and handed to the
//! formatter's [`MarshalFn`].

use super::error::{LoggerError, Result};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Serializes values the buffer cannot render natively
pub type MarshalFn = Arc<dyn Fn(&serde_json::Value) -> Result<Vec<u8>> + Send + Sync>;

/// Marshal function used when a formatter is not given one: compact JSON
pub fn default_marshal() -> MarshalFn {
    Arc::new(|value: &serde_json::Value| serde_json::to_vec(value).map_err(LoggerError::from))
}

/// Value type for structured logging fields
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Error(String),
    Bools(Vec<bool>),
    Ints(Vec<i64>),
    UInts(Vec<u64>),
    Floats(Vec<f64>),
    Strs(Vec<String>),
    /// Structured value rendered through the marshal function
    Object(serde_json::Value),
    /// Conversion into [`FieldValue::Object`] failed; rendered as an inline error
    Invalid(String),
}

impl FieldValue {
    /// Capture any serializable value.
    ///
    /// Serialization failures do not propagate; they become
    /// [`FieldValue::Invalid`] and show up in the log line as
    /// `marshaling error: ...`.
    pub fn serialize<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(v) => FieldValue::Object(v),
            Err(e) => FieldValue::Invalid(e.to_string()),
        }
    }

    /// Capture an error by its display text
    pub fn error<E: fmt::Display + ?Sized>(err: &E) -> Self {
        FieldValue::Error(err.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

macro_rules! from_signed {
    ($($t:ty),*) => {$(
        impl From<$t> for FieldValue {
            fn from(i: $t) -> Self {
                FieldValue::Int(i as i64)
            }
        }
        impl From<Vec<$t>> for FieldValue {
            fn from(v: Vec<$t>) -> Self {
                FieldValue::Ints(v.into_iter().map(|i| i as i64).collect())
            }
        }
    )*};
}

macro_rules! from_unsigned {
    ($($t:ty),*) => {$(
        impl From<$t> for FieldValue {
            fn from(u: $t) -> Self {
                FieldValue::UInt(u as u64)
            }
        }
        impl From<Vec<$t>> for FieldValue {
            fn from(v: Vec<$t>) -> Self {
                FieldValue::UInts(v.into_iter().map(|u| u as u64).collect())
            }
        }
    )*};
}

from_signed!(i8, i16, i32, i64, isize);
from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for FieldValue {
    fn from(f: f32) -> Self {
        FieldValue::Float(f64::from(f))
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

impl From<&String> for FieldValue {
    fn from(s: &String) -> Self {
        FieldValue::Str(s.clone())
    }
}

impl From<Vec<bool>> for FieldValue {
    fn from(v: Vec<bool>) -> Self {
        FieldValue::Bools(v)
    }
}

impl From<Vec<f64>> for FieldValue {
    fn from(v: Vec<f64>) -> Self {
        FieldValue::Floats(v)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(v: Vec<String>) -> Self {
        FieldValue::Strs(v)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(v: Vec<&str>) -> Self {
        FieldValue::Strs(v.into_iter().map(str::to_string).collect())
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(v: serde_json::Value) -> Self {
        FieldValue::Object(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(FieldValue::Null, Into::into)
    }
}
