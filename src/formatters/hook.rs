//! Hooks run once per rendered line and may add fields to it

use super::Formatter;
use crate::core::buffer::Buffer;
use crate::core::{FieldValue, Level};
use std::sync::Arc;

/// Called by a formatter for every line it renders.
///
/// Fields added through [`HookFields`] are rendered in the formatter's own
/// syntax and placed before the caller-supplied fields.
///
/// # Example
///
/// ```
/// use nlog::formatters::{Hook, HookFields};
/// use nlog::Level;
///
/// struct Hostname;
///
/// impl Hook for Hostname {
///     fn run(&self, _level: Level, fields: &mut HookFields<'_>, _message: &str) {
///         fields.str("host", "web-1");
///     }
/// }
/// ```
pub trait Hook: Send + Sync {
    fn run(&self, level: Level, fields: &mut HookFields<'_>, message: &str);
}

impl<F> Hook for F
where
    F: Fn(Level, &mut HookFields<'_>, &str) + Send + Sync,
{
    fn run(&self, level: Level, fields: &mut HookFields<'_>, message: &str) {
        self(level, fields, message)
    }
}

/// Field sink handed to hooks
pub struct HookFields<'a> {
    formatter: &'a dyn Formatter,
    buffer: &'a mut Buffer,
    level: Level,
}

impl<'a> HookFields<'a> {
    pub(crate) fn new(formatter: &'a dyn Formatter, buffer: &'a mut Buffer, level: Level) -> Self {
        Self {
            formatter,
            buffer,
            level,
        }
    }

    /// Add any value; subject to the formatter's level like other fields
    pub fn with(&mut self, key: &str, value: impl Into<FieldValue>) -> &mut Self {
        self.formatter
            .append_kv(self.buffer, self.level, key, &value.into());
        self
    }

    pub fn str(&mut self, key: &str, value: &str) -> &mut Self {
        self.formatter
            .write_field(self.buffer, self.level, key, &mut |buf, quoted| {
                buf.append_str(value, quoted);
            });
        self
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Raw access to the hook buffer, bypassing field syntax
    pub fn buffer(&mut self) -> &mut Buffer {
        self.buffer
    }
}

/// Run every hook against `buffer`
pub(crate) fn run_hooks(
    formatter: &dyn Formatter,
    hooks: &[Arc<dyn Hook>],
    level: Level,
    buffer: &mut Buffer,
    message: &str,
) {
    let mut fields = HookFields::new(formatter, buffer, level);
    for hook in hooks {
        hook.run(level, &mut fields, message);
    }
}
