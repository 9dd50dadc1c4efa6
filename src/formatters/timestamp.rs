//! Timestamp rendering for log lines
//!
//! Lines carry either a calendar stamp (`2024/05/01 13:45:10.123`) whose
//! precision follows a [`TimeResolution`], or a unix time counted in units
//! of that resolution.

use crate::core::buffer::Buffer;
use crate::core::{LoggerError, Result};
use chrono::{DateTime, Datelike, Local, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Precision of rendered time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimeResolution {
    #[serde(rename = "h")]
    Hour,
    #[serde(rename = "m")]
    Minute,
    #[default]
    #[serde(rename = "s")]
    Second,
    #[serde(rename = "mls")]
    Millisecond,
    #[serde(rename = "mcs")]
    Microsecond,
    #[serde(rename = "ns")]
    Nanosecond,
}

impl TimeResolution {
    /// Length of one unit in nanoseconds
    pub const fn nanos(self) -> i64 {
        match self {
            TimeResolution::Hour => 3_600_000_000_000,
            TimeResolution::Minute => 60_000_000_000,
            TimeResolution::Second => 1_000_000_000,
            TimeResolution::Millisecond => 1_000_000,
            TimeResolution::Microsecond => 1_000,
            TimeResolution::Nanosecond => 1,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            TimeResolution::Hour => "h",
            TimeResolution::Minute => "m",
            TimeResolution::Second => "s",
            TimeResolution::Millisecond => "mls",
            TimeResolution::Microsecond => "mcs",
            TimeResolution::Nanosecond => "ns",
        }
    }

    /// Parse a resolution token, falling back to `default` when unknown
    pub fn parse_or(s: &str, default: TimeResolution) -> TimeResolution {
        s.parse().unwrap_or(default)
    }
}

impl fmt::Display for TimeResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeResolution {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "h" => Ok(TimeResolution::Hour),
            "m" => Ok(TimeResolution::Minute),
            "s" => Ok(TimeResolution::Second),
            "mls" | "ms" => Ok(TimeResolution::Millisecond),
            "mcs" | "us" => Ok(TimeResolution::Microsecond),
            "ns" => Ok(TimeResolution::Nanosecond),
            other => Err(LoggerError::config(
                "time_resolution",
                format!("unknown resolution '{}'", other),
            )),
        }
    }
}

/// Which parts of the time a formatter stamps on each line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeFormat {
    pub date: bool,
    pub time: bool,
    pub utc: bool,
    /// Render a unix count instead of a calendar stamp
    pub unix: bool,
    pub resolution: TimeResolution,
}

impl TimeFormat {
    pub fn is_enabled(&self) -> bool {
        self.date || self.time || self.unix
    }

    /// Append the current time. Returns `false` if nothing was written.
    pub fn append_now(&self, buf: &mut Buffer, quoted: bool) -> bool {
        if !self.is_enabled() {
            return false;
        }
        self.append(buf, Utc::now(), quoted)
    }

    /// Append `now`. Unix stamps are never quoted.
    pub fn append(&self, buf: &mut Buffer, now: DateTime<Utc>, quoted: bool) -> bool {
        if !self.is_enabled() {
            return false;
        }
        if self.unix {
            let nanos = now.timestamp_nanos_opt().unwrap_or(i64::MAX);
            buf.append_i64(nanos / self.resolution.nanos());
            return true;
        }

        if quoted {
            buf.append_byte(b'"');
        }
        if self.utc {
            self.append_calendar(buf, &now);
        } else {
            self.append_calendar(buf, &now.with_timezone(&Local));
        }
        if quoted {
            buf.append_byte(b'"');
        }
        true
    }

    fn append_calendar<T: Datelike + Timelike>(&self, buf: &mut Buffer, t: &T) {
        if self.date {
            buf.append_padded(i64::from(t.year()), 4)
                .append_byte(b'/')
                .append_padded(i64::from(t.month()), 2)
                .append_byte(b'/')
                .append_padded(i64::from(t.day()), 2);
        }
        if !self.time {
            return;
        }
        if self.date {
            buf.append_byte(b' ');
        }

        buf.append_padded(i64::from(t.hour()), 2);
        if self.resolution >= TimeResolution::Minute {
            buf.append_byte(b':').append_padded(i64::from(t.minute()), 2);
        }
        if self.resolution >= TimeResolution::Second {
            buf.append_byte(b':').append_padded(i64::from(t.second()), 2);
        }

        // Leap seconds surface as nanosecond values past 1e9
        let nanos = i64::from(t.nanosecond() % 1_000_000_000);
        match self.resolution {
            TimeResolution::Millisecond => {
                buf.append_byte(b'.').append_padded(nanos / 1_000_000, 3);
            }
            TimeResolution::Microsecond => {
                buf.append_byte(b'.').append_padded(nanos / 1_000, 6);
            }
            TimeResolution::Nanosecond => {
                buf.append_byte(b'.').append_padded(nanos, 9);
            }
            _ => {}
        }
    }
}
