//! Log level definitions
//!
//! Levels are ordered by severity with the most severe first: a smaller
//! discriminant means a more important event. A threshold admits every event
//! whose level is less than or equal to it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Level {
    Fatal = 0,
    Error = 1,
    Warning = 2,
    Notice = 3,
    #[default]
    Info = 4,
    Debug = 5,
}

impl Level {
    /// Every level, most severe first
    pub const ALL: [Level; 6] = [
        Level::Fatal,
        Level::Error,
        Level::Warning,
        Level::Notice,
        Level::Info,
        Level::Debug,
    ];

    /// Whether an event at `self` passes a threshold of `min`
    #[inline]
    pub fn enabled(self, min: Level) -> bool {
        self <= min
    }

    /// Three letter token printed in log lines
    pub fn code(self) -> &'static str {
        match self {
            Level::Fatal => "FAT",
            Level::Error => "ERR",
            Level::Warning => "WRN",
            Level::Notice => "NTC",
            Level::Info => "INF",
            Level::Debug => "DBG",
        }
    }

    pub fn to_str(self) -> &'static str {
        match self {
            Level::Fatal => "FATAL",
            Level::Error => "ERROR",
            Level::Warning => "WARNING",
            Level::Notice => "NOTICE",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
        }
    }

    /// Parse a level string, falling back to `default` when it is not recognized
    pub fn parse_or(s: &str, default: Level) -> Level {
        s.parse().unwrap_or(default)
    }

    #[cfg(feature = "console")]
    pub fn color_code(self) -> colored::Color {
        use colored::Color::*;
        match self {
            Level::Fatal => Magenta,
            Level::Error => Red,
            Level::Warning => Yellow,
            Level::Notice => White,
            Level::Info => Cyan,
            Level::Debug => Green,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "FAT" | "FATAL" => Ok(Level::Fatal),
            "ERR" | "ERROR" => Ok(Level::Error),
            "WRN" | "WARN" | "WARNING" => Ok(Level::Warning),
            "NTC" | "NOTICE" => Ok(Level::Notice),
            "INF" | "INFO" => Ok(Level::Info),
            "DBG" | "DEBUG" => Ok(Level::Debug),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}
