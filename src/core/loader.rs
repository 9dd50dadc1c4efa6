//! Building loggers from configuration snapshots
//!
//! A [`Loader`] is a plain description of a logger: prefix, minimum level
//! and a list of formatters, each with its own writers. It is read from any
//! [`ConfigSource`] (parsed TOML and JSON documents out of the box) and turned
//! into a [`Logger`] with [`Logger::from_loader`].
//!
//! ```toml
//! [log]
//! prefix = "api"
//! min_level = "DEBUG"
//!
//! [[log.formatters]]
//! type = "console"
//! date = true
//! time = true
//! time_resolution = "mls"
//! writers = [{ type = "stderr" }]
//! ```
//!
//! A fuller snapshot as JSON:
//!
//! ```json
//! {
//!   "log": {
//!     "prefix": "api",
//!     "min_level": "DEBUG",
//!     "formatters": [
//!       {
//!         "type": "console",
//!         "date": true,
//!         "time": true,
//!         "time_resolution": "mls",
//!         "colored": true,
//!         "writers": [{ "type": "stderr" }]
//!       },
//!       {
//!         "type": "json",
//!         "level": "INFO",
//!         "leveled": "parallel",
//!         "unix_time": true,
//!         "writers": [
//!           { "type": "filerotator", "filename": "/var/log/api.log", "max_size": 50, "compress": true, "queue_len": 4096 },
//!           { "type": "syslog", "level": "ERROR" }
//!         ]
//!       }
//!     ]
//!   }
//! }
//! ```
//!
//! Loading never fails on content: unrecognized levels, resolutions and
//! dispatch modes fall back to defaults, and unknown formatter or writer
//! types are skipped with a warning on stderr when the logger is built.

use super::error::{LoggerError, Result};
use super::level::Level;
use super::logger::Logger;
use crate::formatters::{ConsoleFormatter, Formatter, FormatterConfig, JsonFormatter, TimeResolution};
use crate::writers::{
    self, syslog_sink, DummyWriter, LeveledWriter, ParallelWriter, RotatingFile, RotationPolicy,
    Sink, Writer, DEFAULT_QUEUE_LEN,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// Read access to a nested configuration document.
///
/// Paths are dotted with optional indexes, e.g.
/// `log.formatters[0].writers[1].level`. Missing or mistyped entries read as
/// `None`.
pub trait ConfigSource {
    fn get_str(&self, path: &str) -> Option<String>;
    fn get_bool(&self, path: &str) -> Option<bool>;
    fn get_int(&self, path: &str) -> Option<i64>;
    /// Length of the list at `path`, 0 if there is none
    fn count(&self, path: &str) -> usize;
}

/// A parsed document that can be walked by key and index
trait Tree: Sized {
    fn key(&self, name: &str) -> Option<&Self>;
    fn at(&self, idx: usize) -> Option<&Self>;
}

impl Tree for Value {
    fn key(&self, name: &str) -> Option<&Self> {
        self.get(name)
    }

    fn at(&self, idx: usize) -> Option<&Self> {
        self.get(idx)
    }
}

impl Tree for toml::Value {
    fn key(&self, name: &str) -> Option<&Self> {
        self.get(name)
    }

    fn at(&self, idx: usize) -> Option<&Self> {
        self.get(idx)
    }
}

fn lookup<'a, T: Tree>(root: &'a T, path: &str) -> Option<&'a T> {
    let mut node = root;
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        let (name, mut rest) = match segment.find('[') {
            Some(i) => segment.split_at(i),
            None => (segment, ""),
        };
        if !name.is_empty() {
            node = node.key(name)?;
        }
        while let Some(open) = rest.strip_prefix('[') {
            let end = open.find(']')?;
            let idx: usize = open[..end].trim().parse().ok()?;
            node = node.at(idx)?;
            rest = &open[end + 1..];
        }
        if !rest.is_empty() {
            return None;
        }
    }
    Some(node)
}

impl ConfigSource for Value {
    fn get_str(&self, path: &str) -> Option<String> {
        match lookup(self, path)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    fn get_bool(&self, path: &str) -> Option<bool> {
        match lookup(self, path)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn get_int(&self, path: &str) -> Option<i64> {
        match lookup(self, path)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn count(&self, path: &str) -> usize {
        lookup(self, path)
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }
}

impl ConfigSource for toml::Value {
    fn get_str(&self, path: &str) -> Option<String> {
        match lookup(self, path)? {
            toml::Value::String(s) => Some(s.clone()),
            toml::Value::Integer(i) => Some(i.to_string()),
            toml::Value::Float(f) => Some(f.to_string()),
            toml::Value::Boolean(b) => Some(b.to_string()),
            _ => None,
        }
    }

    fn get_bool(&self, path: &str) -> Option<bool> {
        match lookup(self, path)? {
            toml::Value::Boolean(b) => Some(*b),
            toml::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn get_int(&self, path: &str) -> Option<i64> {
        match lookup(self, path)? {
            toml::Value::Integer(i) => Some(*i),
            toml::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn count(&self, path: &str) -> usize {
        lookup(self, path)
            .and_then(toml::Value::as_array)
            .map_or(0, Vec::len)
    }
}

/// How a formatter hands lines to its writers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dispatch {
    /// Write on the logging thread
    #[default]
    Normal,
    /// Queue lines for a worker thread per writer
    Parallel,
}

impl Dispatch {
    fn parse_or(s: &str, default: Dispatch) -> Dispatch {
        match s {
            "normal" => Dispatch::Normal,
            "parallel" => Dispatch::Parallel,
            _ => default,
        }
    }
}

/// One writer of a formatter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterSpec {
    /// `stdout`, `stderr`, `syslog` or `filerotator`
    #[serde(rename = "type")]
    pub kind: String,
    pub level: Level,
    /// Rotating file path; empty means a file in the temp directory
    pub filename: String,
    /// Megabytes before rotation, 0 for the default
    pub max_size: u64,
    /// Days to keep backups, 0 keeps them forever
    pub max_age: u32,
    /// Backups to keep, 0 keeps all
    pub max_backups: usize,
    pub utc: bool,
    pub compress: bool,
    /// Queue capacity under parallel dispatch
    pub queue_len: usize,
}

impl Default for WriterSpec {
    fn default() -> Self {
        Self {
            kind: "stdout".to_string(),
            level: Level::Info,
            filename: String::new(),
            max_size: 0,
            max_age: 0,
            max_backups: 0,
            utc: false,
            compress: false,
            queue_len: DEFAULT_QUEUE_LEN,
        }
    }
}

impl WriterSpec {
    pub fn rotation_policy(&self) -> RotationPolicy {
        RotationPolicy::new()
            .with_max_size(self.max_size)
            .with_max_age(self.max_age)
            .with_max_backups(self.max_backups)
            .with_utc(self.utc)
            .with_compression(self.compress)
    }

    fn sink(&self) -> Option<Box<dyn Sink>> {
        let sink: Box<dyn Sink> = match self.kind.as_str() {
            "stdout" => Box::new(writers::stdout()),
            "stderr" => Box::new(writers::stderr()),
            "filerotator" => match RotatingFile::with_policy(&self.filename, self.rotation_policy()) {
                Ok(file) => Box::new(file),
                Err(e) => {
                    eprintln!("[nlog WARN] cannot open log file: {}, writer skipped", e);
                    return None;
                }
            },
            other => {
                eprintln!("[nlog WARN] invalid writer type {:?}, writer skipped", other);
                return None;
            }
        };
        Some(sink)
    }

    /// Build the writer; `None` if the type is unknown or its file cannot be opened
    pub fn build(&self, dispatch: Dispatch, app_name: &str) -> Option<Arc<dyn LeveledWriter>> {
        let sink = if self.kind == "syslog" {
            match syslog_sink(app_name) {
                Ok(sink) => sink,
                Err(e) => {
                    writers::syslog::warn_unreachable(&e);
                    return Some(Arc::new(DummyWriter::new()));
                }
            }
        } else {
            self.sink()?
        };

        let writer: Arc<dyn LeveledWriter> = match dispatch {
            Dispatch::Normal => Arc::new(Writer::new(sink, self.level)),
            Dispatch::Parallel => {
                let queue_len = if self.queue_len == 0 {
                    DEFAULT_QUEUE_LEN
                } else {
                    self.queue_len
                };
                Arc::new(ParallelWriter::new(sink, queue_len, self.level))
            }
        };
        Some(writer)
    }
}

/// One formatter and its writers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterSpec {
    /// `console` or `json`
    #[serde(rename = "type")]
    pub kind: String,
    pub level: Level,
    pub colored: bool,
    pub no_print_level: bool,
    pub date: bool,
    pub time: bool,
    pub time_utc: bool,
    pub unix_time: bool,
    pub time_resolution: TimeResolution,
    pub file_loc: bool,
    pub file_loc_strip: String,
    pub file_loc_caller_depth: usize,
    #[serde(rename = "leveled")]
    pub dispatch: Dispatch,
    pub writers: Vec<WriterSpec>,
}

impl Default for FormatterSpec {
    fn default() -> Self {
        Self {
            kind: "console".to_string(),
            level: Level::Info,
            colored: false,
            no_print_level: false,
            date: false,
            time: false,
            time_utc: false,
            unix_time: false,
            time_resolution: TimeResolution::Second,
            file_loc: false,
            file_loc_strip: String::new(),
            file_loc_caller_depth: 0,
            dispatch: Dispatch::Normal,
            writers: Vec::new(),
        }
    }
}

impl FormatterSpec {
    /// Formatter settings with every buildable writer attached.
    ///
    /// Without any writer the formatter falls back to stderr.
    pub fn config(&self, app_name: &str) -> FormatterConfig {
        let mut builder = FormatterConfig::builder()
            .level(self.level)
            .caller_depth(self.file_loc_caller_depth);
        if self.no_print_level {
            builder = builder.no_print_level();
        }
        if self.date {
            builder = builder.date();
        }
        if self.unix_time {
            builder = builder.unix_time(self.time_resolution);
        } else if self.time {
            builder = builder.time(self.time_resolution);
        }
        if self.time_utc {
            builder = builder.utc();
        }
        if self.file_loc {
            builder = builder.file_loc(self.file_loc_strip.as_str());
        }
        if self.colored {
            builder = builder.colored();
        }
        for spec in &self.writers {
            if let Some(writer) = spec.build(self.dispatch, app_name) {
                builder = builder.leveled_writer(writer);
            }
        }
        builder.build()
    }

    /// Build the formatter; `None` with a warning for an unknown type
    pub fn build(&self, app_name: &str) -> Option<Box<dyn Formatter>> {
        match self.kind.as_str() {
            "console" => Some(Box::new(ConsoleFormatter::new(self.config(app_name)))),
            "json" => Some(Box::new(JsonFormatter::new(self.config(app_name)))),
            other => {
                eprintln!("[nlog WARN] invalid formatter type {:?}, formatter skipped", other);
                None
            }
        }
    }
}

/// Configuration snapshot of a whole logger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Loader {
    pub prefix: String,
    pub min_level: Level,
    pub formatters: Vec<FormatterSpec>,
}

impl Default for Loader {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            min_level: Level::Info,
            formatters: Vec::new(),
        }
    }
}

impl Loader {
    /// Read a snapshot rooted at `base_key` (empty for the document root).
    ///
    /// Levels inherit downwards: a formatter without a level gets the root
    /// minimum, a writer without one gets its formatter's.
    pub fn from_source<S: ConfigSource + ?Sized>(src: &S, base_key: &str) -> Loader {
        let base = if base_key.is_empty() {
            String::new()
        } else {
            format!("{}.", base_key)
        };
        let level = |path: &str, default: Level| {
            src.get_str(path)
                .map_or(default, |s| Level::parse_or(&s, default))
        };

        let min_level = level(&format!("{}min_level", base), Level::Info);
        let formatters = (0..src.count(&format!("{}formatters", base)))
            .map(|i| {
                let key = |name: &str| format!("{}formatters[{}].{}", base, i, name);
                let fmt_level = level(&key("level"), min_level);
                let writers = (0..src.count(&key("writers")))
                    .map(|j| {
                        let key = |name: &str| format!("{}formatters[{}].writers[{}].{}", base, i, j, name);
                        WriterSpec {
                            kind: src.get_str(&key("type")).unwrap_or_default(),
                            level: level(&key("level"), fmt_level),
                            filename: src.get_str(&key("filename")).unwrap_or_default(),
                            max_size: non_negative(src.get_int(&key("max_size"))),
                            max_age: non_negative(src.get_int(&key("max_age"))),
                            max_backups: non_negative(src.get_int(&key("max_backups"))),
                            utc: src.get_bool(&key("utc")).unwrap_or(false),
                            compress: src.get_bool(&key("compress")).unwrap_or(false),
                            queue_len: match non_negative(src.get_int(&key("queue_len"))) {
                                0 => DEFAULT_QUEUE_LEN,
                                n => n,
                            },
                        }
                    })
                    .collect();

                FormatterSpec {
                    kind: src.get_str(&key("type")).unwrap_or_default(),
                    level: fmt_level,
                    colored: src.get_bool(&key("colored")).unwrap_or(false),
                    no_print_level: src.get_bool(&key("no_print_level")).unwrap_or(false),
                    date: src.get_bool(&key("date")).unwrap_or(false),
                    time: src.get_bool(&key("time")).unwrap_or(false),
                    time_utc: src.get_bool(&key("time_utc")).unwrap_or(false),
                    unix_time: src.get_bool(&key("unix_time")).unwrap_or(false),
                    time_resolution: src
                        .get_str(&key("time_resolution"))
                        .map_or(TimeResolution::Second, |s| {
                            TimeResolution::parse_or(&s, TimeResolution::Second)
                        }),
                    file_loc: src.get_bool(&key("file_loc")).unwrap_or(false),
                    file_loc_strip: src.get_str(&key("file_loc_strip")).unwrap_or_default(),
                    file_loc_caller_depth: non_negative(src.get_int(&key("file_loc_caller_depth"))),
                    dispatch: src
                        .get_str(&key("leveled"))
                        .map_or(Dispatch::Normal, |s| Dispatch::parse_or(&s, Dispatch::Normal)),
                    writers,
                }
            })
            .collect();

        Loader {
            prefix: src.get_str(&format!("{}prefix", base)).unwrap_or_default(),
            min_level,
            formatters,
        }
    }

    pub fn from_json_str(content: &str, base_key: &str) -> Result<Loader> {
        let doc: Value = serde_json::from_str(content)?;
        Ok(Self::from_source(&doc, base_key))
    }

    pub fn from_toml_str(content: &str, base_key: &str) -> Result<Loader> {
        let doc: toml::Value = toml::from_str(content)?;
        Ok(Self::from_source(&doc, base_key))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P, base_key: &str) -> Result<Loader> {
        Self::from_json_str(&read_config(path.as_ref())?, base_key)
    }

    /// Read a `.toml` or `.json` file, picked by extension
    pub fn from_file<P: AsRef<Path>>(path: P, base_key: &str) -> Result<Loader> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&read_config(path)?, base_key),
            Some("json") => Self::from_json_str(&read_config(path)?, base_key),
            _ => Err(LoggerError::config(
                "loader",
                format!("unsupported configuration format: {}", path.display()),
            )),
        }
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        LoggerError::io_operation(
            "reading logger configuration",
            path.display().to_string(),
            e,
        )
    })
}

fn non_negative<T: TryFrom<i64> + Default>(value: Option<i64>) -> T {
    value
        .and_then(|v| T::try_from(v).ok())
        .unwrap_or_default()
}

impl Logger {
    /// Build a logger from a snapshot; `app_name` tags syslog entries.
    ///
    /// Formatters of unknown type are skipped. If none is left the logger
    /// prints console lines with date and time to stderr.
    pub fn from_loader(loader: &Loader, app_name: &str) -> Logger {
        loader
            .formatters
            .iter()
            .filter_map(|spec| spec.build(app_name))
            .fold(
                Logger::builder()
                    .prefix(loader.prefix.as_str())
                    .min_level(loader.min_level),
                |builder, formatter| builder.boxed_formatter(formatter),
            )
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_path_lookup() {
        let doc = json!({
            "log": {
                "prefix": "api",
                "n": 7,
                "flag": "true",
                "items": [{"k": "a"}, {"k": "b", "inner": [1, 2, 3]}]
            }
        });

        assert_eq!(doc.get_str("log.prefix").as_deref(), Some("api"));
        assert_eq!(doc.get_str("log.n").as_deref(), Some("7"));
        assert_eq!(doc.get_int("log.n"), Some(7));
        assert_eq!(doc.get_bool("log.flag"), Some(true));
        assert_eq!(doc.count("log.items"), 2);
        assert_eq!(doc.get_str("log.items[1].k").as_deref(), Some("b"));
        assert_eq!(doc.get_int("log.items[1].inner[2]"), Some(3));
        assert_eq!(doc.count("log.items[1].inner"), 3);

        assert_eq!(doc.get_str("log.missing"), None);
        assert_eq!(doc.get_str("log.items[5].k"), None);
        assert_eq!(doc.get_str("log.items[x].k"), None);
        assert_eq!(doc.count("log.prefix"), 0);
    }

    #[test]
    fn test_defaults_and_inheritance() {
        let loader = Loader::from_json_str(
            r#"{"app": {"log": {
                "min_level": "WRN",
                "formatters": [
                    {"type": "json", "writers": [{"type": "stdout"}, {"type": "stderr", "level": "debug"}]},
                    {"type": "console", "level": "ERROR", "leveled": "bogus",
                     "time_resolution": "zz", "writers": [{"type": "stdout", "queue_len": -5}]}
                ]
            }}}"#,
            "app.log",
        )
        .unwrap();

        assert_eq!(loader.prefix, "");
        assert_eq!(loader.min_level, Level::Warning);
        assert_eq!(loader.formatters.len(), 2);

        let json = &loader.formatters[0];
        assert_eq!(json.level, Level::Warning);
        assert_eq!(json.writers[0].level, Level::Warning);
        assert_eq!(json.writers[1].level, Level::Debug);

        let console = &loader.formatters[1];
        assert_eq!(console.level, Level::Error);
        assert_eq!(console.dispatch, Dispatch::Normal);
        assert_eq!(console.time_resolution, TimeResolution::Second);
        assert_eq!(console.writers[0].level, Level::Error);
        assert_eq!(console.writers[0].queue_len, DEFAULT_QUEUE_LEN);
    }

    #[test]
    fn test_unknown_level_falls_back() {
        let loader = Loader::from_json_str(r#"{"min_level": "loud"}"#, "").unwrap();
        assert_eq!(loader.min_level, Level::Info);
        assert!(loader.formatters.is_empty());
    }

    #[test]
    fn test_all_writer_settings() {
        let loader = Loader::from_json_str(
            r#"{"prefix": "svc", "min_level": "debug", "formatters": [{
                "type": "json", "leveled": "parallel", "unix_time": true, "time_resolution": "mls",
                "file_loc": true, "file_loc_strip": "src", "file_loc_caller_depth": 5,
                "writers": [{"type": "filerotator", "filename": "/tmp/x.log", "max_size": 5,
                             "max_age": 3, "max_backups": 2, "utc": true, "compress": true,
                             "queue_len": 16}]
            }]}"#,
            "",
        )
        .unwrap();

        let f = &loader.formatters[0];
        assert_eq!(f.dispatch, Dispatch::Parallel);
        assert!(f.unix_time);
        assert_eq!(f.time_resolution, TimeResolution::Millisecond);
        assert_eq!(f.file_loc_caller_depth, 5);

        let w = &f.writers[0];
        assert_eq!(w.kind, "filerotator");
        assert_eq!(w.queue_len, 16);
        assert_eq!(
            w.rotation_policy(),
            RotationPolicy::new()
                .with_max_size(5)
                .with_max_age(3)
                .with_max_backups(2)
                .with_utc(true)
                .with_compression(true)
        );
    }

    #[test]
    fn test_logger_from_loader_writes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let doc = json!({
            "prefix": "svc",
            "min_level": "INFO",
            "formatters": [
                {"type": "yaml"},
                {"type": "json", "writers": [
                    {"type": "filerotator", "filename": path.to_string_lossy()},
                    {"type": "carrier-pigeon"}
                ]}
            ]
        });
        let loader = Loader::from_source(&doc, "");

        let logger = Logger::from_loader(&loader, "test-app");
        assert_eq!(logger.formatters().len(), 1);
        assert_eq!(logger.formatters()[0].writer().len(), 1);
        assert_eq!(logger.prefix(), "svc");

        logger.debug().msg("filtered");
        logger.info().str("k", "v").msg("stored");
        logger.flush().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "{\"level\":\"INF\",\"logger\":\"svc\",\"msg\":\"stored\",\"k\":\"v\"}\n"
        );
    }

    #[test]
    fn test_parallel_dispatch_from_loader() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("queued.log");
        let doc = json!({
            "formatters": [{"type": "console", "leveled": "parallel", "no_print_level": true,
                            "writers": [{"type": "filerotator", "filename": path.to_string_lossy(), "queue_len": 4}]}]
        });
        let logger = Logger::from_loader(&Loader::from_source(&doc, ""), "test-app");
        for i in 0..20 {
            logger.infof(format_args!("line {}", i));
        }
        logger.flush().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 20);
        assert_eq!(lines[19], "line 19");
    }

    #[test]
    fn test_no_formatters_falls_back_to_console() {
        let logger = Logger::from_loader(&Loader::default(), "test-app");
        assert_eq!(logger.formatters().len(), 1);
        assert_eq!(logger.formatters()[0].name(), "console");
        assert_eq!(logger.level(), Level::Info);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = Loader::from_json_file("/nonexistent/nlog.json", "").unwrap_err();
        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(matches!(
            Loader::from_json_str("{not json", ""),
            Err(LoggerError::JsonError(_))
        ));
    }

    #[test]
    fn test_toml_path_lookup() {
        let doc: toml::Value = toml::from_str(
            r#"
            [log]
            prefix = "api"
            n = 7
            flag = "true"

            [[log.items]]
            k = "a"

            [[log.items]]
            k = "b"
            inner = [1, 2, 3]
            "#,
        )
        .unwrap();

        assert_eq!(doc.get_str("log.prefix").as_deref(), Some("api"));
        assert_eq!(doc.get_str("log.n").as_deref(), Some("7"));
        assert_eq!(doc.get_int("log.n"), Some(7));
        assert_eq!(doc.get_bool("log.flag"), Some(true));
        assert_eq!(doc.count("log.items"), 2);
        assert_eq!(doc.get_str("log.items[1].k").as_deref(), Some("b"));
        assert_eq!(doc.get_int("log.items[1].inner[2]"), Some(3));
        assert_eq!(doc.get_str("log.items[5].k"), None);
        assert_eq!(doc.count("log.prefix"), 0);
    }

    #[test]
    fn test_logger_from_toml_file() {
        let dir = tempdir().unwrap();
        let all = dir.path().join("all.log");
        let errors = dir.path().join("errors.log");
        let config = dir.path().join("nlog.toml");
        std::fs::write(
            &config,
            format!(
                r#"
[log]
prefix = "svc"
min_level = "debug"

[[log.formatters]]
type = "json"
level = "INFO"

[[log.formatters.writers]]
type = "filerotator"
filename = '{}'
max_backups = 2

[[log.formatters]]
type = "console"
no_print_level = true

[[log.formatters.writers]]
type = "filerotator"
level = "ERR"
filename = '{}'
"#,
                all.display(),
                errors.display()
            ),
        )
        .unwrap();

        let loader = Loader::from_file(&config, "log").unwrap();
        assert_eq!(loader.min_level, Level::Debug);
        assert_eq!(loader.formatters[0].writers[0].level, Level::Info);
        assert_eq!(loader.formatters[0].writers[0].max_backups, 2);
        assert_eq!(loader.formatters[1].level, Level::Debug);

        let logger = Logger::from_loader(&loader, "test-app");
        logger.debug().msg("noise");
        logger.error().int("code", 7i32).msg("boom");
        logger.flush().unwrap();

        assert_eq!(
            std::fs::read_to_string(&all).unwrap(),
            "{\"level\":\"ERR\",\"logger\":\"svc\",\"msg\":\"boom\",\"code\":7}\n"
        );
        assert_eq!(std::fs::read_to_string(&errors).unwrap(), "[svc] boom code=7\n");
    }

    #[test]
    fn test_from_file_format_errors() {
        let dir = tempdir().unwrap();
        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[log\nprefix = 1").unwrap();
        assert!(matches!(
            Loader::from_file(&bad, "log"),
            Err(LoggerError::TomlError(_))
        ));

        let yaml = dir.path().join("nlog.yaml");
        std::fs::write(&yaml, "log: {}").unwrap();
        assert!(matches!(
            Loader::from_file(&yaml, "log"),
            Err(LoggerError::InvalidConfiguration { .. })
        ));

        let json = dir.path().join("nlog.json");
        std::fs::write(&json, r#"{"log": {"prefix": "j"}}"#).unwrap();
        assert_eq!(Loader::from_file(&json, "log").unwrap().prefix, "j");
    }

    #[test]
    fn test_snapshot_serde() {
        let loader = Loader {
            prefix: "p".into(),
            min_level: Level::Debug,
            formatters: vec![FormatterSpec {
                kind: "json".into(),
                dispatch: Dispatch::Parallel,
                writers: vec![WriterSpec::default()],
                ..FormatterSpec::default()
            }],
        };
        let text = serde_json::to_string(&loader).unwrap();
        assert!(text.contains("\"leveled\":\"parallel\""));
        assert!(text.contains("\"type\":\"stdout\""));
        let back: Loader = serde_json::from_str(&text).unwrap();
        assert_eq!(back, loader);
    }
}
