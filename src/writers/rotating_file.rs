//! Size-triggered rotating file sink
//!
//! The active file keeps its configured name. When a write would push it past
//! the size limit, it is renamed to a timestamped backup
//! (`app-2024-05-01T13-45-10.123.log`), optionally gzipped, and a fresh file
//! is opened. Backups beyond `max_backups` or older than `max_age` days are
//! removed after each rotation.

use super::Sink;
use crate::core::{Level, LoggerError, Result};
use chrono::{Local, NaiveDateTime, Utc};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";
const MEGABYTE: u64 = 1024 * 1024;

/// When to rotate and which backups to keep
///
/// # Examples
///
/// ```
/// use nlog::writers::RotationPolicy;
///
/// let policy = RotationPolicy::new()
///     .with_max_size(50)
///     .with_max_backups(7)
///     .with_max_age(30)
///     .with_compression(true);
/// assert_eq!(policy.max_bytes, 50 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RotationPolicy {
    /// Size limit of the active file
    pub max_bytes: u64,
    /// Backups to keep, 0 keeps all
    pub max_backups: usize,
    /// Days to keep backups, 0 keeps them forever
    pub max_age_days: u32,
    /// Stamp backups in UTC instead of local time
    pub utc: bool,
    /// Gzip backups after rotation
    pub compress: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: 100 * MEGABYTE,
            max_backups: 0,
            max_age_days: 0,
            utc: false,
            compress: false,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Size limit in megabytes; 0 falls back to the 100 MB default
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size(mut self, megabytes: u64) -> Self {
        self.max_bytes = if megabytes == 0 { 100 } else { megabytes } * MEGABYTE;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_bytes(mut self, bytes: u64) -> Self {
        self.max_bytes = bytes.max(1);
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backups = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_age(mut self, days: u32) -> Self {
        self.max_age_days = days;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_utc(mut self, utc: bool) -> Self {
        self.utc = utc;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    fn now(&self) -> NaiveDateTime {
        if self.utc {
            Utc::now().naive_utc()
        } else {
            Local::now().naive_local()
        }
    }
}

/// Rotating file sink
///
/// Lines go through an in-memory buffer and reach the disk on rotation,
/// [`Sink::flush`] or close. Behind a logger they are only durable once
/// [`Logger::flush`](crate::Logger::flush) returns, whatever their level.
///
/// ```no_run
/// use nlog::writers::{RotatingFile, RotationPolicy, Writer};
/// use nlog::Level;
///
/// let file = RotatingFile::with_policy(
///     "/var/log/app.log",
///     RotationPolicy::new().with_max_size(10).with_max_backups(5),
/// )
/// .unwrap();
/// let writer = Writer::new(file, Level::Info);
/// ```
pub struct RotatingFile {
    path: PathBuf,
    policy: RotationPolicy,
    writer: Option<BufWriter<File>>,
    size: u64,
    last_backup: Option<NaiveDateTime>,
}

impl RotatingFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_policy(path, RotationPolicy::default())
    }

    /// Open (or create) the active file. An empty path logs to
    /// `<tmp>/<process>-nlogrotater.log`.
    pub fn with_policy<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> Result<Self> {
        let path = if path.as_ref().as_os_str().is_empty() {
            default_path()
        } else {
            path.as_ref().to_path_buf()
        };
        let mut file = Self {
            path,
            policy,
            writer: None,
            size: 0,
            last_backup: None,
        };
        file.open()?;
        Ok(file)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Bytes in the active file
    pub fn current_size(&self) -> u64 {
        self.size
    }

    fn open(&mut self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                LoggerError::io_operation(
                    "open log file",
                    format!("Failed to open '{}'", self.path.display()),
                    e,
                )
            })?;
        self.size = file.metadata().map(|m| m.len()).unwrap_or(0);
        self.writer = Some(BufWriter::new(file));
        Ok(())
    }

    /// Move the active file to a backup and start a new one
    pub fn rotate(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        if self.path.exists() {
            let backup = self.backup_path();
            fs::rename(&self.path, &backup).map_err(|e| {
                LoggerError::file_rotation(
                    self.path.display().to_string(),
                    format!("Failed to rotate current log file: {}", e),
                )
            })?;
            if self.policy.compress {
                if let Err(e) = compress_file(&backup) {
                    eprintln!("[nlog WARN] compressing {} failed: {}", backup.display(), e);
                }
            }
        }

        self.open()?;
        self.cleanup();
        Ok(())
    }

    fn name_parts(&self) -> (String, String) {
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("nlog")
            .to_string();
        let ext = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();
        (stem, ext)
    }

    /// Unused timestamped name for the next backup, always newer than the last one
    fn backup_path(&mut self) -> PathBuf {
        let (stem, ext) = self.name_parts();
        let mut stamp = self.policy.now();
        if let Some(last) = self.last_backup {
            if stamp <= last {
                stamp = last + chrono::Duration::milliseconds(1);
            }
        }
        loop {
            let name = format!("{}-{}{}", stem, stamp.format(BACKUP_TIME_FORMAT), ext);
            let candidate = self.path.with_file_name(&name);
            let gz = self.path.with_file_name(format!("{}.gz", name));
            if !candidate.exists() && !gz.exists() {
                self.last_backup = Some(stamp);
                return candidate;
            }
            stamp += chrono::Duration::milliseconds(1);
        }
    }

    /// Backups of this file, newest first
    fn backups(&self) -> Vec<(NaiveDateTime, PathBuf)> {
        let (stem, ext) = self.name_parts();
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(dir) => dir.to_path_buf(),
            None => PathBuf::from("."),
        };
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let prefix = format!("{}-", stem);
        let mut found: Vec<_> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                let rest = name.strip_prefix(&prefix)?;
                let rest = rest.strip_suffix(".gz").unwrap_or(rest);
                let stamp = rest.strip_suffix(ext.as_str())?;
                let time = NaiveDateTime::parse_from_str(stamp, BACKUP_TIME_FORMAT).ok()?;
                Some((time, entry.path()))
            })
            .collect();
        found.sort_by(|a, b| b.0.cmp(&a.0));
        found
    }

    fn cleanup(&self) {
        if self.policy.max_backups == 0 && self.policy.max_age_days == 0 {
            return;
        }
        let cutoff = (self.policy.max_age_days > 0).then(|| {
            self.policy.now() - chrono::Duration::days(i64::from(self.policy.max_age_days))
        });

        for (idx, (time, path)) in self.backups().into_iter().enumerate() {
            let too_many = self.policy.max_backups > 0 && idx >= self.policy.max_backups;
            let too_old = cutoff.map_or(false, |cutoff| time < cutoff);
            if too_many || too_old {
                if let Err(e) = fs::remove_file(&path) {
                    eprintln!("[nlog WARN] removing old backup {} failed: {}", path.display(), e);
                }
            }
        }
    }

    fn write_bytes(&mut self, line: &[u8]) -> Result<()> {
        let len = line.len() as u64;
        if self.size > 0 && self.size + len > self.policy.max_bytes {
            self.rotate()?;
        }
        if self.writer.is_none() {
            self.open()?;
        }
        if let Some(writer) = self.writer.as_mut() {
            writer.write_all(line)?;
            self.size += len;
        }
        Ok(())
    }
}

impl Sink for RotatingFile {
    fn write_line(&mut self, _level: Level, line: &[u8]) -> io::Result<()> {
        self.write_bytes(line).map_err(into_io)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        match self.writer.take() {
            Some(mut writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for RotatingFile {
    fn drop(&mut self) {
        let _ = Sink::close(self);
    }
}

fn into_io(err: LoggerError) -> io::Error {
    match err {
        LoggerError::IoError(e) => e,
        other => io::Error::new(io::ErrorKind::Other, other),
    }
}

fn default_path() -> PathBuf {
    let process = std::env::current_exe()
        .ok()
        .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "nlog".to_string());
    std::env::temp_dir().join(format!("{}-nlogrotater.log", process))
}

/// Gzip `path` into `path.gz` and remove the original.
///
/// The compressed file is written under a temporary name and renamed into
/// place, and the original is only removed once that succeeded.
fn compress_file(path: &Path) -> Result<PathBuf> {
    use std::io::{BufReader, Read};

    let gz_path = PathBuf::from(format!("{}.gz", path.display()));
    let temp_gz_path = PathBuf::from(format!("{}.gz.tmp", path.display()));

    let input = File::open(path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to open file for compression: {}", path.display()),
            e,
        )
    })?;
    let mut reader = BufReader::with_capacity(64 * 1024, input);

    let output = File::create(&temp_gz_path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to create temporary compressed file: {}", temp_gz_path.display()),
            e,
        )
    })?;
    let mut encoder = flate2::write::GzEncoder::new(
        BufWriter::with_capacity(64 * 1024, output),
        flate2::Compression::default(),
    );

    let mut chunk = vec![0u8; 64 * 1024];
    loop {
        let read = reader.read(&mut chunk).map_err(|e| {
            let _ = fs::remove_file(&temp_gz_path);
            LoggerError::io_operation(
                "compress log file",
                format!("Failed to read from file: {}", path.display()),
                e,
            )
        })?;
        if read == 0 {
            break;
        }
        encoder.write_all(&chunk[..read]).map_err(|e| {
            let _ = fs::remove_file(&temp_gz_path);
            LoggerError::io_operation("compress log file", "Failed to compress data chunk", e)
        })?;
    }

    let mut finished = encoder.finish().map_err(|e| {
        let _ = fs::remove_file(&temp_gz_path);
        LoggerError::io_operation("compress log file", "Failed to finish compression", e)
    })?;
    finished.flush()?;
    drop(finished);

    fs::rename(&temp_gz_path, &gz_path).map_err(|e| {
        let _ = fs::remove_file(&temp_gz_path);
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to rename compressed file to: {}", gz_path.display()),
            e,
        )
    })?;

    if let Err(e) = fs::remove_file(path) {
        eprintln!(
            "[nlog WARN] compressed {} but could not remove the original: {}",
            path.display(),
            e
        );
    }
    Ok(gz_path)
}
