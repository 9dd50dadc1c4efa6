//! Leveled writers and the raw sinks behind them
//!
//! A [`Sink`] is where bytes end up: a stream, a syslog connection, a
//! rotating file. A [`LeveledWriter`] pairs a destination with a minimum
//! level and is what formatters talk to. Lines above a writer's level are
//! dropped but still reported as fully written, so filtering is never an
//! error.

pub mod leveled;
pub mod multi;
pub mod parallel;
pub mod rotating_file;
pub mod syslog;

use crate::core::{Level, Result};
use std::io::{self, Write};

pub use leveled::{DummyWriter, Writer};
pub use multi::MultiWriter;
pub use parallel::{ParallelWriter, DEFAULT_DRAIN_TIMEOUT, DEFAULT_QUEUE_LEN};
pub use rotating_file::{RotatingFile, RotationPolicy};
pub use syslog::{syslog_sink, syslog_writer, SyslogBackend, SyslogSink};

/// Final destination of rendered lines
pub trait Sink: Send {
    /// Write one complete line. `level` lets level-aware sinks (syslog) route it.
    fn write_line(&mut self, level: Level, line: &[u8]) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;

    /// Release the destination. Must tolerate being called more than once.
    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl Sink for Box<dyn Sink> {
    fn write_line(&mut self, level: Level, line: &[u8]) -> io::Result<()> {
        (**self).write_line(level, line)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// A writer that filters by level before handing bytes to its sink
pub trait LeveledWriter: Send + Sync {
    /// Least severe level this writer accepts
    fn level(&self) -> Level;

    /// Write `line` if `level` passes, otherwise report success without writing
    fn write_if_level(&self, level: Level, line: &[u8]) -> Result<usize>;

    /// Flush and release the sink; queued writers drain first
    fn close(&self) -> Result<()>;

    /// Signal an asynchronous shutdown without waiting for it.
    ///
    /// Lets an aggregate stop all of its queued children at once before
    /// joining them one by one in `close`.
    fn request_stop(&self) {}

    fn name(&self) -> &str;
}

/// Adapter turning any `io::Write` into a [`Sink`]
pub struct IoSink<W> {
    inner: W,
}

impl<W: Write + Send> IoSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write + Send> Sink for IoSink<W> {
    fn write_line(&mut self, _level: Level, line: &[u8]) -> io::Result<()> {
        self.inner.write_all(line)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

pub fn stdout() -> IoSink<io::Stdout> {
    IoSink::new(io::stdout())
}

pub fn stderr() -> IoSink<io::Stderr> {
    IoSink::new(io::stderr())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_sink_writes_verbatim() {
        let mut sink = IoSink::new(Vec::new());
        sink.write_line(Level::Info, b"one\n").unwrap();
        sink.write_line(Level::Debug, b"two\n").unwrap();
        sink.close().unwrap();
        assert_eq!(sink.into_inner(), b"one\ntwo\n");
    }
}
