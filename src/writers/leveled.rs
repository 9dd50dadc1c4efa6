//! Synchronous leveled writer

use super::{stderr, stdout, IoSink, LeveledWriter, Sink};
use crate::core::{Level, LoggerError, Result};
use parking_lot::Mutex;
use std::io::Write;

/// Writes on the caller's thread, serialized by a per-writer lock.
///
/// # Example
///
/// ```
/// use nlog::writers::{LeveledWriter, Writer};
/// use nlog::Level;
///
/// let writer = Writer::from_io(Vec::new(), Level::Warning);
///
/// // Filtered lines still report their full length
/// assert_eq!(writer.write_if_level(Level::Debug, b"skipped\n").unwrap(), 8);
/// ```
pub struct Writer {
    level: Level,
    sink: Mutex<Box<dyn Sink>>,
}

impl Writer {
    pub fn new<S: Sink + 'static>(sink: S, level: Level) -> Self {
        Self {
            level,
            sink: Mutex::new(Box::new(sink)),
        }
    }

    pub fn from_io<W: Write + Send + 'static>(inner: W, level: Level) -> Self {
        Self::new(IoSink::new(inner), level)
    }

    pub fn stdout(level: Level) -> Self {
        Self::new(stdout(), level)
    }

    pub fn stderr(level: Level) -> Self {
        Self::new(stderr(), level)
    }
}

impl LeveledWriter for Writer {
    fn level(&self) -> Level {
        self.level
    }

    fn write_if_level(&self, level: Level, line: &[u8]) -> Result<usize> {
        if !level.enabled(self.level) {
            return Ok(line.len());
        }
        self.sink.lock().write_line(level, line).map_err(|e| {
            LoggerError::io_operation(
                "writing log line",
                format!("sink rejected {} bytes", line.len()),
                e,
            )
        })?;
        Ok(line.len())
    }

    fn close(&self) -> Result<()> {
        self.sink
            .lock()
            .close()
            .map_err(|e| LoggerError::io_operation("closing writer", "sink close failed", e))
    }

    fn name(&self) -> &str {
        "writer"
    }
}

/// Discards everything; stands in for a sink that could not be opened
#[derive(Debug, Default, Clone, Copy)]
pub struct DummyWriter;

impl DummyWriter {
    pub fn new() -> Self {
        DummyWriter
    }
}

impl LeveledWriter for DummyWriter {
    fn level(&self) -> Level {
        Level::Fatal
    }

    fn write_if_level(&self, _level: Level, _line: &[u8]) -> Result<usize> {
        Ok(0)
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "dummy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Broken;

    impl Sink for Broken {
        fn write_line(&mut self, _level: Level, _line: &[u8]) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_level_gate() {
        let out = Shared::default();
        let writer = Writer::from_io(out.clone(), Level::Info);

        assert_eq!(writer.write_if_level(Level::Error, b"kept\n").unwrap(), 5);
        assert_eq!(writer.write_if_level(Level::Info, b"kept\n").unwrap(), 5);
        assert_eq!(writer.write_if_level(Level::Debug, b"dropped\n").unwrap(), 8);

        assert_eq!(&*out.0.lock(), b"kept\nkept\n");
    }

    #[test]
    fn test_sink_error_is_reported() {
        let writer = Writer::new(Broken, Level::Debug);
        let err = writer.write_if_level(Level::Info, b"line\n").unwrap_err();
        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("writing log line"));
    }

    #[test]
    fn test_close_twice() {
        let writer = Writer::from_io(Shared::default(), Level::Debug);
        writer.close().unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn test_dummy_writer_discards() {
        let writer = DummyWriter::new();
        assert_eq!(writer.level(), Level::Fatal);
        assert_eq!(writer.write_if_level(Level::Fatal, b"gone\n").unwrap(), 0);
        writer.close().unwrap();
    }
}
