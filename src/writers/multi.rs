//! Fan-out over several leveled writers

use super::LeveledWriter;
use crate::core::{Level, LoggerError, Result};
use parking_lot::RwLock;
use std::sync::Arc;

/// Aggregates writers behind one [`LeveledWriter`].
///
/// Dispatch walks the children in registration order under a shared lock;
/// [`append`](Self::append) and [`remove`](Self::remove) take the lock
/// exclusively. A failing child never stops the remaining children from
/// being written. Children may be synchronous or queued writers, mixed freely.
#[derive(Default)]
pub struct MultiWriter {
    writers: RwLock<Vec<Arc<dyn LeveledWriter>>>,
}

impl MultiWriter {
    pub fn new(writers: Vec<Arc<dyn LeveledWriter>>) -> Self {
        Self {
            writers: RwLock::new(writers),
        }
    }

    pub fn append(&self, writer: Arc<dyn LeveledWriter>) {
        self.writers.write().push(writer);
    }

    /// Detach `writer` and close it. Returns `false` if it was not attached.
    pub fn remove(&self, writer: &Arc<dyn LeveledWriter>) -> bool {
        let removed = {
            let mut writers = self.writers.write();
            match writers.iter().position(|w| same_writer(w, writer)) {
                Some(idx) => Some(writers.remove(idx)),
                None => None,
            }
        };
        match removed {
            Some(w) => {
                if let Err(e) = w.close() {
                    eprintln!("[nlog WARN] closing removed writer '{}' failed: {}", w.name(), e);
                }
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.writers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.writers.read().is_empty()
    }
}

fn same_writer(a: &Arc<dyn LeveledWriter>, b: &Arc<dyn LeveledWriter>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

impl LeveledWriter for MultiWriter {
    /// Least severe level any child accepts
    fn level(&self) -> Level {
        self.writers
            .read()
            .iter()
            .map(|w| w.level())
            .max()
            .unwrap_or(Level::Fatal)
    }

    fn write_if_level(&self, level: Level, line: &[u8]) -> Result<usize> {
        let writers = self.writers.read();
        let mut failures = Vec::new();
        for (idx, writer) in writers.iter().enumerate() {
            if !level.enabled(writer.level()) {
                continue;
            }
            if let Err(e) = writer.write_if_level(level, line) {
                failures.push((idx, e));
            }
        }
        match LoggerError::write_failures(failures) {
            Some(err) => Err(err),
            None => Ok(line.len()),
        }
    }

    fn close(&self) -> Result<()> {
        let writers = self.writers.read();
        for writer in writers.iter() {
            writer.request_stop();
        }
        let failures: Vec<_> = writers
            .iter()
            .enumerate()
            .filter_map(|(idx, w)| w.close().err().map(|e| (idx, e)))
            .collect();
        match LoggerError::write_failures(failures) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn request_stop(&self) {
        for writer in self.writers.read().iter() {
            writer.request_stop();
        }
    }

    fn name(&self) -> &str {
        "multi"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writers::{Sink, Writer};
    use parking_lot::Mutex;
    use std::io;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<String>>>);

    impl Sink for Capture {
        fn write_line(&mut self, _level: Level, line: &[u8]) -> io::Result<()> {
            self.0.lock().push(String::from_utf8_lossy(line).into_owned());
            Ok(())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Failing;

    impl Sink for Failing {
        fn write_line(&mut self, _level: Level, _line: &[u8]) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(level: Level) -> (Capture, Arc<dyn LeveledWriter>) {
        let cap = Capture::default();
        let writer: Arc<dyn LeveledWriter> = Arc::new(Writer::new(cap.clone(), level));
        (cap, writer)
    }

    #[test]
    fn test_children_filter_independently() {
        let (errors, w1) = capture(Level::Error);
        let (all, w2) = capture(Level::Debug);
        let multi = MultiWriter::new(vec![w1, w2]);

        multi.write_if_level(Level::Info, b"info\n").unwrap();
        multi.write_if_level(Level::Error, b"error\n").unwrap();

        assert_eq!(*errors.0.lock(), vec!["error\n"]);
        assert_eq!(*all.0.lock(), vec!["info\n", "error\n"]);
        assert_eq!(multi.level(), Level::Debug);
    }

    #[test]
    fn test_failure_does_not_block_later_children() {
        let failing: Arc<dyn LeveledWriter> = Arc::new(Writer::new(Failing, Level::Debug));
        let (cap, ok) = capture(Level::Debug);
        let multi = MultiWriter::new(vec![failing, ok]);

        let err = multi.write_if_level(Level::Info, b"line\n").unwrap_err();
        match err {
            LoggerError::WriteFailures { count, summary } => {
                assert_eq!(count, 1);
                assert!(summary.starts_with("writer #0"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(*cap.0.lock(), vec!["line\n"]);
    }

    #[test]
    fn test_append_and_remove_first() {
        let (first_cap, first) = capture(Level::Debug);
        let (second_cap, second) = capture(Level::Debug);
        let multi = MultiWriter::new(vec![Arc::clone(&first)]);
        multi.append(Arc::clone(&second));
        assert_eq!(multi.len(), 2);

        assert!(multi.remove(&first));
        assert!(!multi.remove(&first));
        assert_eq!(multi.len(), 1);

        multi.write_if_level(Level::Info, b"after\n").unwrap();
        assert!(first_cap.0.lock().is_empty());
        assert_eq!(*second_cap.0.lock(), vec!["after\n"]);
    }

    #[test]
    fn test_empty_multi_writer() {
        let multi = MultiWriter::default();
        assert!(multi.is_empty());
        assert_eq!(multi.level(), Level::Fatal);
        assert_eq!(multi.write_if_level(Level::Fatal, b"x").unwrap(), 1);
        multi.close().unwrap();
    }
}
